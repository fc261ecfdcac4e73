pub mod bundler;
pub mod readiness;
pub mod supervisor;

pub use bundler::BundlingUnit;
pub use readiness::{become_ready, wait_for_signal};
pub use supervisor::{Readiness, WorkerContext, WorkerSupervisor};

pub mod bundle;
pub mod readiness_signal;
pub mod worker_target;

pub use bundle::{ComponentBundle, TargetSide};
pub use readiness_signal::ReadinessSignal;
pub use worker_target::WorkerTarget;

pub mod error;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use error::{EngineError, Result};
pub use services::{BundlingUnit, Readiness, WorkerContext, WorkerSupervisor};
pub use value_objects::{ComponentBundle, ReadinessSignal, TargetSide, WorkerTarget};

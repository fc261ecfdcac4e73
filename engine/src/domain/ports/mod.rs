pub mod process_executor;
pub mod worker_probe;

pub use process_executor::{CapturedOutput, ProcessExecutor, SpawnConfig, SpawnedWorker, WorkerStream};
pub use worker_probe::WorkerProbe;

#[cfg(test)]
pub use process_executor::MockProcessExecutor;
#[cfg(test)]
pub use worker_probe::MockWorkerProbe;

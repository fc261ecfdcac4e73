//! Infrastructure Layer
//!
//! Driven adapters implementing the ports defined in the domain layer:
//!
//! - `TokioProcessExecutor`: real worker process execution
//! - `HttpWorkerProbe`: liveness and log access over HTTP-on-UDS
//! - `uds_http`: the shared HTTP/1-over-Unix-socket transport

pub mod probe;
pub mod tokio_executor;
pub(crate) mod uds_http;

pub use probe::HttpWorkerProbe;
pub use tokio_executor::TokioProcessExecutor;

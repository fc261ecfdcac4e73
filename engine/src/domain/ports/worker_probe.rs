//! WorkerProbe port
//! Liveness and log access for a process believed to own a socket address.

use async_trait::async_trait;
use std::path::Path;

/// Port for probing an externally addressable worker.
///
/// Probe outcomes are ordinary booleans: a refused connection, a timeout or a
/// non-success status all mean "not alive". Transport errors never reach the
/// caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkerProbe: Send + Sync {
    /// Whether a responsive process owns `socket`.
    async fn is_alive(&self, socket: &Path) -> bool;

    /// Fetch one batch of pending log output from the worker owning
    /// `socket`. Returns `None` when there is nothing to print (or the
    /// worker could not be reached).
    async fn read_log(&self, socket: &Path) -> Option<String>;
}

//! ProcessExecutor port
//! Interface for running external worker processes in the two disciplines
//! the engine needs: one-shot (build) and detached-persistent (watch).

use crate::domain::error::Result;
use async_trait::async_trait;
use tokio::io::AsyncRead;

/// Configuration for spawning one worker process.
#[derive(Debug, Clone)]
pub struct SpawnConfig {
    /// Argument vector; the first element is the program.
    pub command: Vec<String>,
    /// Environment entries layered on top of the inherited process
    /// environment, in application order (later entries win).
    pub env: Vec<(String, String)>,
}

/// Captured output of a process run to completion.
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// A piped output stream of a spawned worker.
pub type WorkerStream = Box<dyn AsyncRead + Send + Unpin>;

/// A worker spawned detached into its own session.
///
/// Only the output streams are retained; the OS child handle is dropped by
/// the executor on purpose so that watch-mode workers outlive the
/// supervising call (and, by way of the new session, the host process).
pub struct SpawnedWorker {
    pub pid: u32,
    pub stdout: WorkerStream,
    pub stderr: WorkerStream,
}

impl std::fmt::Debug for SpawnedWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpawnedWorker")
            .field("pid", &self.pid)
            .finish()
    }
}

/// Port for executing worker processes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProcessExecutor: Send + Sync {
    /// Run the process to completion, capturing both output streams
    /// (build mode).
    async fn run_to_completion(&self, config: SpawnConfig) -> Result<CapturedOutput>;

    /// Spawn the process detached into its own session with piped output
    /// streams (watch mode).
    async fn spawn_detached(&self, config: SpawnConfig) -> Result<SpawnedWorker>;
}

//! Tokio process executor
//! Real implementation of the ProcessExecutor port.

use crate::domain::error::{EngineError, Result};
use crate::domain::ports::{CapturedOutput, ProcessExecutor, SpawnConfig, SpawnedWorker};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, error, info};

pub struct TokioProcessExecutor;

impl TokioProcessExecutor {
    pub fn new() -> Self {
        Self
    }

    fn command(config: &SpawnConfig) -> Result<Command> {
        if config.command.is_empty() {
            return Err(EngineError::InvalidConfiguration(
                "empty worker command".to_string(),
            ));
        }

        let mut cmd = Command::new(&config.command[0]);
        cmd.args(&config.command[1..]);
        for (key, value) in &config.env {
            cmd.env(key, value);
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        unsafe {
            cmd.pre_exec(|| {
                // Detach into a new session; ignore the error if the child is
                // already a session leader.
                libc::setsid();
                Ok(())
            });
        }

        Ok(cmd)
    }

    fn spawn_failed(config: &SpawnConfig, source: std::io::Error) -> EngineError {
        error!(
            command = ?config.command,
            error = %source,
            "Failed to spawn worker process"
        );
        EngineError::SpawnFailed {
            command: config.command.join(" "),
            source,
        }
    }
}

impl Default for TokioProcessExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessExecutor for TokioProcessExecutor {
    async fn run_to_completion(&self, config: SpawnConfig) -> Result<CapturedOutput> {
        debug!(command = ?config.command, "Running worker to completion");

        let output = Self::command(&config)?
            .output()
            .await
            .map_err(|e| Self::spawn_failed(&config, e))?;

        debug!(
            command = ?config.command,
            exit_code = ?output.status.code(),
            "Worker finished"
        );
        Ok(CapturedOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn spawn_detached(&self, config: SpawnConfig) -> Result<SpawnedWorker> {
        let mut child = Self::command(&config)?
            .spawn()
            .map_err(|e| Self::spawn_failed(&config, e))?;
        let pid = child.id().unwrap_or_default();

        let missing_stream = |name: &str| {
            EngineError::io(
                format!("capturing worker {}", name),
                std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stream not piped"),
            )
        };
        let stdout = child.stdout.take().ok_or_else(|| missing_stream("stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| missing_stream("stderr"))?;

        info!(pid = pid, command = ?config.command, "Worker process detached");

        // The child handle is dropped here on purpose: a watch-mode worker
        // is reached through its socket from now on, and must be able to
        // outlive the call (and the host) in its own session.
        Ok(SpawnedWorker {
            pid,
            stdout: Box::new(stdout),
            stderr: Box::new(stderr),
        })
    }
}

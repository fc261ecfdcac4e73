//! Worker supervision.
//!
//! A `WorkerSupervisor` owns the start-or-attach decision for one
//! [`WorkerTarget`]: probe the socket a worker is believed to own, attach to
//! a live owner, or spawn a fresh process and wait for its readiness signal.
//! Each target has a distinct socket address, so independent supervisors
//! never coordinate; concurrent calls against the *same* supervisor are
//! serialized so a target is spawned at most once per host process.

use crate::constants::{POLL_INTERVAL, WORKER_LOG_TARGET};
use crate::domain::error::{EngineError, Result};
use crate::domain::ports::{ProcessExecutor, SpawnConfig, WorkerProbe};
use crate::domain::services::readiness::become_ready;
use crate::domain::value_objects::{ReadinessSignal, WorkerTarget};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Shared spawning context, constructed once at startup and handed to every
/// supervisor.
#[derive(Clone)]
pub struct WorkerContext {
    pub executor: Arc<dyn ProcessExecutor>,
    pub probe: Arc<dyn WorkerProbe>,
    pub signal: ReadinessSignal,
    /// Host-level environment entries layered under each target's own.
    pub host_env: HashMap<String, String>,
}

/// How a supervised target reached readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// A live process already owned the socket; no spawn happened.
    Attached,
    /// A fresh process was spawned and signalled readiness.
    Spawned,
}

#[derive(Clone, Copy)]
enum SupervisorState {
    Unknown,
    Ready(Readiness),
}

pub struct WorkerSupervisor {
    target: WorkerTarget,
    ctx: WorkerContext,
    state: Mutex<SupervisorState>,
}

impl WorkerSupervisor {
    pub fn new(target: WorkerTarget, ctx: WorkerContext) -> Self {
        Self {
            target,
            ctx,
            state: Mutex::new(SupervisorState::Unknown),
        }
    }

    pub fn target(&self) -> &WorkerTarget {
        &self.target
    }

    /// Ensure a persistent worker for this target is up, spawning one if no
    /// live owner answers on the socket.
    ///
    /// Readiness is detected at most once: later calls (including concurrent
    /// ones, which wait on the internal lock) return the recorded outcome
    /// without re-verification.
    pub async fn supervise_watch(&self) -> Result<Readiness> {
        let mut state = self.state.lock().await;
        if let SupervisorState::Ready(readiness) = *state {
            return Ok(readiness);
        }
        let readiness = self.start_watch().await?;
        *state = SupervisorState::Ready(readiness);
        Ok(readiness)
    }

    async fn start_watch(&self) -> Result<Readiness> {
        if self.attach_if_alive().await? {
            return Ok(Readiness::Attached);
        }

        let worker = self
            .ctx
            .executor
            .spawn_detached(self.spawn_config())
            .await?;
        info!(
            pid = worker.pid,
            worker = %self.target.name(),
            "Spawned worker process"
        );

        become_ready(worker, &self.ctx.signal, self.target.name()).await?;
        self.attach_log_stream();
        Ok(Readiness::Spawned)
    }

    /// Run this target's process to completion (build mode).
    ///
    /// A live owner on the socket means a persistent worker is already
    /// serving this target, so there is nothing to build. Otherwise the
    /// process is run once; any content on its error stream fails the build
    /// regardless of exit code.
    pub async fn supervise_build(&self) -> Result<()> {
        if self.attach_if_alive().await? {
            return Ok(());
        }

        let output = self
            .ctx
            .executor
            .run_to_completion(self.spawn_config())
            .await?;

        for line in output.stdout.lines() {
            info!(target: WORKER_LOG_TARGET, worker = %self.target.name(), "{}", line);
        }
        if !output.stderr.trim().is_empty() {
            return Err(EngineError::BuildFailed {
                stderr: output.stderr,
            });
        }

        debug!(
            worker = %self.target.name(),
            exit_code = ?output.exit_code,
            "Build finished"
        );
        Ok(())
    }

    /// Probe the socket; attach to a live owner, or clear the way for a
    /// spawn (create the socket directory, drop any stale socket file).
    async fn attach_if_alive(&self) -> Result<bool> {
        let socket = self.target.socket();
        if let Some(parent) = socket.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| EngineError::io(format!("creating socket directory {:?}", parent), e))?;
        }

        if socket.exists() {
            if self.ctx.probe.is_alive(socket).await {
                debug!(
                    worker = %self.target.name(),
                    socket = ?socket,
                    "Found live worker, attaching"
                );
                self.attach_log_stream();
                return Ok(true);
            }
            warn!(socket = ?socket, "Removing stale socket file");
            std::fs::remove_file(socket)
                .map_err(|e| EngineError::io(format!("removing stale socket file {:?}", socket), e))?;
        }
        Ok(false)
    }

    /// Start the detached log-polling loop against a ready worker.
    ///
    /// The task polls the worker's socket for pending log output at a fixed
    /// cadence and forwards non-empty bodies. It runs for the lifetime of
    /// the host process: the handle is intentionally not retained or joined,
    /// matching the lifetime of the worker it observes.
    fn attach_log_stream(&self) {
        let probe = self.ctx.probe.clone();
        let socket = self.target.socket().to_path_buf();
        let name = self.target.name().to_string();
        tokio::spawn(async move {
            loop {
                match probe.read_log(&socket).await {
                    Some(line) => {
                        info!(target: WORKER_LOG_TARGET, worker = %name, "{}", line)
                    }
                    None => tokio::time::sleep(POLL_INTERVAL).await,
                }
            }
        });
    }

    fn spawn_config(&self) -> SpawnConfig {
        SpawnConfig {
            command: self.target.command().to_vec(),
            env: self.target.spawn_env(&self.ctx.host_env, &self.ctx.signal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        CapturedOutput, MockProcessExecutor, MockWorkerProbe, SpawnedWorker, WorkerStream,
    };
    use tempfile::TempDir;

    fn signal_stream(signal: &str) -> WorkerStream {
        Box::new(
            tokio_test::io::Builder::new()
                .read(format!("{}\n", signal).as_bytes())
                .build(),
        )
    }

    fn context(executor: MockProcessExecutor, probe: MockWorkerProbe) -> WorkerContext {
        WorkerContext {
            executor: Arc::new(executor),
            probe: Arc::new(probe),
            signal: ReadinessSignal::new("tok"),
            host_env: HashMap::new(),
        }
    }

    fn target_in(dir: &TempDir) -> WorkerTarget {
        WorkerTarget::new(
            "bundler",
            dir.path().join("worker.sock"),
            vec!["node".to_string(), "bundler.mjs".to_string()],
        )
    }

    #[tokio::test]
    async fn test_watch_spawns_when_no_socket_exists() {
        let tmp = TempDir::new().unwrap();

        let mut executor = MockProcessExecutor::new();
        executor
            .expect_spawn_detached()
            .times(1)
            .returning(|_| {
                Ok(SpawnedWorker {
                    pid: 4242,
                    stdout: signal_stream("tok"),
                    stderr: signal_stream("tok"),
                })
            });
        let mut probe = MockWorkerProbe::new();
        probe.expect_read_log().returning(|_| None);

        let supervisor = WorkerSupervisor::new(target_in(&tmp), context(executor, probe));
        assert_eq!(supervisor.supervise_watch().await.unwrap(), Readiness::Spawned);
    }

    #[tokio::test]
    async fn test_watch_attaches_to_live_worker_without_spawning() {
        let tmp = TempDir::new().unwrap();
        let socket = tmp.path().join("worker.sock");
        std::fs::write(&socket, b"").unwrap();

        // No spawn expectation: any call to the executor fails the test.
        let executor = MockProcessExecutor::new();
        let mut probe = MockWorkerProbe::new();
        probe.expect_is_alive().times(1).returning(|_| true);
        probe.expect_read_log().returning(|_| None);

        let supervisor = WorkerSupervisor::new(target_in(&tmp), context(executor, probe));
        assert_eq!(supervisor.supervise_watch().await.unwrap(), Readiness::Attached);
    }

    #[tokio::test]
    async fn test_watch_removes_stale_socket_then_spawns() {
        let tmp = TempDir::new().unwrap();
        let socket = tmp.path().join("worker.sock");
        std::fs::write(&socket, b"").unwrap();

        let mut executor = MockProcessExecutor::new();
        executor
            .expect_spawn_detached()
            .times(1)
            .returning(|_| {
                Ok(SpawnedWorker {
                    pid: 7,
                    stdout: signal_stream("tok"),
                    stderr: signal_stream("tok"),
                })
            });
        let mut probe = MockWorkerProbe::new();
        probe.expect_is_alive().times(1).returning(|_| false);
        probe.expect_read_log().returning(|_| None);

        let supervisor = WorkerSupervisor::new(target_in(&tmp), context(executor, probe));
        assert_eq!(supervisor.supervise_watch().await.unwrap(), Readiness::Spawned);
        assert!(!socket.exists(), "stale socket file must be removed");
    }

    #[tokio::test]
    async fn test_concurrent_watch_calls_spawn_exactly_once() {
        let tmp = TempDir::new().unwrap();

        let mut executor = MockProcessExecutor::new();
        executor
            .expect_spawn_detached()
            .times(1)
            .returning(|_| {
                Ok(SpawnedWorker {
                    pid: 1,
                    stdout: signal_stream("tok"),
                    stderr: signal_stream("tok"),
                })
            });
        let mut probe = MockWorkerProbe::new();
        probe.expect_read_log().returning(|_| None);

        let supervisor = Arc::new(WorkerSupervisor::new(target_in(&tmp), context(executor, probe)));
        let (a, b) = tokio::join!(
            {
                let s = supervisor.clone();
                async move { s.supervise_watch().await }
            },
            {
                let s = supervisor.clone();
                async move { s.supervise_watch().await }
            }
        );
        assert_eq!(a.unwrap(), Readiness::Spawned);
        assert_eq!(b.unwrap(), Readiness::Spawned);
    }

    #[tokio::test]
    async fn test_watch_worker_dying_before_signal_is_startup_failure() {
        let tmp = TempDir::new().unwrap();

        let mut executor = MockProcessExecutor::new();
        executor.expect_spawn_detached().times(1).returning(|_| {
            Ok(SpawnedWorker {
                pid: 9,
                stdout: Box::new(
                    tokio_test::io::Builder::new().read(b"crashing\n").build(),
                ),
                stderr: signal_stream("tok"),
            })
        });
        let probe = MockWorkerProbe::new();

        let supervisor = WorkerSupervisor::new(target_in(&tmp), context(executor, probe));
        let result = supervisor.supervise_watch().await;
        assert!(matches!(result, Err(EngineError::WorkerExited { .. })));
    }

    #[tokio::test]
    async fn test_build_fails_on_nonempty_stderr_regardless_of_exit_code() {
        let tmp = TempDir::new().unwrap();

        let mut executor = MockProcessExecutor::new();
        executor.expect_run_to_completion().times(1).returning(|_| {
            Ok(CapturedOutput {
                exit_code: Some(0),
                stdout: "bundled ok\n".to_string(),
                stderr: "warning treated as error\n".to_string(),
            })
        });
        let probe = MockWorkerProbe::new();

        let supervisor = WorkerSupervisor::new(target_in(&tmp), context(executor, probe));
        let result = supervisor.supervise_build().await;
        assert!(matches!(
            result,
            Err(EngineError::BuildFailed { stderr }) if stderr == "warning treated as error\n"
        ));
    }

    #[tokio::test]
    async fn test_build_succeeds_on_empty_stderr() {
        let tmp = TempDir::new().unwrap();

        let mut executor = MockProcessExecutor::new();
        executor.expect_run_to_completion().times(1).returning(|_| {
            Ok(CapturedOutput {
                exit_code: Some(0),
                stdout: "done\n".to_string(),
                stderr: String::new(),
            })
        });
        let probe = MockWorkerProbe::new();

        let supervisor = WorkerSupervisor::new(target_in(&tmp), context(executor, probe));
        supervisor.supervise_build().await.unwrap();
    }
}

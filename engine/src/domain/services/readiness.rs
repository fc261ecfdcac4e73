//! Readiness/log protocol.
//!
//! A spawned worker's output streams carry a mix of ordinary log lines and a
//! single terminating readiness token. Each stream is read line by line:
//! log content is forwarded verbatim and in order, and the first occurrence
//! of the token ends that stream's reader. A stream that closes before
//! emitting the token means the worker died during startup, which is
//! surfaced as a failure rather than ignored.

use crate::constants::WORKER_LOG_TARGET;
use crate::domain::error::{EngineError, Result};
use crate::domain::ports::SpawnedWorker;
use crate::domain::value_objects::ReadinessSignal;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, info, warn};

/// Read `stream` until the readiness signal appears, forwarding every other
/// line to `on_line`.
///
/// Returns `WorkerExited` if the stream reaches end-of-file first: the only
/// way a worker's pipe closes before it signals is the worker exiting.
pub async fn wait_for_signal<R>(
    stream: R,
    signal: &ReadinessSignal,
    target: &str,
    mut on_line: impl FnMut(&str),
) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stream).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if signal.matches(&line) {
                    return Ok(());
                }
                on_line(&line);
            }
            Ok(None) => {
                return Err(EngineError::WorkerExited {
                    target: target.to_string(),
                })
            }
            Err(e) => {
                return Err(EngineError::io(
                    format!("reading output of worker '{}'", target),
                    e,
                ))
            }
        }
    }
}

/// Wait until a freshly spawned worker has signalled readiness on both of
/// its output streams.
///
/// Both stream readers run concurrently and both are awaited; readiness is
/// reached only once each stream has produced the signal. Log content
/// preceding the signal is forwarded through `tracing`.
pub async fn become_ready(worker: SpawnedWorker, signal: &ReadinessSignal, target: &str) -> Result<()> {
    let SpawnedWorker { pid, stdout, stderr } = worker;
    debug!(pid = pid, worker = %target, "Waiting for readiness signal");

    let on_stdout = |line: &str| info!(target: WORKER_LOG_TARGET, worker = %target, "{}", line);
    let on_stderr = |line: &str| warn!(target: WORKER_LOG_TARGET, worker = %target, "{}", line);

    let (out, err) = tokio::join!(
        wait_for_signal(stdout, signal, target, on_stdout),
        wait_for_signal(stderr, signal, target, on_stderr),
    );
    out.and(err)?;

    debug!(pid = pid, worker = %target, "Worker is ready");
    Ok(())
}

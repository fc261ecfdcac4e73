//! Shared helpers for the e2e scenarios.
//!
//! Real workers are plain `/bin/sh` scripts that speak the spawn contract
//! (they read `SIGNAL` and friends from their environment); fake live
//! workers are axum routers served over a Unix domain socket, the same wire
//! surface the production workers expose.

use axum::Router;
use ssr_engine::{
    HttpWorkerProbe, ReadinessSignal, TokioProcessExecutor, WorkerContext, WorkerSupervisor,
    WorkerTarget,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::UnixListenerStream;

/// Install a test log subscriber; safe to call from every test.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_test_writer()
        .try_init();
}

/// Argument vector running a shell script as a worker.
pub fn sh(script: &str) -> Vec<String> {
    vec!["/bin/sh".to_string(), "-c".to_string(), script.to_string()]
}

/// A script that logs one line and then signals readiness on both streams.
pub fn ready_worker_script() -> String {
    "echo starting up; echo \"$SIGNAL\"; echo \"$SIGNAL\" >&2".to_string()
}

/// Serve an axum router on a Unix domain socket, impersonating a live
/// worker.
pub fn serve_unix(socket: &Path, app: Router) {
    if let Some(parent) = socket.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let listener = tokio::net::UnixListener::bind(socket).unwrap();
    tokio::spawn(async move {
        hyper::Server::builder(hyper::server::accept::from_stream(UnixListenerStream::new(
            listener,
        )))
        .serve(app.into_make_service())
        .await
        .unwrap();
    });
}

/// A worker context backed by the real executor and probe.
pub fn test_context(signal: &str) -> WorkerContext {
    WorkerContext {
        executor: Arc::new(TokioProcessExecutor::new()),
        probe: Arc::new(HttpWorkerProbe::new(Duration::from_millis(500))),
        signal: ReadinessSignal::new(signal),
        host_env: HashMap::new(),
    }
}

/// A supervisor for a shell-script worker owning `socket`.
pub fn script_supervisor(socket: PathBuf, script: &str, ctx: &WorkerContext) -> WorkerSupervisor {
    WorkerSupervisor::new(
        WorkerTarget::new("test-worker", socket, sh(script)),
        ctx.clone(),
    )
}

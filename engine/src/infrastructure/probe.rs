//! HTTP-over-UDS worker probe.

use crate::domain::ports::WorkerProbe;
use crate::infrastructure::uds_http;
use async_trait::async_trait;
use http::StatusCode;
use std::path::Path;
use std::time::Duration;
use tracing::trace;

/// Probes workers with a short-timeout GET against their socket.
///
/// The host pid rides along as a query parameter so the worker can track
/// distinct callers (renderer workers use it to expire callers that went
/// away).
pub struct HttpWorkerProbe {
    pid: String,
    timeout: Duration,
}

impl HttpWorkerProbe {
    pub fn new(timeout: Duration) -> Self {
        Self {
            pid: std::process::id().to_string(),
            timeout,
        }
    }

    fn health_path(&self) -> String {
        format!("/?{}", uds_http::query(&[("pid", &self.pid)]))
    }
}

#[async_trait]
impl WorkerProbe for HttpWorkerProbe {
    async fn is_alive(&self, socket: &Path) -> bool {
        match uds_http::get(socket, &self.health_path(), self.timeout).await {
            Ok(response) => response.status == StatusCode::OK,
            Err(e) => {
                trace!(socket = ?socket, error = %e, "Probe failed");
                false
            }
        }
    }

    async fn read_log(&self, socket: &Path) -> Option<String> {
        let response = uds_http::get(socket, &self.health_path(), self.timeout)
            .await
            .ok()?;
        let line = response.body.trim();
        if line.is_empty() {
            None
        } else {
            Some(line.to_string())
        }
    }
}

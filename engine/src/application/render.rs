//! Render RPC client.

use crate::domain::error::{EngineError, Result};
use crate::infrastructure::uds_http;
use http::StatusCode;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Client for the renderer's `/render` endpoint.
///
/// Issues one request per call and carries no retry logic of its own;
/// callers wanting resilience invoke it only after the renderer's supervisor
/// confirmed readiness.
pub struct RenderClient {
    socket: PathBuf,
    timeout: Duration,
}

impl RenderClient {
    pub fn new(socket: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            socket: socket.into(),
            timeout,
        }
    }

    pub fn socket(&self) -> &Path {
        &self.socket
    }

    /// Render a component and return the markup verbatim.
    ///
    /// `props` may be any serializable value; it is JSON-encoded into the
    /// `props` query parameter. A non-success status fails the call with the
    /// response body as diagnostic text.
    pub async fn render<P>(
        &self,
        bundle: &Path,
        script: &str,
        stylesheet: &str,
        props: &P,
    ) -> Result<String>
    where
        P: Serialize + ?Sized,
    {
        let props_json = serde_json::to_string(props)?;
        let bundle = bundle.display().to_string();
        let query = uds_http::query(&[
            ("bundle", &bundle),
            ("props", &props_json),
            ("script", script),
            ("stylesheet", stylesheet),
        ]);

        debug!(bundle = %bundle, socket = ?self.socket, "Rendering component");
        let response = uds_http::get(&self.socket, &format!("/render?{}", query), self.timeout)
            .await?;

        if response.status == StatusCode::OK {
            Ok(response.body)
        } else {
            debug!(status = %response.status, "Render request rejected");
            Err(EngineError::RenderFailed {
                body: response.body,
            })
        }
    }
}

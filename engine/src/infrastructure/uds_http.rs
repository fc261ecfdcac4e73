//! HTTP/1 GET over a Unix domain socket.
//!
//! The one transport the engine speaks: a connected `UnixStream` driven
//! through a hyper client connection, one request per call. Workers answer
//! plain HTTP on the sockets they bind.

use crate::domain::error::EngineError;
use http::StatusCode;
use hyper::{Body, Request};
use std::path::Path;
use std::time::Duration;
use tokio::net::UnixStream;

pub(crate) struct UdsResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Issue one GET request against the process owning `socket`.
pub(crate) async fn get(
    socket: &Path,
    path_and_query: &str,
    timeout: Duration,
) -> Result<UdsResponse, EngineError> {
    let transport = |message: String| EngineError::Transport {
        socket: socket.display().to_string(),
        message,
    };

    let request_fut = async {
        let stream = UnixStream::connect(socket)
            .await
            .map_err(|e| transport(e.to_string()))?;
        let (mut sender, connection) = hyper::client::conn::handshake(stream)
            .await
            .map_err(|e| transport(e.to_string()))?;
        // The connection task finishes once the response is consumed and the
        // sender is dropped.
        tokio::spawn(async move {
            let _ = connection.await;
        });

        let request = Request::builder()
            .method(http::Method::GET)
            .uri(path_and_query)
            .header(http::header::HOST, "localhost")
            .body(Body::empty())
            .map_err(|e| transport(e.to_string()))?;
        let response = sender
            .send_request(request)
            .await
            .map_err(|e| transport(e.to_string()))?;

        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body())
            .await
            .map_err(|e| transport(e.to_string()))?;
        Ok(UdsResponse {
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    };

    tokio::time::timeout(timeout, request_fut)
        .await
        .map_err(|_| transport("request timed out".to_string()))?
}

/// Encode query parameters, percent-escaping the values.
pub(crate) fn query(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

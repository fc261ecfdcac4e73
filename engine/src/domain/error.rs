//! Domain-level errors
//! Probe outcomes are deliberately NOT represented here: a failed liveness
//! probe is an expected branch and is reported as a boolean, never an error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    // Configuration errors
    #[error("server side rendering is not configured: {0}")]
    NotConfigured(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("component '{0}' not found")]
    ComponentNotFound(String),

    // Spawn/readiness failures
    #[error("failed to spawn '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("worker '{target}' exited before signaling readiness")]
    WorkerExited { target: String },

    #[error("bundler reported errors:\n{stderr}")]
    BuildFailed { stderr: String },

    #[error("failed to encode JSON payload: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("render request failed: {body}")]
    RenderFailed { body: String },

    #[error("transport error on socket '{socket}': {message}")]
    Transport { socket: String, message: String },

    #[error("worker task terminated abnormally: {0}")]
    TaskFailed(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl EngineError {
    /// Wrap an IO error with a short description of what was being attempted.
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_failed_carries_stderr_verbatim() {
        let err = EngineError::BuildFailed {
            stderr: "SyntaxError: unexpected token".to_string(),
        };
        assert!(err.to_string().contains("SyntaxError: unexpected token"));
    }

    #[test]
    fn test_io_error_keeps_context() {
        let err = EngineError::io(
            "removing stale socket file",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().starts_with("removing stale socket file"));
    }
}

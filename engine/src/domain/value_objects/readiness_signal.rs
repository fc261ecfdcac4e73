//! Readiness signal token.

use once_cell::sync::Lazy;
use uuid::Uuid;

/// One token per host process run, shared by every worker spawned during
/// that run.
static RUN_SIGNAL: Lazy<String> = Lazy::new(|| Uuid::new_v4().to_string());

/// Opaque token a spawned worker prints on one of its output streams once it
/// has finished initializing.
///
/// The token is injected into every worker's environment as `SIGNAL`. Because
/// it is random per run it can never collide with ordinary log content, which
/// is what lets N independently supervised processes signal readiness the
/// same way without a structured handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessSignal(String);

impl ReadinessSignal {
    /// The signal shared by all workers of the current host process run.
    pub fn for_current_run() -> Self {
        Self(RUN_SIGNAL.clone())
    }

    /// A signal with an explicit token. Useful when the token must be
    /// coordinated externally (and in tests).
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether an output line is the signal itself rather than log content.
    pub fn matches(&self, line: &str) -> bool {
        line.trim() == self.0
    }
}

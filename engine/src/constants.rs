//! Engine-wide constants.

use std::time::Duration;

/// Cadence of the log-polling loops attached to live workers.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Default timeout for a single liveness probe request.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(500);

/// Default timeout for a render request.
pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Socket file name of the rendering runtime.
pub const RENDERER_SOCKET_NAME: &str = "renderer.sock";

/// File under the base directory holding the persisted build identifier.
pub const BUILD_ID_FILE_NAME: &str = "build_id";

/// `tracing` target under which worker process output is forwarded.
pub const WORKER_LOG_TARGET: &str = "ssr_engine::worker";

// Environment variables of the spawn contract consumed by external workers.
pub const ENV_SOCKET: &str = "SOCKET";
pub const ENV_SIGNAL: &str = "SIGNAL";
pub const ENV_HOST_PID: &str = "HOST_PID";
pub const ENV_WORKER_TTL: &str = "WORKER_TTL";
pub const ENV_COMPONENT: &str = "COMPONENT";
pub const ENV_SCRIPT: &str = "SCRIPT";
pub const ENV_BUNDLER_OPTIONS: &str = "BUNDLER_OPTIONS";
pub const ENV_NODE_ENV: &str = "NODE_ENV";
pub const ENV_NODE_OPTIONS: &str = "NODE_OPTIONS";

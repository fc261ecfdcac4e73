//! Server-side rendering engine
//!
//! Renders UI components by delegating to an external rendering runtime and
//! an external bundling toolchain, both reached over Unix domain sockets.
//! The engine owns the coordination layer around those opaque workers:
//!
//! - deciding whether a worker already owns its socket (probe) or must be
//!   spawned (supervise)
//! - detecting readiness through a run-scoped signal token on the worker's
//!   output streams, without a structured handshake
//! - streaming worker logs into the host's own log output
//! - running many independent bundling units concurrently, one-shot
//!   ("build") or persistent ("watch")
//!
//! Unix-only: the worker contract is a filesystem socket address.
//!
//! ```no_run
//! use ssr_engine::{Engine, RendererConfig};
//!
//! # async fn example() -> ssr_engine::Result<()> {
//! let engine = Engine::new(RendererConfig {
//!     template_roots: vec!["app/components".into()],
//!     ..Default::default()
//! })?;
//!
//! // Bring up the renderer (and, in development, the watchers).
//! engine.startup_worker().run().await?;
//!
//! let markup = engine.render("App.js", &serde_json::json!({"title": "hi"})).await?;
//! # let _ = markup;
//! # Ok(())
//! # }
//! ```

// Module declarations
pub mod constants;

// Core architecture modules
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export public types
pub use application::{Engine, RenderClient, Worker};
pub use config::{BuildId, Layout, RendererConfig, RunMode};
pub use domain::error::{EngineError, Result};
pub use domain::ports::{
    CapturedOutput, ProcessExecutor, SpawnConfig, SpawnedWorker, WorkerProbe, WorkerStream,
};
pub use domain::services::{BundlingUnit, Readiness, WorkerContext, WorkerSupervisor};
pub use domain::value_objects::{ComponentBundle, ReadinessSignal, TargetSide, WorkerTarget};
pub use infrastructure::{HttpWorkerProbe, TokioProcessExecutor};

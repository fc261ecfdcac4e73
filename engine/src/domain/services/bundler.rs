//! Bundling unit.
//!
//! One `BundlingUnit` drives the server-target/client-target pair of a
//! single component. Build and watch use distinct worker targets because the
//! bundler options baked into the spawn environment differ between the two
//! disciplines.

use crate::domain::error::Result;
use crate::domain::services::supervisor::{WorkerContext, WorkerSupervisor};
use crate::domain::value_objects::{ComponentBundle, TargetSide};
use tracing::debug;

pub struct BundlingUnit {
    name: String,
    server_build: WorkerSupervisor,
    client_build: WorkerSupervisor,
    server_watch: WorkerSupervisor,
    client_watch: WorkerSupervisor,
}

impl BundlingUnit {
    pub fn new(
        bundle: &ComponentBundle,
        ctx: &WorkerContext,
        command: &[String],
        cache: bool,
    ) -> Result<Self> {
        let supervisor = |side, watch| -> Result<WorkerSupervisor> {
            Ok(WorkerSupervisor::new(
                bundle.worker_target(side, watch, cache, command)?,
                ctx.clone(),
            ))
        };
        Ok(Self {
            name: bundle.relpath().to_string(),
            server_build: supervisor(TargetSide::Server, false)?,
            client_build: supervisor(TargetSide::Client, false)?,
            server_watch: supervisor(TargetSide::Server, true)?,
            client_watch: supervisor(TargetSide::Client, true)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bundle both targets once. Both sides are awaited before returning;
    /// on failure the server side's error wins.
    pub async fn build(&self) -> Result<()> {
        debug!(component = %self.name, "Building bundle pair");
        let (server, client) = tokio::join!(
            self.server_build.supervise_build(),
            self.client_build.supervise_build(),
        );
        server.and(client)
    }

    /// Bring up persistent bundlers for both targets and return once both
    /// are ready. The processes and their log streams stay alive in the
    /// background after this returns.
    pub async fn watch(&self) -> Result<()> {
        debug!(component = %self.name, "Watching bundle pair");
        let (server, client) = tokio::join!(
            self.server_watch.supervise_watch(),
            self.client_watch.supervise_watch(),
        );
        server.and(client).map(|_| ())
    }
}

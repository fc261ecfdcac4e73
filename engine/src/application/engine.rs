//! Engine composition root.
//!
//! The `Engine` is constructed once at host startup and wires the whole
//! stack: validated configuration, filesystem layout, the persisted build
//! id, the run-scoped readiness signal, the renderer supervisor, one
//! bundling unit per discovered component, and the render client.

use crate::application::discovery::discover_components;
use crate::application::render::RenderClient;
use crate::application::worker::Worker;
use crate::config::{BuildId, Layout, RendererConfig, RunMode};
use crate::constants::{ENV_HOST_PID, ENV_NODE_ENV, ENV_NODE_OPTIONS, ENV_WORKER_TTL};
use crate::domain::error::{EngineError, Result};
use crate::domain::services::{BundlingUnit, WorkerContext, WorkerSupervisor};
use crate::domain::value_objects::{ComponentBundle, ReadinessSignal, WorkerTarget};
use crate::infrastructure::{HttpWorkerProbe, TokioProcessExecutor};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub struct Engine {
    config: RendererConfig,
    layout: Layout,
    build_id: BuildId,
    renderer: Arc<WorkerSupervisor>,
    render_client: RenderClient,
    bundles: HashMap<String, ComponentBundle>,
    units: Vec<Arc<BundlingUnit>>,
}

impl Engine {
    /// Construct the engine: validate the configuration, prepare the base
    /// directory, refresh the helper scripts, load or create the persisted
    /// build id, and discover and wire every component.
    pub fn new(config: RendererConfig) -> Result<Self> {
        config.validate()?;
        let layout = Layout::new(&config);

        std::fs::create_dir_all(&layout.base_dir).map_err(|e| {
            EngineError::io(format!("creating base directory {:?}", layout.base_dir), e)
        })?;
        if let Some(source) = &config.scripts_source {
            refresh_scripts(source, &layout.scripts_dir)?;
        }

        let build_id = BuildId::load_or_create(&layout.build_id_file)?;
        let signal = ReadinessSignal::for_current_run();
        let ctx = WorkerContext {
            executor: Arc::new(TokioProcessExecutor::new()),
            probe: Arc::new(HttpWorkerProbe::new(config.probe_timeout)),
            signal,
            host_env: host_environment(&config),
        };

        let renderer_command = config.renderer_command.clone().unwrap_or_else(|| {
            vec![
                "node".to_string(),
                layout.renderer_script.display().to_string(),
            ]
        });
        let renderer = Arc::new(WorkerSupervisor::new(
            WorkerTarget::new("renderer", layout.renderer_socket.clone(), renderer_command),
            ctx.clone(),
        ));

        let bundler_command = config.bundler_command.clone().unwrap_or_else(|| {
            vec![
                "node".to_string(),
                layout.bundler_script.display().to_string(),
            ]
        });
        let public_base = config.public_url();

        let mut bundles = HashMap::new();
        let mut units = Vec::new();
        for (source, root) in discover_components(&config.template_roots, &config.extensions) {
            let bundle = ComponentBundle::new(
                &source,
                &root,
                &layout,
                config.mode,
                &build_id,
                &public_base,
            )?;
            units.push(Arc::new(BundlingUnit::new(
                &bundle,
                &ctx,
                &bundler_command,
                config.cache,
            )?));
            bundles.insert(bundle.relpath().to_string(), bundle);
        }

        info!(
            components = bundles.len(),
            mode = ?config.mode,
            base_dir = ?layout.base_dir,
            "Engine initialized"
        );

        let render_client =
            RenderClient::new(layout.renderer_socket.clone(), config.render_timeout);
        Ok(Self {
            config,
            layout,
            build_id,
            renderer,
            render_client,
            bundles,
            units,
        })
    }

    /// Construct the engine for a full rebuild: wipe the bundle and static
    /// output directories and drop the persisted build id so production
    /// filenames get fresh content hashes.
    pub fn clean_build(config: RendererConfig) -> Result<Self> {
        let layout = Layout::new(&config);
        for dir in [&layout.bundles_dir, &layout.static_dir] {
            if dir.exists() {
                std::fs::remove_dir_all(dir)
                    .map_err(|e| EngineError::io(format!("removing output directory {:?}", dir), e))?;
            }
        }
        if layout.build_id_file.exists() {
            std::fs::remove_file(&layout.build_id_file).map_err(|e| {
                EngineError::io(
                    format!("removing build id file {:?}", layout.build_id_file),
                    e,
                )
            })?;
        }
        Self::new(config)
    }

    pub fn mode(&self) -> RunMode {
        self.config.mode
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn build_id(&self) -> &BuildId {
        &self.build_id
    }

    pub fn renderer(&self) -> &Arc<WorkerSupervisor> {
        &self.renderer
    }

    pub fn render_client(&self) -> &RenderClient {
        &self.render_client
    }

    pub fn units(&self) -> &[Arc<BundlingUnit>] {
        &self.units
    }

    /// Names of all discovered components (paths relative to their template
    /// root, extension included).
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.bundles.keys().map(String::as_str)
    }

    /// Look up the bundle of a component.
    pub fn bundle(&self, component: &str) -> Result<&ComponentBundle> {
        self.bundles
            .get(component)
            .ok_or_else(|| EngineError::ComponentNotFound(component.to_string()))
    }

    /// Render a component through the live renderer.
    ///
    /// The renderer must have been brought up first (see
    /// [`startup_worker`](Self::startup_worker)); this call performs no
    /// readiness check or retry of its own.
    pub async fn render<P>(&self, component: &str, props: &P) -> Result<String>
    where
        P: Serialize + ?Sized,
    {
        let bundle = self.bundle(component)?;
        let stylesheet =
            bundle.stylesheet_url(&self.layout.bundles_dir, &self.config.public_url());
        self.render_client
            .render(
                &bundle.server_bundle_path(),
                bundle.script_url(),
                &stylesheet,
                props,
            )
            .await
    }

    /// Coordinator for host startup: the renderer start, plus one watcher
    /// per component in development mode. In production the bundles are
    /// expected to exist already (see [`build_worker`](Self::build_worker)).
    pub fn startup_worker(&self) -> Worker {
        let mut worker = Worker::new();
        worker.register_renderer(self.renderer.clone());
        if !self.config.mode.is_production() {
            worker.register_watchers(self.units.iter().cloned());
        }
        worker
    }

    /// Coordinator for a one-shot build of every component.
    pub fn build_worker(&self) -> Worker {
        let mut worker = Worker::new();
        worker.register_builders(self.units.iter().cloned());
        worker
    }
}

/// Replace the scripts directory with a fresh copy of the source tree.
fn refresh_scripts(source: &Path, scripts_dir: &Path) -> Result<()> {
    if scripts_dir.exists() {
        std::fs::remove_dir_all(scripts_dir).map_err(|e| {
            EngineError::io(format!("removing scripts directory {:?}", scripts_dir), e)
        })?;
    }
    dircpy::copy_dir(source, scripts_dir).map_err(|e| {
        EngineError::io(
            format!("copying scripts from {:?} to {:?}", source, scripts_dir),
            e,
        )
    })?;
    Ok(())
}

/// Host-level environment shared by every spawned worker. Entries from the
/// config override the engine defaults; the caller pid is always set.
fn host_environment(config: &RendererConfig) -> HashMap<String, String> {
    let mut env = HashMap::from([
        (
            ENV_NODE_ENV.to_string(),
            config.mode.as_env_value().to_string(),
        ),
        (
            ENV_NODE_OPTIONS.to_string(),
            "--experimental-modules --no-warnings".to_string(),
        ),
        (
            ENV_WORKER_TTL.to_string(),
            config.worker_ttl_ms.to_string(),
        ),
    ]);
    env.extend(config.env.clone());
    env.insert(ENV_HOST_PID.to_string(), std::process::id().to_string());
    env
}

//! Renderer configuration and filesystem layout.
//!
//! `RendererConfig` is the single place the host configures the engine: every
//! field is enumerated with a default and individually overridable, and the
//! whole struct is validated once when the [`Engine`](crate::Engine) is
//! constructed. `Layout` derives the directory tree consumed by bundling and
//! rendering from a validated config.

use crate::constants::{BUILD_ID_FILE_NAME, DEFAULT_PROBE_TIMEOUT, DEFAULT_RENDER_TIMEOUT, RENDERER_SOCKET_NAME};
use crate::domain::error::{EngineError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Execution mode of the host application.
///
/// Development mode keeps plain output filenames and runs the bundlers in
/// watch mode at startup; production mode content-addresses client output
/// filenames with the persisted [`BuildId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Development,
    Production,
}

impl RunMode {
    pub fn is_production(self) -> bool {
        matches!(self, RunMode::Production)
    }

    /// Value injected into the worker environment (`NODE_ENV`).
    pub fn as_env_value(self) -> &'static str {
        match self {
            RunMode::Development => "development",
            RunMode::Production => "production",
        }
    }
}

/// Engine configuration supplied by the host application.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Directory holding all engine-owned state (scripts, caches, bundles).
    pub base_dir: PathBuf,

    /// Directories searched for component sources.
    pub template_roots: Vec<PathBuf>,

    /// File extensions recognized as components.
    pub extensions: Vec<String>,

    pub mode: RunMode,

    /// Public URL prefix under which client bundles are served. Must end
    /// with a slash.
    pub static_url: String,

    /// Subdirectory of `static_url` (and of the static output dir) that
    /// receives client bundles.
    pub output_dirname: String,

    /// Whether the bundler may use its on-disk cache.
    pub cache: bool,

    /// Extra environment entries injected into every spawned worker. Entries
    /// here override the engine defaults (`NODE_ENV`, `NODE_OPTIONS`,
    /// `WORKER_TTL`).
    pub env: HashMap<String, String>,

    /// Idle time-to-live hint for renderer workers, in milliseconds.
    pub worker_ttl_ms: u64,

    /// Source tree of helper scripts, copied into the base directory at
    /// startup. When `None` the scripts directory is used as found.
    pub scripts_source: Option<PathBuf>,

    /// Argument vector starting the rendering runtime. Defaults to running
    /// the copied renderer script with `node`.
    pub renderer_command: Option<Vec<String>>,

    /// Argument vector starting one bundler process. Defaults to running the
    /// copied bundler script with `node`.
    pub bundler_command: Option<Vec<String>>,

    /// Component adapter script loaded by the server-side bundle entry.
    pub server_adapter: Option<PathBuf>,

    /// Component adapter script loaded by the client-side bundle entry.
    pub client_adapter: Option<PathBuf>,

    /// Directory holding the worker socket files. Defaults to an
    /// engine-specific subdirectory of the platform temp root.
    pub sockets_dir: Option<PathBuf>,

    pub probe_timeout: Duration,
    pub render_timeout: Duration,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(".ssr"),
            template_roots: Vec::new(),
            extensions: vec![
                "js".to_string(),
                "jsx".to_string(),
                "ts".to_string(),
                "tsx".to_string(),
            ],
            mode: RunMode::Development,
            static_url: "/static/".to_string(),
            output_dirname: "dist/".to_string(),
            cache: true,
            env: HashMap::new(),
            worker_ttl_ms: 1000,
            scripts_source: None,
            renderer_command: None,
            bundler_command: None,
            server_adapter: None,
            client_adapter: None,
            sockets_dir: None,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            render_timeout: DEFAULT_RENDER_TIMEOUT,
        }
    }
}

impl RendererConfig {
    /// Validate the configuration. Called once during engine construction.
    pub fn validate(&self) -> Result<()> {
        if self.template_roots.is_empty() {
            return Err(EngineError::InvalidConfiguration(
                "at least one template root is required".to_string(),
            ));
        }
        if self.extensions.is_empty() {
            return Err(EngineError::InvalidConfiguration(
                "at least one component extension is required".to_string(),
            ));
        }
        if !self.static_url.ends_with('/') {
            return Err(EngineError::InvalidConfiguration(format!(
                "static_url must end with '/': '{}'",
                self.static_url
            )));
        }
        if matches!(&self.renderer_command, Some(cmd) if cmd.is_empty()) {
            return Err(EngineError::InvalidConfiguration(
                "renderer_command must not be empty".to_string(),
            ));
        }
        if matches!(&self.bundler_command, Some(cmd) if cmd.is_empty()) {
            return Err(EngineError::InvalidConfiguration(
                "bundler_command must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Public URL prefix for bundler output, e.g. `/static/dist/`.
    pub fn public_url(&self) -> String {
        format!("{}{}", self.static_url, self.output_dirname)
    }
}

/// Filesystem layout derived from a [`RendererConfig`].
#[derive(Debug, Clone)]
pub struct Layout {
    pub base_dir: PathBuf,
    pub scripts_dir: PathBuf,
    pub entries_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub bundles_dir: PathBuf,
    pub static_dir: PathBuf,
    pub sockets_dir: PathBuf,
    pub renderer_socket: PathBuf,
    pub build_id_file: PathBuf,
    pub renderer_script: PathBuf,
    pub bundler_script: PathBuf,
    pub server_adapter: PathBuf,
    pub client_adapter: PathBuf,
}

impl Layout {
    pub fn new(config: &RendererConfig) -> Self {
        let base_dir = config.base_dir.clone();
        let scripts_dir = base_dir.join("scripts");
        let sockets_dir = config
            .sockets_dir
            .clone()
            .unwrap_or_else(|| temp_root().join("ssr"));
        Self {
            entries_dir: scripts_dir.join("entries"),
            cache_dir: base_dir.join("cache"),
            bundles_dir: base_dir.join("bundles"),
            static_dir: base_dir.join("static").join(&config.output_dirname),
            renderer_socket: sockets_dir.join(RENDERER_SOCKET_NAME),
            build_id_file: base_dir.join(BUILD_ID_FILE_NAME),
            renderer_script: scripts_dir.join("server.mjs"),
            bundler_script: scripts_dir.join("bundler.mjs"),
            server_adapter: config
                .server_adapter
                .clone()
                .unwrap_or_else(|| scripts_dir.join("react").join("server.js")),
            client_adapter: config
                .client_adapter
                .clone()
                .unwrap_or_else(|| scripts_dir.join("react").join("client.js")),
            sockets_dir,
            scripts_dir,
            base_dir,
        }
    }
}

/// Temp root for socket files.
fn temp_root() -> PathBuf {
    // The default macOS temp dir produces paths too long for sun_path.
    if cfg!(target_os = "macos") {
        PathBuf::from("/tmp")
    } else {
        std::env::temp_dir()
    }
}

/// Build identifier persisted across runs, used to content-address client
/// bundle filenames in production mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildId(String);

impl BuildId {
    /// Read the identifier from `path`, generating and persisting a fresh
    /// one when the file does not exist.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let id = std::fs::read_to_string(path)
                .map_err(|e| EngineError::io(format!("reading build id file {:?}", path), e))?;
            let id = id.trim().to_string();
            if !id.is_empty() {
                debug!(build_id = %id, "Loaded persisted build id");
                return Ok(Self(id));
            }
        }
        let id = Uuid::new_v4().to_string();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| EngineError::io(format!("creating directory {:?}", parent), e))?;
        }
        std::fs::write(path, &id)
            .map_err(|e| EngineError::io(format!("writing build id file {:?}", path), e))?;
        debug!(build_id = %id, "Generated new build id");
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

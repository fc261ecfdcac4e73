//! Per-component bundle layout.
//!
//! A `ComponentBundle` maps one discovered source component onto its two
//! worker targets (server-side and client-side bundles), each with its own
//! output directory, output filename, cache directory and socket address.
//! Bundles are created once at startup and immutable thereafter.

use crate::config::{BuildId, Layout, RunMode};
use crate::constants::{ENV_BUNDLER_OPTIONS, ENV_COMPONENT, ENV_SCRIPT};
use crate::domain::error::{EngineError, Result};
use crate::domain::value_objects::WorkerTarget;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Which half of the bundle pair a target builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSide {
    Server,
    Client,
}

impl TargetSide {
    fn as_str(self) -> &'static str {
        match self {
            TargetSide::Server => "server",
            TargetSide::Client => "client",
        }
    }
}

/// Typed bundler options serialized into the spawn environment.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BundlerOptions {
    entry: String,
    out_dir: String,
    out_file: String,
    cache: bool,
    cache_dir: String,
    watch: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_maps: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    public_url: Option<String>,
}

/// Output configuration of one side of the bundle pair.
#[derive(Debug, Clone)]
struct SideLayout {
    entry: PathBuf,
    out_dir: PathBuf,
    out_file: String,
    cache_dir: PathBuf,
    socket: PathBuf,
    adapter: PathBuf,
}

/// One source component mapped to its server and client worker targets.
#[derive(Debug, Clone)]
pub struct ComponentBundle {
    relpath: String,
    source: PathBuf,
    server: SideLayout,
    client: SideLayout,
    public_url: String,
    script_url: String,
    stylesheet_relpath: String,
}

impl ComponentBundle {
    pub fn new(
        source: &Path,
        root: &Path,
        layout: &Layout,
        mode: RunMode,
        build_id: &BuildId,
        public_base: &str,
    ) -> Result<Self> {
        let relpath = source.strip_prefix(root).map_err(|_| {
            EngineError::InvalidConfiguration(format!(
                "component {:?} is not under template root {:?}",
                source, root
            ))
        })?;
        let relpath_str = relpath
            .to_str()
            .ok_or_else(|| {
                EngineError::InvalidConfiguration(format!(
                    "component path {:?} is not valid UTF-8",
                    relpath
                ))
            })?
            .to_string();

        let stem = relpath.with_extension("");
        let stem_str = stem.to_string_lossy().into_owned();
        let socket_relpath = format!("{}-bundler.sock", stem_str);

        let out_relpath = format!("{}.js", stem_str);
        let hashed_out_relpath = if mode.is_production() {
            format!("{}-{}.js", stem_str, build_id.as_str())
        } else {
            out_relpath.clone()
        };
        let out_file = file_name(&out_relpath);
        let hashed_out_file = file_name(&hashed_out_relpath);

        let out_dir_rel = relpath.parent().unwrap_or_else(|| Path::new(""));

        let server = SideLayout {
            entry: layout.entries_dir.join("server.js"),
            out_dir: layout.bundles_dir.join(out_dir_rel),
            out_file,
            cache_dir: layout.cache_dir.join("server"),
            socket: layout.sockets_dir.join("server").join(&socket_relpath),
            adapter: layout.server_adapter.clone(),
        };
        let client = SideLayout {
            entry: layout.entries_dir.join("client.js"),
            out_dir: layout.static_dir.join(out_dir_rel),
            out_file: hashed_out_file,
            cache_dir: layout.cache_dir.join("client"),
            socket: layout.sockets_dir.join("client").join(&socket_relpath),
            adapter: layout.client_adapter.clone(),
        };

        Ok(Self {
            relpath: relpath_str,
            source: source.to_path_buf(),
            server,
            client,
            public_url: join_url(public_base, &out_dir_rel.to_string_lossy()),
            script_url: join_url(public_base, &hashed_out_relpath),
            stylesheet_relpath: format!(
                "{}.css",
                hashed_out_relpath.trim_end_matches(".js")
            ),
        })
    }

    /// Lookup key of this bundle: the component path relative to its
    /// template root, extension included.
    pub fn relpath(&self) -> &str {
        &self.relpath
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn socket(&self, side: TargetSide) -> &Path {
        match side {
            TargetSide::Server => &self.server.socket,
            TargetSide::Client => &self.client.socket,
        }
    }

    /// Path of the server-side bundle file passed to the render endpoint.
    pub fn server_bundle_path(&self) -> PathBuf {
        self.server.out_dir.join(&self.server.out_file)
    }

    /// Public URL of the client bundle.
    pub fn script_url(&self) -> &str {
        &self.script_url
    }

    /// Public URL of the stylesheet companion, or an empty string when no
    /// stylesheet was emitted next to the server bundle.
    pub fn stylesheet_url(&self, bundles_dir: &Path, public_base: &str) -> String {
        if bundles_dir.join(&self.stylesheet_relpath).exists() {
            join_url(public_base, &self.stylesheet_relpath)
        } else {
            String::new()
        }
    }

    /// Build the worker target for one side of the pair.
    ///
    /// `watch` selects the bundler discipline (persistent vs. one-shot) and
    /// is baked into the serialized options, so build and watch targets of
    /// the same side are distinct [`WorkerTarget`]s.
    pub fn worker_target(
        &self,
        side: TargetSide,
        watch: bool,
        cache: bool,
        command: &[String],
    ) -> Result<WorkerTarget> {
        let side_layout = match side {
            TargetSide::Server => &self.server,
            TargetSide::Client => &self.client,
        };
        let options = BundlerOptions {
            entry: side_layout.entry.display().to_string(),
            out_dir: side_layout.out_dir.display().to_string(),
            out_file: side_layout.out_file.clone(),
            cache,
            cache_dir: side_layout.cache_dir.display().to_string(),
            watch,
            source_maps: match side {
                TargetSide::Server => Some(false),
                TargetSide::Client => None,
            },
            public_url: match side {
                TargetSide::Server => None,
                TargetSide::Client => Some(self.public_url.clone()),
            },
        };
        let target = WorkerTarget::new(
            format!("{}:{}", side.as_str(), self.relpath),
            side_layout.socket.clone(),
            command.to_vec(),
        )
        .with_env(ENV_COMPONENT, self.source.display().to_string())
        .with_env(ENV_SCRIPT, side_layout.adapter.display().to_string())
        .with_env(ENV_BUNDLER_OPTIONS, serde_json::to_string(&options)?);
        Ok(target)
    }
}

fn file_name(relpath: &str) -> String {
    relpath
        .rsplit('/')
        .next()
        .unwrap_or(relpath)
        .to_string()
}

/// `base` is guaranteed to end with a slash by config validation.
fn join_url(base: &str, rel: &str) -> String {
    if rel.is_empty() {
        base.to_string()
    } else {
        format!("{}{}", base, rel)
    }
}

//! Worker target identity.

use crate::constants::{ENV_SIGNAL, ENV_SOCKET};
use crate::domain::value_objects::ReadinessSignal;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Identity of one externally reachable worker process: the socket address it
/// owns, the environment injected at spawn time, and the argument vector that
/// starts it.
///
/// Immutable once constructed. A target is not owned by any single caller;
/// multiple callers may race to ensure it is running, and supervision keeps
/// that race idempotent.
#[derive(Debug, Clone)]
pub struct WorkerTarget {
    name: String,
    socket: PathBuf,
    command: Vec<String>,
    env: HashMap<String, String>,
}

impl WorkerTarget {
    pub fn new(name: impl Into<String>, socket: impl Into<PathBuf>, command: Vec<String>) -> Self {
        Self {
            name: name.into(),
            socket: socket.into(),
            command,
            env: HashMap::new(),
        }
    }

    /// Add one per-target environment entry.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Name used in logs and error messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn socket(&self) -> &Path {
        &self.socket
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }

    pub fn env(&self) -> &HashMap<String, String> {
        &self.env
    }

    /// Assemble the spawn environment: host entries first, per-target entries
    /// second (winning on conflict), then the socket address and readiness
    /// signal, which no caller may override. The base process environment is
    /// inherited by the executor itself.
    pub fn spawn_env(
        &self,
        host_env: &HashMap<String, String>,
        signal: &ReadinessSignal,
    ) -> Vec<(String, String)> {
        let mut env: Vec<(String, String)> = host_env
            .iter()
            .filter(|(key, _)| !self.env.contains_key(*key))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        env.sort();
        env.extend(self.env.iter().map(|(k, v)| (k.clone(), v.clone())));
        env.push((ENV_SOCKET.to_string(), self.socket.display().to_string()));
        env.push((ENV_SIGNAL.to_string(), signal.as_str().to_string()));
        env
    }
}

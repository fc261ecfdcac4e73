//! Component discovery.

use std::path::PathBuf;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Walk the template roots and collect component sources matching the
/// configured extensions.
///
/// Returns `(source, owning root)` pairs, sorted for a deterministic bundle
/// order. Unreadable entries are skipped with a warning; a missing root is
/// not an error (a host may configure roots that only exist in some
/// deployments).
pub fn discover_components(roots: &[PathBuf], extensions: &[String]) -> Vec<(PathBuf, PathBuf)> {
    let mut components = Vec::new();
    for root in roots {
        if !root.is_dir() {
            warn!(root = ?root, "Template root does not exist, skipping");
            continue;
        }
        for entry in WalkDir::new(root).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(root = ?root, error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let matches = entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| extensions.iter().any(|e| e == ext))
                .unwrap_or(false);
            if matches {
                components.push((entry.into_path(), root.clone()));
            }
        }
    }
    components.sort();
    debug!(count = components.len(), "Discovered components");
    components
}

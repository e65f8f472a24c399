use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::warn;

use common::{Error, Result};

/// Cooldown state persisted as a single JSON object,
/// `{ "<chain>:<address>": <unix_timestamp> }`.
///
/// Reads fail open: a missing, unreadable, or corrupt file yields an
/// empty map (every instrument starts Eligible) rather than refusing to
/// run. Write failures are returned to the caller so they can be logged
/// without aborting the scan.
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the state map, falling back to empty on any failure.
    pub fn load(&self) -> HashMap<String, i64> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Cooldown state unreadable — starting with empty state");
                return HashMap::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(map) => map,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Cooldown state corrupt — starting with empty state");
                HashMap::new()
            }
        }
    }

    /// Persist the state map, creating parent directories as needed.
    pub fn save(&self, state: &HashMap<String, i64>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::State(format!("creating {}: {e}", parent.display())))?;
        }
        let json = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.path, json)
            .map_err(|e| Error::State(format!("writing {}: {e}", self.path.display())))
    }
}

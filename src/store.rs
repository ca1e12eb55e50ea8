use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, warn};

use crate::models::Store;

/// Load the persisted store. Missing or unreadable state is not an error:
/// it means no prior history, and the run proceeds with an empty store
/// (first-ever run, or deliberate state reset).
pub fn load(path: &Path) -> Store {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No state file yet - path={}", path.display());
            return Store::default();
        }
        Err(e) => {
            warn!("State file unreadable, starting fresh - path={}, error={}", path.display(), e);
            return Store::default();
        }
    };
    match serde_json::from_slice::<Store>(&bytes) {
        Ok(store) => {
            debug!("State loaded - path={}, stories={}", path.display(), store.stories.len());
            store
        }
        Err(e) => {
            warn!("State file corrupt, starting fresh - path={}, error={}", path.display(), e);
            Store::default()
        }
    }
}

/// Persist the store as a complete overwrite. Writes go to a sibling temp
/// file first and are renamed into place, so a failed run leaves the
/// previous state intact. Write failure is fatal to the run.
pub fn save(path: &Path, store: &Store) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Creating state directory {}", parent.display()))?;
        }
    }

    let json = serde_json::to_vec_pretty(store).context("Serializing state")?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json)
        .with_context(|| format!("Writing state to {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Replacing state file {}", path.display()))?;

    debug!("State saved - path={}, stories={}, bytes={}", path.display(), store.stories.len(), json.len());
    Ok(())
}

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::models::Story;

/// Hand one selected story to the render layer: a locale-tagged JSON
/// artifact under the locale's output directory. Templating and publishing
/// happen downstream.
pub fn write_selected(dir: &Path, name: &str, story: &Story) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Creating output directory {}", dir.display()))?;
    let path = dir.join(name);
    let json = serde_json::to_vec_pretty(story).context("Serializing selected story")?;
    std::fs::write(&path, &json)
        .with_context(|| format!("Writing {}", path.display()))?;
    debug!("Wrote {} - story={}, items={}", path.display(), story.id, story.items.len());
    Ok(path)
}

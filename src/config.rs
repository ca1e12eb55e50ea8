use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::models::Locale;

/// YAML configuration bundle: state location, embedding endpoint, and one
/// section per locale pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,
    pub embedder: EmbedderConfig,
    pub locales: BTreeMap<Locale, LocaleConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbedderConfig {
    pub endpoint: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocaleConfig {
    /// JSON file of fetched records for this locale (fetch-layer output).
    pub records: PathBuf,
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f64,
    #[serde(default = "default_max_longform")]
    pub max_longform_per_run: usize,
    /// Where selected-story artifacts for the render layer are written.
    pub out_dir: PathBuf,
}

fn default_state_path() -> PathBuf {
    PathBuf::from("state.json")
}

fn default_min_similarity() -> f64 {
    0.72
}

fn default_max_longform() -> usize {
    1
}

pub fn load_config(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Reading config {}", path.display()))?;
    let cfg: Config = serde_yaml::from_str(&text)
        .with_context(|| format!("Parsing config {}", path.display()))?;
    if cfg.locales.is_empty() {
        bail!("Config {} defines no locales", path.display());
    }
    for (locale, lc) in &cfg.locales {
        if !(0.0..=1.0).contains(&lc.min_similarity) {
            bail!("min_similarity for {} must be within [0, 1], got {}", locale, lc.min_similarity);
        }
    }
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
state_path: automation/state.json
embedder:
  endpoint: http://localhost:8080/v1/embeddings
  model: all-MiniLM-L6-v2
locales:
  jp:
    records: automation/fetched/jp.json
    min_similarity: 0.75
    max_longform_per_run: 2
    out_dir: jp
  en:
    records: automation/fetched/en.json
    out_dir: en
"#;

    #[test]
    fn parses_full_config() {
        let cfg: Config = serde_yaml::from_str(SAMPLE).unwrap();
        assert_eq!(cfg.state_path, PathBuf::from("automation/state.json"));
        assert_eq!(cfg.embedder.model, "all-MiniLM-L6-v2");
        let jp = &cfg.locales[&Locale::Jp];
        assert_eq!(jp.min_similarity, 0.75);
        assert_eq!(jp.max_longform_per_run, 2);
    }

    #[test]
    fn locale_defaults_apply() {
        let cfg: Config = serde_yaml::from_str(SAMPLE).unwrap();
        let en = &cfg.locales[&Locale::En];
        assert_eq!(en.min_similarity, 0.72);
        assert_eq!(en.max_longform_per_run, 1);
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(
            &path,
            SAMPLE.replace("min_similarity: 0.75", "min_similarity: 1.5"),
        )
        .unwrap();
        assert!(load_config(&path).is_err());
    }
}

mod cluster;
mod config;
mod embed;
mod lifecycle;
mod models;
mod normalize;
mod output;
mod similarity;
mod store;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::LocaleConfig;
use crate::embed::HttpEmbedder;
use crate::models::{Locale, Store};
use crate::normalize::{normalize_records, today_reference, DedupKey, RawRecord};

/// Storyline - incremental news story clustering across runs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to YAML config file
    #[arg(short, long, default_value = "config.yml")]
    config: String,

    /// Override the state file path from the config
    #[arg(long)]
    state: Option<PathBuf>,

    /// Restrict the run to one locale
    #[arg(long, value_enum, default_value_t = Only::Both)]
    only: Only,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Only {
    Jp,
    En,
    Both,
}

impl Only {
    fn includes(self, locale: Locale) -> bool {
        match self {
            Only::Jp => locale == Locale::Jp,
            Only::En => locale == Locale::En,
            Only::Both => true,
        }
    }
}

async fn run_locale(
    embedder: &HttpEmbedder,
    locale: Locale,
    lc: &LocaleConfig,
    store: &mut Store,
) -> Result<()> {
    let start = std::time::Instant::now();

    // 1) read the fetch layer's records for this locale
    let bytes = match std::fs::read(&lc.records) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("No records file - locale={}, path={}", locale, lc.records.display());
            return Ok(());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Reading records {}", lc.records.display()))
        }
    };
    let records: Vec<RawRecord> = serde_json::from_slice(&bytes)
        .with_context(|| format!("Decoding records {}", lc.records.display()))?;

    // 2) normalize and dedup (title+date: mirrors of the same headline on
    // the same day collapse into one item)
    let batch = normalize_records(records, DedupKey::TitleDate, today_reference());
    info!("Records prepared - locale={}, batch={}", locale, batch.len());

    // 3) cluster into the shared store
    let stats = cluster::assign(embedder, locale, &batch, lc.min_similarity, store)
        .await
        .with_context(|| format!("Clustering failed for locale {}", locale))?;

    // 4) lifecycle queries -> render-layer artifacts
    let firsts = lifecycle::first_reports(store, locale);
    if let Some(story) = firsts.first() {
        output::write_selected(&lc.out_dir, "first_report.json", story)?;
    } else {
        debug!("No first-report candidate - locale={}", locale);
    }

    let targets = lifecycle::longform_targets(store, locale, lc.max_longform_per_run);
    if let Some(story) = targets.first() {
        output::write_selected(&lc.out_dir, "longform.json", story)?;
    } else {
        debug!("No long-form target - locale={}", locale);
    }

    let elapsed = start.elapsed();
    info!(
        "Locale pipeline completed - locale={}, duration={:.2}s, attached={}, spawned={}, skipped={}, first_reports={}, longform={}",
        locale,
        elapsed.as_secs_f32(),
        stats.attached,
        stats.spawned,
        stats.skipped,
        firsts.len(),
        targets.len()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();

    let pipeline_start = std::time::Instant::now();
    info!("Starting storyline");

    let args = Args::parse();
    let cfg = config::load_config(Path::new(&args.config))?;
    let state_path = args.state.clone().unwrap_or_else(|| cfg.state_path.clone());

    let mut store = store::load(&state_path);
    info!("State loaded - path={}, stories={}", state_path.display(), store.stories.len());

    let embedder = HttpEmbedder::new(cfg.embedder.endpoint.clone(), cfg.embedder.model.clone())?;

    // locales run sequentially against the one shared store; on any
    // failure we bail before saving, so the persisted state stays as it was
    for (locale, lc) in &cfg.locales {
        if !args.only.includes(*locale) {
            debug!("Skipping locale {} (--only)", locale);
            continue;
        }
        run_locale(&embedder, *locale, lc, &mut store).await?;
    }

    store::save(&state_path, &store)?;
    info!("State saved - path={}, stories={}", state_path.display(), store.stories.len());

    let pipeline_elapsed = pipeline_start.elapsed();
    info!(
        "Pipeline completed successfully - total_duration={:.2}s, stories={}",
        pipeline_elapsed.as_secs_f32(),
        store.stories.len()
    );
    Ok(())
}

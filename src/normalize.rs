use chrono::{NaiveDate, Utc};
use chrono_tz::Asia::Tokyo;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;

use crate::models::Item;

/// One record as emitted by the fetch layer. Everything is optional-ish;
/// cleanup and validation happen here, not upstream.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub date: Option<String>,
}

/// A normalized item plus the text the embedding provider will see.
/// Summaries sharpen the embedding but are not part of the persisted item.
#[derive(Debug, Clone)]
pub struct Incoming {
    pub item: Item,
    pub embed_text: String,
}

/// Which fields identify a duplicate. Fetch-side dedup keys on the link;
/// lifecycle-side grouping keys on the date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupKey {
    TitleLink,
    TitleDate,
}

/// NFC-normalize and collapse runs of whitespace to single spaces.
pub fn clean_text(s: &str) -> String {
    s.nfc()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// "Today" in the pipeline's reference timezone (JST), used when a record
/// carries no publication date.
pub fn today_reference() -> NaiveDate {
    Utc::now().with_timezone(&Tokyo).date_naive()
}

/// Clean raw fetched records into deduplicated `Incoming` items.
///
/// Malformed records (no title, no link, or an unparseable date string) are
/// dropped with a warning, never fatal. Records without a date fall back to
/// `today`. First occurrence wins under the chosen dedup key.
pub fn normalize_records(records: Vec<RawRecord>, key: DedupKey, today: NaiveDate) -> Vec<Incoming> {
    let total = records.len();
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut out = Vec::with_capacity(total);
    let mut dropped = 0usize;

    for rec in records {
        let title = clean_text(&rec.title);
        let link = rec.link.trim().to_string();
        if title.is_empty() || link.is_empty() {
            warn!("Dropping malformed record - title={:?}, link={:?}", rec.title, rec.link);
            dropped += 1;
            continue;
        }

        let published = match rec.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            Some(d) => match NaiveDate::parse_from_str(d, "%Y-%m-%d") {
                Ok(date) => date,
                Err(e) => {
                    warn!("Dropping record with bad date - title={:?}, date={:?}, error={}", title, d, e);
                    dropped += 1;
                    continue;
                }
            },
            None => today,
        };

        let dedup_key = match key {
            DedupKey::TitleLink => (title.clone(), link.clone()),
            DedupKey::TitleDate => (title.clone(), published.to_string()),
        };
        if !seen.insert(dedup_key) {
            continue;
        }

        let summary = clean_text(&rec.summary);
        let embed_text = if summary.is_empty() {
            title.clone()
        } else {
            format!("{} {}", title, summary)
        };

        out.push(Incoming {
            item: Item {
                title,
                link,
                source: clean_text(&rec.source),
                published,
            },
            embed_text,
        });
    }

    debug!(
        "Normalization - input={}, unique={}, dropped={}",
        total,
        out.len(),
        dropped
    );
    out
}

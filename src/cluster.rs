use anyhow::{bail, Result};
use tracing::{debug, info};

use crate::embed::EmbeddingProvider;
use crate::models::{Locale, Store, Story};
use crate::normalize::Incoming;
use crate::similarity::{dot, l2_normalize};

/// Counters for one `assign` call, for logging and callers' reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssignStats {
    pub attached: usize,
    pub spawned: usize,
    pub skipped: usize,
}

/// Assign each item in `batch` to an existing story of `locale` or spawn a
/// new one, updating centroids as a streaming fold: later items in the batch
/// see the stories and centroid updates produced by earlier ones.
///
/// Embeddings are obtained in one provider call before any mutation, so a
/// provider failure leaves the store exactly as it was. Re-ingesting an item
/// whose link a story already holds is a no-op for that story.
pub async fn assign<E: EmbeddingProvider>(
    embedder: &E,
    locale: Locale,
    batch: &[Incoming],
    threshold: f64,
    store: &mut Store,
) -> Result<AssignStats> {
    let mut stats = AssignStats::default();
    if batch.is_empty() {
        debug!("Clustering skipped - locale={}, empty batch", locale);
        return Ok(stats);
    }

    debug!(
        "Clustering started - locale={}, batch={}, threshold={}, existing_stories={}",
        locale,
        batch.len(),
        threshold,
        store.stories_for(locale).count()
    );

    // single provider call for the whole batch; nothing below can fail,
    // so the store is never left half-updated
    let texts: Vec<String> = batch.iter().map(|inc| inc.embed_text.clone()).collect();
    let mut vecs = embedder.embed(&texts).await?;
    if vecs.len() != batch.len() {
        bail!("Embedding count mismatch: batch={}, vectors={}", batch.len(), vecs.len());
    }
    let dim = vecs.first().map(|v| v.len()).unwrap_or(0);
    if dim == 0 || vecs.iter().any(|v| v.len() != dim) {
        bail!("Embedding dimension inconsistent within batch (expected {})", dim);
    }
    if let Some(st) = store.stories_for(locale).next() {
        if st.centroid.len() != dim {
            bail!(
                "Embedding dimension {} does not match stored centroids of {} (dim {})",
                dim,
                locale,
                st.centroid.len()
            );
        }
    }
    for v in &mut vecs {
        l2_normalize(v);
    }

    for (inc, vec) in batch.iter().zip(vecs.into_iter()) {
        // nearest current centroid among this locale's stories; strict max,
        // so on exact ties the earliest (lowest-id) story wins
        let mut best: Option<(usize, f64)> = None;
        for (idx, story) in store.stories.iter().enumerate() {
            if story.locale != locale {
                continue;
            }
            let sim = dot(&vec, &story.centroid);
            if best.map_or(true, |(_, b)| sim > b) {
                best = Some((idx, sim));
            }
        }

        match best {
            Some((idx, sim)) if sim >= threshold => {
                let story = &mut store.stories[idx];
                if story.contains_link(&inc.item.link) {
                    debug!(
                        "Skipping already-ingested link - story={}, link={}",
                        story.id, inc.item.link
                    );
                    stats.skipped += 1;
                    continue;
                }
                story.items.push(inc.item.clone());
                let n = story.items.len() as f64;
                // running mean of assignment-time embeddings, then renormalize
                for (c, x) in story.centroid.iter_mut().zip(vec.iter()) {
                    *c = (((*c as f64) * (n - 1.0) + *x as f64) / n) as f32;
                }
                l2_normalize(&mut story.centroid);
                story.items.sort_by_key(|it| it.published);
                debug!(
                    "Attached item - story={}, similarity={:.4}, items={}",
                    story.id,
                    sim,
                    story.items.len()
                );
                stats.attached += 1;
            }
            _ => {
                let id = store.next_id();
                debug!(
                    "Spawning story - id={}, locale={}, best_similarity={:.4}",
                    id,
                    locale,
                    best.map(|(_, s)| s).unwrap_or(-1.0)
                );
                store.stories.push(Story {
                    id,
                    locale,
                    centroid: vec,
                    items: vec![inc.item.clone()],
                });
                stats.spawned += 1;
            }
        }
    }

    info!(
        "Clustering completed - locale={}, batch={}, attached={}, spawned={}, skipped={}",
        locale,
        batch.len(),
        stats.attached,
        stats.spawned,
        stats.skipped
    );
    Ok(stats)
}

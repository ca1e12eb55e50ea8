use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Source of fixed-dimension embedding vectors. Vectors may come back at
/// arbitrary norm; the clustering engine normalizes them itself.
///
/// A failed call must leave no partial results: the engine treats the whole
/// batch as unprocessed and the store stays untouched.
pub trait EmbeddingProvider {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Client for an OpenAI-compatible `/v1/embeddings` endpoint. The model
/// itself runs out of process; this is just the wire adapter.
pub struct HttpEmbedder {
    client: Client,
    endpoint: String,
    model: String,
}

impl HttpEmbedder {
    pub fn new(endpoint: String, model: String) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self { client, endpoint, model })
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedRow>,
}

#[derive(Deserialize)]
struct EmbedRow {
    index: usize,
    embedding: Vec<f32>,
}

impl EmbeddingProvider for HttpEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let start = std::time::Instant::now();
        debug!("Embedding request - texts={}, model={}", texts.len(), self.model);

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&EmbedRequest { model: &self.model, input: texts })
            .send()
            .await
            .with_context(|| format!("Embedding request failed for {}", self.endpoint))?
            .error_for_status()
            .with_context(|| format!("Embedding HTTP error from {}", self.endpoint))?;

        let body: EmbedResponse = resp
            .json()
            .await
            .with_context(|| format!("Decoding embedding response from {}", self.endpoint))?;

        if body.data.len() != texts.len() {
            bail!(
                "Embedding count mismatch: requested {}, got {}",
                texts.len(),
                body.data.len()
            );
        }

        // response rows carry explicit indices; restore request order
        let mut rows = body.data;
        rows.sort_by_key(|r| r.index);
        let vectors: Vec<Vec<f32>> = rows.into_iter().map(|r| r.embedding).collect();

        let elapsed = start.elapsed();
        info!(
            "Embedding completed - texts={}, dim={}, duration={:.2}s",
            texts.len(),
            vectors.first().map(|v| v.len()).unwrap_or(0),
            elapsed.as_secs_f32()
        );
        Ok(vectors)
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::HashMap;

    /// Deterministic in-memory provider keyed by exact text.
    pub struct FakeEmbedder {
        vectors: HashMap<String, Vec<f32>>,
    }

    impl FakeEmbedder {
        pub fn new(entries: &[(&str, Vec<f32>)]) -> Self {
            let vectors = entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect();
            Self { vectors }
        }
    }

    impl EmbeddingProvider for FakeEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            texts
                .iter()
                .map(|t| {
                    self.vectors
                        .get(t)
                        .cloned()
                        .with_context(|| format!("no fake vector for {t:?}"))
                })
                .collect()
        }
    }

    /// Provider that always fails, for whole-batch failure semantics.
    pub struct FailingEmbedder;

    impl EmbeddingProvider for FailingEmbedder {
        async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            bail!("embedding backend unavailable")
        }
    }
}

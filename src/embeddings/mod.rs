//! Text embeddings for recipe retrieval
//!
//! `NimEmbeddingClient` calls an OpenAI-compatible `/v1/embeddings` endpoint
//! (NIM serves `nvidia/llama-3.2-nv-embedqa-1b-v2`). `EmbeddingIndex` keeps the
//! recipe vectors in memory and answers cosine-similarity queries.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::catalog::RecipeCatalog;
use crate::config::Config;
use crate::llm::LlmError;

mod index;

pub use index::{cosine_similarity, EmbeddingIndex};

/// Number of recipes embedded per request while indexing
const INDEX_BATCH_SIZE: usize = 32;

/// What the embedded text will be used for
///
/// Retrieval models embed queries and documents asymmetrically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Query,
    Passage,
}

/// A model that turns texts into vectors
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// Embed each text, returning one vector per input in input order
    async fn embed(&self, texts: &[String], input_type: InputType) -> Result<Vec<Vec<f32>>, LlmError>;
}

/// Embedding client for a NIM (or any OpenAI-compatible) embeddings endpoint
pub struct NimEmbeddingClient {
    model: String,
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsBody {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

impl NimEmbeddingClient {
    /// Create a new client from configuration
    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        debug!(embeddings_url = %config.embeddings_url, model = %config.embeddings_model, "from_config: called");
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(LlmError::Network)?;

        Ok(Self {
            model: config.embeddings_model.clone(),
            api_key: config.llm_api_key.clone(),
            base_url: config.embeddings_url.trim_end_matches('/').to_string(),
            http,
        })
    }
}

#[async_trait]
impl EmbeddingModel for NimEmbeddingClient {
    async fn embed(&self, texts: &[String], input_type: InputType) -> Result<Vec<Vec<f32>>, LlmError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!(count = texts.len(), ?input_type, "embed: called");

        let payload = serde_json::json!({
            "input": texts,
            "model": self.model,
            "input_type": input_type,
        });

        let mut request = self.http.post(format!("{}/embeddings", self.base_url)).json(&payload);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status: status.as_u16(), message });
        }

        let mut body: EmbeddingsBody = response.json().await?;
        if body.data.len() != texts.len() {
            return Err(LlmError::InvalidResponse(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                body.data.len()
            )));
        }

        body.data.sort_by_key(|d| d.index);
        Ok(body.data.into_iter().map(|d| d.embedding).collect())
    }
}

/// Embeds every recipe of the catalog into the index
///
/// Recipes are embedded as passages in batches. The first failing batch stops
/// indexing; recipes indexed before it stay searchable.
///
/// ### Returns
///
/// The number of recipes indexed
#[instrument(skip_all, fields(recipes = catalog.len()))]
pub async fn index_catalog(catalog: &RecipeCatalog, model: &dyn EmbeddingModel, index: &EmbeddingIndex) -> usize {
    let mut indexed = 0;

    for batch in catalog.all().chunks(INDEX_BATCH_SIZE) {
        let texts: Vec<String> = batch.iter().map(|r| r.embedding_text()).collect();
        match model.embed(&texts, InputType::Passage).await {
            Ok(vectors) => {
                for (recipe, vector) in batch.iter().zip(vectors) {
                    index.insert(recipe.id_legacy.clone(), vector).await;
                    indexed += 1;
                }
            }
            Err(e) => {
                warn!("Embedding recipes failed after {} indexed: {}", indexed, e);
                return indexed;
            }
        }
    }

    info!("Indexed {} recipes for semantic search", indexed);
    indexed
}

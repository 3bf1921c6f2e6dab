use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::debug;

/// In-memory vector index keyed by recipe id
///
/// Searches are brute-force cosine similarity, which is plenty for a recipe
/// database of a few thousand entries.
#[derive(Debug, Default)]
pub struct EmbeddingIndex {
    vectors: RwLock<HashMap<String, Vec<f32>>>,
}

impl EmbeddingIndex {
    /// Creates an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the vector for an id
    pub async fn insert(&self, id: String, vector: Vec<f32>) {
        self.vectors.write().await.insert(id, vector);
    }

    /// Number of indexed vectors
    pub async fn len(&self) -> usize {
        self.vectors.read().await.len()
    }

    /// Returns true if nothing has been indexed yet
    pub async fn is_empty(&self) -> bool {
        self.vectors.read().await.is_empty()
    }

    /// Finds the `top_k` ids most similar to the query vector
    ///
    /// Results are ordered by similarity, highest first, with ties broken by id.
    /// Vectors whose similarity is undefined (zero norm, mismatched length) are skipped.
    pub async fn search(&self, query: &[f32], top_k: usize) -> Vec<(String, f32)> {
        let vectors = self.vectors.read().await;

        let mut scored: Vec<(String, f32)> = vectors
            .iter()
            .filter_map(|(id, vector)| cosine_similarity(query, vector).map(|sim| (id.clone(), sim)))
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        scored.truncate(top_k);

        debug!("Semantic search returned {} of {} vectors", scored.len(), vectors.len());
        scored
    }
}

/// Cosine similarity of two vectors
///
/// Returns None for empty vectors, vectors of different lengths, or when
/// either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.is_empty() || a.len() != b.len() {
        return None;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }

    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    similarity.is_finite().then(|| similarity.clamp(-1.0, 1.0) as f32)
}

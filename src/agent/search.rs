use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::catalog::RecipeCatalog;
use crate::embeddings::{EmbeddingIndex, EmbeddingModel, InputType};
use crate::models::Recipe;

/// How a set of search results was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Cosine similarity over recipe embeddings
    Semantic,
    /// Word overlap with recipe titles, descriptions, cuisines and tags
    Lexical,
}

/// Recipes matching a query, best first
#[derive(Debug, Clone)]
pub struct SearchResults<'a> {
    pub recipes: Vec<&'a Recipe>,
    pub mode: SearchMode,
}

/// Finds the `top_k` recipes best matching a free-text query
///
/// Uses the embedding index when it holds any vectors and the query can be
/// embedded; otherwise (or when the semantic search finds nothing) ranks
/// recipes lexically. Lexical results only include recipes sharing a word with
/// the query, so they may be empty.
#[instrument(skip(catalog, embedder, index))]
pub async fn search_recipes<'a>(
    catalog: &'a RecipeCatalog,
    embedder: &dyn EmbeddingModel,
    index: &EmbeddingIndex,
    query: &str,
    top_k: usize,
) -> SearchResults<'a> {
    if top_k > 0 && !index.is_empty().await {
        match embedder.embed(&[query.to_string()], InputType::Query).await {
            Ok(vectors) => {
                if let Some(vector) = vectors.first() {
                    let recipes: Vec<&Recipe> = index
                        .search(vector, top_k)
                        .await
                        .into_iter()
                        .filter_map(|(id, _)| catalog.get(&id))
                        .collect();
                    if !recipes.is_empty() {
                        debug!("Semantic search found {} recipes", recipes.len());
                        return SearchResults { recipes, mode: SearchMode::Semantic };
                    }
                }
            }
            Err(e) => warn!("Embedding the query failed, using lexical search: {}", e),
        }
    }

    let recipes = catalog
        .lexical_rank(query)
        .into_iter()
        .take(top_k)
        .map(|(recipe, _)| recipe)
        .collect();
    SearchResults { recipes, mode: SearchMode::Lexical }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::index_catalog;
    use crate::test_utils::{sample_catalog, FakeEmbedder};

    fn ids(results: &SearchResults) -> Vec<String> {
        results.recipes.iter().map(|r| r.id_legacy.clone()).collect()
    }

    #[tokio::test]
    async fn test_semantic_search_when_indexed() {
        let catalog = sample_catalog();
        let embedder = FakeEmbedder::default();
        let index = EmbeddingIndex::new();
        index_catalog(&catalog, &embedder, &index).await;

        let results = search_recipes(&catalog, &embedder, &index, "Greek Salad", 2).await;

        assert_eq!(results.mode, SearchMode::Semantic);
        assert_eq!(results.recipes.len(), 2);
        assert_eq!(results.recipes[0].id_legacy, "greek-salad");
    }

    #[tokio::test]
    async fn test_lexical_fallback_with_empty_index() {
        let catalog = sample_catalog();
        let index = EmbeddingIndex::new();

        let results = search_recipes(&catalog, &FakeEmbedder::default(), &index, "vegetarian curry", 3).await;

        assert_eq!(results.mode, SearchMode::Lexical);
        assert_eq!(ids(&results)[0], "chickpea-curry");
        assert!(ids(&results).contains(&"greek-salad".to_string()));
    }

    #[tokio::test]
    async fn test_lexical_fallback_when_embedder_fails() {
        let catalog = sample_catalog();
        let index = EmbeddingIndex::new();
        index_catalog(&catalog, &FakeEmbedder::default(), &index).await;

        let results = search_recipes(&catalog, &FakeEmbedder::failing(), &index, "pancakes", 3).await;

        assert_eq!(results.mode, SearchMode::Lexical);
        assert_eq!(ids(&results), vec!["fluffy-pancakes".to_string()]);
    }

    #[tokio::test]
    async fn test_lexical_no_match() {
        let catalog = sample_catalog();
        let results = search_recipes(&catalog, &FakeEmbedder::default(), &EmbeddingIndex::new(), "sushi", 3).await;
        assert!(results.recipes.is_empty());
    }

    #[tokio::test]
    async fn test_top_k_limits_results() {
        let catalog = sample_catalog();
        let results = search_recipes(&catalog, &FakeEmbedder::default(), &EmbeddingIndex::new(), "spicy vegetarian", 1).await;
        assert_eq!(results.recipes.len(), 1);
    }
}

use std::collections::HashSet;

use tracing::{debug, instrument, warn};

use crate::catalog::RecipeCatalog;
use crate::llm::{self, ChatModel};
use crate::models::Recipe;

/// Maximum number of similar recipes attached to a recipe
pub const MAX_RECOMMENDATIONS: usize = 3;

/// Maximum number of candidate recipes listed in the prompt
const MAX_CANDIDATES: usize = 50;

/// Asks the language model for recipes similar to `recipe`
///
/// The model picks from a candidate list (recipes sharing words with the
/// recipe first, then the rest of the catalog in file order). Its reply is
/// trusted only as far as it names catalog recipes: unknown ids, duplicates
/// and the recipe itself are dropped.
///
/// ### Returns
///
/// Up to `MAX_RECOMMENDATIONS` recipes in the order the model gave them, or
/// an empty list if the model failed or answered with something unusable
#[instrument(skip_all, fields(recipe_id = %recipe.id_legacy))]
pub async fn recommend_similar<'a>(chat: &dyn ChatModel, catalog: &'a RecipeCatalog, recipe: &Recipe) -> Vec<&'a Recipe> {
    let candidates = candidates_for(catalog, recipe);
    if candidates.is_empty() {
        return Vec::new();
    }

    let prompt = recommendation_prompt(recipe, &candidates);
    let reply = match llm::ask(chat, &prompt, None).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("AI recommendations failed, skipping: {}", e);
            return Vec::new();
        }
    };

    let Some(ids) = parse_id_list(&reply) else {
        warn!("AI recommendations were not a JSON list of ids, skipping");
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let recommended: Vec<&Recipe> = ids
        .iter()
        .filter(|id| **id != recipe.id_legacy && seen.insert((*id).clone()))
        .filter_map(|id| catalog.get(id))
        .take(MAX_RECOMMENDATIONS)
        .collect();

    debug!("Model recommended {} of {} named recipes", recommended.len(), ids.len());
    recommended
}

/// Picks the recipes listed in the prompt
fn candidates_for<'a>(catalog: &'a RecipeCatalog, recipe: &Recipe) -> Vec<&'a Recipe> {
    let mut seen: HashSet<&str> = HashSet::from([recipe.id_legacy.as_str()]);
    let related = catalog.lexical_rank(&recipe.embedding_text()).into_iter().map(|(r, _)| r);

    related
        .chain(catalog.all().iter())
        .filter(|r| seen.insert(r.id_legacy.as_str()))
        .take(MAX_CANDIDATES)
        .collect()
}

fn recommendation_prompt(recipe: &Recipe, candidates: &[&Recipe]) -> String {
    let listing: Vec<String> = candidates
        .iter()
        .map(|r| format!("- {}: {}", r.id_legacy, r.title))
        .collect();

    format!(
        "You are an AI recipe recommender for CulinAIry.\n\
         Given the following recipe:\n\
         - Title: {}\n\
         - Cuisine: {}\n\
         - Description: {}\n\n\
         Available recipes (id: title):\n{}\n\n\
         Recommend {} similar recipes from the available list based on ingredients, cuisine, or flavor profile.\n\
         Return only a JSON list of recipe IDs (id_legacy).",
        recipe.title,
        recipe.cuisine.as_deref().unwrap_or("unknown"),
        recipe.description.as_deref().unwrap_or("no description"),
        listing.join("\n"),
        MAX_RECOMMENDATIONS,
    )
}

/// Extracts the first JSON array of strings from a model reply
///
/// Models often wrap the list in prose or a code fence, so the reply is
/// scanned for the first `[`...`]` span that parses. Non-string entries are
/// ignored.
pub fn parse_id_list(reply: &str) -> Option<Vec<String>> {
    for (start, _) in reply.match_indices('[') {
        for (offset, _) in reply[start..].match_indices(']') {
            let span = &reply[start..start + offset + 1];
            if let Ok(values) = serde_json::from_str::<Vec<serde_json::Value>>(span) {
                return Some(
                    values
                        .into_iter()
                        .filter_map(|v| v.as_str().map(|s| s.trim().to_string()))
                        .collect(),
                );
            }
        }
    }
    None
}

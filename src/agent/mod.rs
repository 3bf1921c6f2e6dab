//! The agentic workflow
//!
//! Combines recipe retrieval (semantic with a lexical fallback), deterministic
//! meal planning, and language-model calls for recommendations and summaries.
//! Model failures never fail a request here; they are logged and a fallback
//! answer is used instead.

use tracing::{instrument, warn};

use crate::llm::{self, ChatModel};

mod planner;
mod recommend;
mod search;

pub use planner::{
    shopping_list_for_meals, GeneratedPlan, MealPlanner, PlanError, PlanRequest, MAX_DAYS, MAX_MEALS_PER_DAY,
    MAX_PREFERENCES,
};
pub use recommend::{parse_id_list, recommend_similar, MAX_RECOMMENDATIONS};
pub use search::{search_recipes, SearchMode, SearchResults};

/// Prompt sent by the AI smoke test
pub const AI_TEST_PROMPT: &str = "Say 'Hello from CulinAIry AI!' in a fun way.";

/// Reply reported when the language model cannot be reached
pub const AI_UNAVAILABLE: &str = "AI service unavailable";

/// Checks that the language model answers
///
/// ### Returns
///
/// The model's reply, or `AI_UNAVAILABLE` if the call failed
#[instrument(skip_all)]
pub async fn ai_test(chat: &dyn ChatModel) -> String {
    match llm::ask(chat, AI_TEST_PROMPT, None).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Error querying the language model: {}", e);
            AI_UNAVAILABLE.to_string()
        }
    }
}

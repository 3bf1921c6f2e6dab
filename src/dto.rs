use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agent::{PlanRequest, SearchMode};
use crate::llm::{ChatMessage, ChatRequest, Role, TokenUsage, MEAL_PLANNER_SYSTEM_PROMPT};
use crate::models::{MealPlan, PlannedMeal, RecipeView};
use crate::shopping::ShoppingListItem;

/// Default number of recipes returned by `GET /recipes`
pub const DEFAULT_LIST_LIMIT: usize = 10;

/// Default number of results returned by `GET /recipes/search`
pub const DEFAULT_TOP_K: usize = 3;

/// Largest `top_k` accepted by `GET /recipes/search`
pub const MAX_TOP_K: usize = 50;

/// Highest sampling temperature accepted by the chat endpoints
pub const MAX_TEMPERATURE: f32 = 2.0;

fn default_list_limit() -> usize {
    DEFAULT_LIST_LIMIT
}

/// Data transfer object for generating a meal plan
///
/// This struct is used to deserialize JSON requests for `POST /plan-meals`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PlanMealsDto {
    /// Number of meals on each day
    pub meals_per_day: i32,

    /// Number of days to plan
    pub days: i32,

    /// Free-text dietary or taste preferences (`"vegetarian"`, `"spicy"`, ...)
    #[serde(default)]
    pub preferences: Option<Vec<String>>,

    /// Shuffle seed, to reproduce an earlier plan
    #[serde(default)]
    pub seed: Option<u64>,
}

impl PlanMealsDto {
    /// Converts the request body into a planner request
    pub fn into_request(self) -> PlanRequest {
        PlanRequest {
            days: self.days,
            meals_per_day: self.meals_per_day,
            preferences: self.preferences.unwrap_or_default(),
            seed: self.seed,
        }
    }
}

/// Query parameters for listing recipes
///
/// `tag` may be repeated (`?tag=vegetarian&tag=spicy`); a recipe must carry all of them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ListRecipesQuery {
    #[serde(default = "default_list_limit")]
    pub limit: usize,

    #[serde(default)]
    pub tag: Vec<String>,
}

impl Default for ListRecipesQuery {
    fn default() -> Self {
        Self { limit: DEFAULT_LIST_LIMIT, tag: Vec::new() }
    }
}

/// Query parameters for searching recipes
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    /// Free-text query
    #[serde(default)]
    pub q: String,

    /// Number of results, `DEFAULT_TOP_K` when absent
    #[serde(default)]
    pub top_k: Option<usize>,
}

impl SearchQuery {
    /// Returns the trimmed query and the number of results to return
    ///
    /// ### Errors
    ///
    /// Returns a message if the query is blank or `top_k` is outside `1..=MAX_TOP_K`
    pub fn validate(&self) -> Result<(&str, usize), String> {
        let q = self.q.trim();
        if q.is_empty() {
            return Err("Query parameter 'q' cannot be empty".to_string());
        }
        let top_k = self.top_k.unwrap_or(DEFAULT_TOP_K);
        if !(1..=MAX_TOP_K).contains(&top_k) {
            return Err(format!("top_k must be between 1 and {}", MAX_TOP_K));
        }
        Ok((q, top_k))
    }
}

/// Data transfer object for a chat request
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatDto {
    /// The conversation so far, oldest first
    pub messages: Vec<ChatMessage>,

    #[serde(default)]
    pub temperature: Option<f32>,

    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl ChatDto {
    /// Validates the conversation and converts it into a model request
    ///
    /// The meal-planning system prompt is prepended unless the conversation
    /// already starts with a system message.
    pub fn into_request(self) -> Result<ChatRequest, String> {
        if self.messages.is_empty() {
            return Err("At least one message is required".to_string());
        }
        if self.messages.iter().all(|m| m.content.trim().is_empty()) {
            return Err("Messages cannot all be empty".to_string());
        }
        if let Some(t) = self.temperature
            && !(0.0..=MAX_TEMPERATURE).contains(&t)
        {
            return Err(format!("temperature must be between 0 and {}", MAX_TEMPERATURE));
        }
        if self.max_tokens == Some(0) {
            return Err("max_tokens must be positive".to_string());
        }

        let mut messages = self.messages;
        if messages[0].role != Role::System {
            messages.insert(0, ChatMessage::system(MEAL_PLANNER_SYSTEM_PROMPT));
        }

        Ok(ChatRequest {
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        })
    }
}

/// A model reply to `POST /ai/chat`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatReplyDto {
    pub reply: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

/// Result of the AI smoke test
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AiTestDto {
    pub status: String,
    pub prompt: String,
    pub ai_response: String,
}

/// Search results with the way they were found
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SearchResultsDto {
    pub query: String,
    pub mode: SearchMode,
    pub results: Vec<RecipeView>,
}

/// One planned meal
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PlannedMealDto {
    /// Meal of the day, starting at 1
    pub slot: i32,
    pub recipe_id: String,
    pub title: String,
}

/// The meals of one day of a plan
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PlanDayDto {
    /// Day of the plan, starting at 1
    pub day: i32,
    pub meals: Vec<PlannedMealDto>,
}

/// A complete meal plan, as returned by `POST /plan-meals` and `GET /meal-plans/{id}`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PlanResponseDto {
    pub id: String,
    /// The plan's summary
    pub message: String,
    pub meals_per_day: i32,
    pub days: i32,
    pub preferences: Vec<String>,
    pub seed: u64,
    pub plan: Vec<PlanDayDto>,
    pub shopping_list: Vec<ShoppingListItem>,
    pub created_at: DateTime<Utc>,
}

impl PlanResponseDto {
    /// Builds the response from a plan and its meals
    ///
    /// Meals are grouped by day; `meals` must be ordered by (day, slot).
    pub fn new(plan: &MealPlan, meals: &[PlannedMeal], shopping_list: Vec<ShoppingListItem>) -> Self {
        let mut days: Vec<PlanDayDto> = Vec::new();
        for meal in meals {
            let entry = PlannedMealDto {
                slot: meal.get_slot_index(),
                recipe_id: meal.get_recipe_id(),
                title: meal.get_recipe_title(),
            };
            match days.last_mut() {
                Some(day) if day.day == meal.get_day_index() => day.meals.push(entry),
                _ => days.push(PlanDayDto { day: meal.get_day_index(), meals: vec![entry] }),
            }
        }

        Self {
            id: plan.get_id(),
            message: plan.get_summary(),
            meals_per_day: plan.get_meals_per_day(),
            days: plan.get_days(),
            preferences: plan.get_preferences(),
            seed: plan.get_seed(),
            plan: days,
            shopping_list,
            created_at: plan.get_created_at(),
        }
    }
}

/// A stored plan without its meals, for listings
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MealPlanSummaryDto {
    pub id: String,
    pub days: i32,
    pub meals_per_day: i32,
    pub preferences: Vec<String>,
    pub summary: String,
    pub seed: u64,
    pub created_at: DateTime<Utc>,
}

impl From<&MealPlan> for MealPlanSummaryDto {
    fn from(plan: &MealPlan) -> Self {
        Self {
            id: plan.get_id(),
            days: plan.get_days(),
            meals_per_day: plan.get_meals_per_day(),
            preferences: plan.get_preferences(),
            summary: plan.get_summary(),
            seed: plan.get_seed(),
            created_at: plan.get_created_at(),
        }
    }
}

/// The shopping list of a stored plan
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ShoppingListDto {
    pub meal_plan_id: String,
    pub items: Vec<ShoppingListItem>,
}

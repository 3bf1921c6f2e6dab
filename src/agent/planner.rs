use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::search::search_recipes;
use crate::catalog::RecipeCatalog;
use crate::embeddings::{EmbeddingIndex, EmbeddingModel};
use crate::llm::{self, ChatModel};
use crate::models::{MealPlan, PlannedMeal, Recipe};
use crate::shopping::{build_shopping_list, ShoppingListItem};

/// Longest plan that can be generated, in days
pub const MAX_DAYS: i32 = 14;

/// Most meals that can be planned for a single day
pub const MAX_MEALS_PER_DAY: i32 = 6;

/// Most preferences a plan request may carry
pub const MAX_PREFERENCES: usize = 20;

/// Randomly chosen seeds stay below 2^53 so JavaScript clients read them exactly
const MAX_RANDOM_SEED: u64 = 1 << 53;

/// Why a plan could not be generated
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("{0}")]
    Invalid(String),
    #[error("No recipes available to plan with")]
    NoRecipes,
}

/// What to plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRequest {
    pub days: i32,
    pub meals_per_day: i32,
    pub preferences: Vec<String>,
    /// Shuffle seed; a random one is chosen when absent
    pub seed: Option<u64>,
}

impl PlanRequest {
    /// Checks the bounds of the request and returns its trimmed preferences
    pub fn validate(&self) -> Result<Vec<String>, PlanError> {
        if !(1..=MAX_DAYS).contains(&self.days) {
            return Err(PlanError::Invalid(format!("days must be between 1 and {}", MAX_DAYS)));
        }
        if !(1..=MAX_MEALS_PER_DAY).contains(&self.meals_per_day) {
            return Err(PlanError::Invalid(format!(
                "meals_per_day must be between 1 and {}",
                MAX_MEALS_PER_DAY
            )));
        }
        if self.preferences.len() > MAX_PREFERENCES {
            return Err(PlanError::Invalid(format!(
                "At most {} preferences are allowed",
                MAX_PREFERENCES
            )));
        }

        let preferences: Vec<String> = self.preferences.iter().map(|p| p.trim().to_string()).collect();
        if preferences.iter().any(|p| p.is_empty()) {
            return Err(PlanError::Invalid("Preferences cannot be empty".to_string()));
        }
        Ok(preferences)
    }

    /// Total number of meal slots requested
    pub fn slot_count(&self) -> usize {
        (self.days.max(0) as usize) * (self.meals_per_day.max(0) as usize)
    }
}

/// A freshly generated, not yet stored, meal plan
#[derive(Debug, Clone)]
pub struct GeneratedPlan {
    pub plan: MealPlan,
    /// One entry per (day, slot), ordered by day then slot
    pub meals: Vec<PlannedMeal>,
    pub shopping_list: Vec<ShoppingListItem>,
}

/// Generates meal plans from the recipe catalog
pub struct MealPlanner<'a> {
    catalog: &'a RecipeCatalog,
    chat: &'a dyn ChatModel,
    embedder: &'a dyn EmbeddingModel,
    index: &'a EmbeddingIndex,
}

impl<'a> MealPlanner<'a> {
    pub fn new(
        catalog: &'a RecipeCatalog,
        chat: &'a dyn ChatModel,
        embedder: &'a dyn EmbeddingModel,
        index: &'a EmbeddingIndex,
    ) -> Self {
        Self { catalog, chat, embedder, index }
    }

    /// Generates a meal plan
    ///
    /// Candidate recipes are retrieved for the preferences, shuffled with the
    /// request's seed and assigned to the slots day by day, cycling through
    /// the candidates so no recipe repeats until all have been used. The same
    /// catalog, preferences and seed always give the same assignment.
    ///
    /// ### Errors
    ///
    /// `PlanError::Invalid` if the request is out of bounds,
    /// `PlanError::NoRecipes` if the catalog is empty
    #[instrument(skip(self))]
    pub async fn plan(&self, request: &PlanRequest) -> Result<GeneratedPlan, PlanError> {
        let preferences = request.validate()?;
        if self.catalog.is_empty() {
            return Err(PlanError::NoRecipes);
        }

        let seed = request.seed.unwrap_or_else(|| rand::rng().random_range(0..MAX_RANDOM_SEED));
        let mut pool = self.candidates(&preferences, request.slot_count()).await;
        pool.shuffle(&mut StdRng::seed_from_u64(seed));
        debug!(seed, candidates = pool.len(), "plan: candidates shuffled");

        let assignment = fill_slots(&pool, request.days, request.meals_per_day);
        let summary = self.summarize(request, &preferences, &assignment).await;

        let plan = MealPlan::new(request.days, request.meals_per_day, &preferences, summary, seed);
        let meals: Vec<PlannedMeal> = assignment
            .iter()
            .map(|(day, slot, recipe)| {
                PlannedMeal::new(&plan.get_id(), *day, *slot, recipe.id_legacy.clone(), recipe.title.clone())
            })
            .collect();
        let shopping_list = build_shopping_list(assignment.iter().map(|(_, _, recipe)| *recipe));

        info!("Generated meal plan {} with {} meals", plan.get_id(), meals.len());
        Ok(GeneratedPlan { plan, meals, shopping_list })
    }

    /// Retrieves the recipes to plan with
    ///
    /// Without preferences every recipe is a candidate. Otherwise the best
    /// `slots` matches of the joined preferences are used, or the whole
    /// catalog if nothing matches.
    async fn candidates(&self, preferences: &[String], slots: usize) -> Vec<&'a Recipe> {
        if preferences.is_empty() {
            return self.catalog.all().iter().collect();
        }

        let query = preferences.join(", ");
        let results = search_recipes(self.catalog, self.embedder, self.index, &query, slots).await;
        if results.recipes.is_empty() {
            debug!("No recipe matched the preferences, planning with the whole catalog");
            return self.catalog.all().iter().collect();
        }
        debug!(mode = ?results.mode, matched = results.recipes.len(), "candidates: retrieved");
        results.recipes
    }

    /// Asks the model for a short description of the plan
    async fn summarize(&self, request: &PlanRequest, preferences: &[String], assignment: &[(i32, i32, &Recipe)]) -> String {
        let fallback = format!("{}-day meal plan with {} meals.", request.days, assignment.len());

        let schedule: Vec<String> = (1..=request.days)
            .map(|day| {
                let titles: Vec<&str> = assignment
                    .iter()
                    .filter(|(d, _, _)| *d == day)
                    .map(|(_, _, recipe)| recipe.title.as_str())
                    .collect();
                format!("Day {}: {}", day, titles.join(", "))
            })
            .collect();
        let preferences = if preferences.is_empty() {
            "none".to_string()
        } else {
            preferences.join(", ")
        };

        let prompt = format!(
            "Write a short, friendly summary (at most 3 sentences) of this {}-day meal plan \
             with {} meals per day.\nPreferences: {}\n{}",
            request.days,
            request.meals_per_day,
            preferences,
            schedule.join("\n"),
        );

        match llm::ask(self.chat, &prompt, None).await {
            Ok(summary) if !summary.trim().is_empty() => summary,
            Ok(_) => fallback,
            Err(e) => {
                warn!("Plan summary failed, using default: {}", e);
                fallback
            }
        }
    }
}

/// Assigns recipes to slots in order (day 1 slot 1, day 1 slot 2, ...),
/// cycling through `pool`
///
/// Returns `(day, slot, recipe)` triples with 1-based indices. `pool` must not be empty.
pub(crate) fn fill_slots<'r>(pool: &[&'r Recipe], days: i32, meals_per_day: i32) -> Vec<(i32, i32, &'r Recipe)> {
    if pool.is_empty() {
        return Vec::new();
    }

    (1..=days)
        .flat_map(|day| (1..=meals_per_day).map(move |slot| (day, slot)))
        .enumerate()
        .map(|(i, (day, slot))| (day, slot, pool[i % pool.len()]))
        .collect()
}

/// Rebuilds the shopping list of a stored plan from the catalog
///
/// Meals whose recipe is no longer in the catalog are skipped.
pub fn shopping_list_for_meals(catalog: &RecipeCatalog, meals: &[PlannedMeal]) -> Vec<ShoppingListItem> {
    let recipes: Vec<&Recipe> = meals
        .iter()
        .filter_map(|meal| {
            let recipe = catalog.get(&meal.get_recipe_id());
            if recipe.is_none() {
                warn!("Planned recipe {} is no longer in the catalog", meal.get_recipe_id());
            }
            recipe
        })
        .collect();
    build_shopping_list(recipes)
}

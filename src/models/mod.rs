/// Data models module
///
/// This module defines the core data structures used throughout the application.
/// Recipes come from the recipe database file and are held in memory; meal plans
/// map to database tables and are persisted through the repository layer.

// Re-export all model types
mod json_value;
pub use json_value::JsonValue;

mod recipe;
pub use recipe::{parse_quantity, Ingredient, Recipe, RecipeView};
pub(crate) use recipe::tokenize;

mod meal_plan;
pub use meal_plan::{MealPlan, PlannedMeal};

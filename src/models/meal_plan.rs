use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::JsonValue;

/// Represents a generated meal plan
///
/// This struct maps directly to the `meal_plans` table in the database.
/// The individual meals live in `planned_meals`, one row per (day, slot).
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::meal_plans)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MealPlan {
    /// Unique identifier for the plan (UUID v4 as string)
    id: String,

    /// Number of planned days
    days: i32,

    /// Number of meals on each day
    meals_per_day: i32,

    /// The preferences the plan was generated for, stored as a JSON list
    preferences: JsonValue,

    /// Short human-readable description of the plan
    summary: String,

    /// Seed of the shuffle used to assign recipes to slots
    seed: i64,

    /// When this plan was created
    created_at: NaiveDateTime,
}

impl MealPlan {
    /// Creates a new meal plan
    ///
    /// This method automatically generates a UUID v4 for the ID and sets
    /// the created_at timestamp to the current time.
    pub fn new(days: i32, meals_per_day: i32, preferences: &[String], summary: String, seed: u64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            days,
            meals_per_day,
            preferences: JsonValue::from(preferences),
            summary,
            // Stored bit-for-bit; SQLite has no unsigned 64-bit column type
            seed: seed as i64,
            created_at: Utc::now().naive_utc(),
        }
    }

    /// Gets the plan's ID
    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    /// Gets the number of planned days
    pub fn get_days(&self) -> i32 {
        self.days
    }

    /// Gets the number of meals per day
    pub fn get_meals_per_day(&self) -> i32 {
        self.meals_per_day
    }

    /// Gets the preferences the plan was generated for
    pub fn get_preferences(&self) -> Vec<String> {
        self.preferences.as_string_list()
    }

    /// Gets the plan's summary
    pub fn get_summary(&self) -> String {
        self.summary.clone()
    }

    /// Gets the shuffle seed
    pub fn get_seed(&self) -> u64 {
        self.seed as u64
    }

    /// Gets the creation timestamp
    pub fn get_created_at(&self) -> DateTime<Utc> {
        self.created_at.and_utc()
    }
}

/// A single meal slot of a meal plan
///
/// This struct maps to the `planned_meals` table. Day and slot indices are 1-based.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::planned_meals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PlannedMeal {
    /// Unique identifier for the slot (UUID v4 as string)
    id: String,

    /// The plan this slot belongs to
    meal_plan_id: String,

    /// Day of the plan, starting at 1
    day_index: i32,

    /// Meal of the day, starting at 1
    slot_index: i32,

    /// The `id_legacy` of the planned recipe
    recipe_id: String,

    /// Title of the recipe at planning time
    recipe_title: String,
}

impl PlannedMeal {
    /// Creates a new planned meal for the given plan
    pub fn new(meal_plan_id: &str, day_index: i32, slot_index: i32, recipe_id: String, recipe_title: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            meal_plan_id: meal_plan_id.to_string(),
            day_index,
            slot_index,
            recipe_id,
            recipe_title,
        }
    }

    /// Gets the plan this slot belongs to
    pub fn get_meal_plan_id(&self) -> String {
        self.meal_plan_id.clone()
    }

    /// Gets the 1-based day index
    pub fn get_day_index(&self) -> i32 {
        self.day_index
    }

    /// Gets the 1-based slot index within the day
    pub fn get_slot_index(&self) -> i32 {
        self.slot_index
    }

    /// Gets the planned recipe's ID
    pub fn get_recipe_id(&self) -> String {
        self.recipe_id.clone()
    }

    /// Gets the planned recipe's title
    pub fn get_recipe_title(&self) -> String {
        self.recipe_title.clone()
    }
}

use crate::db::DbPool;
use crate::models::{MealPlan, PlannedMeal};
use crate::schema::{meal_plans, planned_meals};
use anyhow::{ensure, Result};
use diesel::prelude::*;
use tracing::{debug, info, instrument};

/// Stores a meal plan together with its meals
///
/// The plan and all of its meals are written in one transaction, so a stored
/// plan is never missing slots.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `plan` - The plan to store
/// * `meals` - The plan's meals, one per (day, slot)
///
/// ### Errors
///
/// Returns an error if:
/// - A meal belongs to a different plan
/// - Unable to get a connection from the pool
/// - An insert fails (for example a duplicate (day, slot))
#[instrument(skip_all, fields(meal_plan_id = %plan.get_id(), meals = meals.len()))]
pub fn create_meal_plan(pool: &DbPool, plan: &MealPlan, meals: &[PlannedMeal]) -> Result<()> {
    ensure!(
        meals.iter().all(|meal| meal.get_meal_plan_id() == plan.get_id()),
        "Every meal must belong to plan {}",
        plan.get_id()
    );

    let conn = &mut pool.get()?;

    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        diesel::insert_into(meal_plans::table).values(plan).execute(conn)?;
        diesel::insert_into(planned_meals::table).values(meals).execute(conn)?;
        Ok(())
    })?;

    info!("Stored meal plan {}", plan.get_id());
    Ok(())
}

/// Retrieves a meal plan and its meals by the plan's ID
///
/// ### Returns
///
/// The plan with its meals ordered by day then slot, or None if no plan has this ID
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - A database query fails
#[instrument(skip(pool))]
pub fn get_meal_plan(pool: &DbPool, id: &str) -> Result<Option<(MealPlan, Vec<PlannedMeal>)>> {
    let conn = &mut pool.get()?;

    let Some(plan) = meal_plans::table
        .find(id)
        .select(MealPlan::as_select())
        .first(conn)
        .optional()?
    else {
        debug!("Meal plan not found");
        return Ok(None);
    };

    let meals = planned_meals::table
        .filter(planned_meals::meal_plan_id.eq(id))
        .order((planned_meals::day_index.asc(), planned_meals::slot_index.asc()))
        .select(PlannedMeal::as_select())
        .load(conn)?;

    debug!("Meal plan found with {} meals", meals.len());
    Ok(Some((plan, meals)))
}

/// Lists all stored meal plans, newest first
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The database query fails
#[instrument(skip(pool))]
pub fn list_meal_plans(pool: &DbPool) -> Result<Vec<MealPlan>> {
    let conn = &mut pool.get()?;

    let plans = meal_plans::table
        .order((meal_plans::created_at.desc(), meal_plans::id.asc()))
        .select(MealPlan::as_select())
        .load(conn)?;

    info!("Retrieved {} meal plans", plans.len());
    Ok(plans)
}

/// Deletes a meal plan and its meals
///
/// ### Returns
///
/// The number of plans removed: 1 if the plan existed, 0 otherwise
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - A delete fails
#[instrument(skip(pool))]
pub fn delete_meal_plan(pool: &DbPool, id: &str) -> Result<usize> {
    let conn = &mut pool.get()?;

    let removed = conn.transaction::<_, diesel::result::Error, _>(|conn| {
        diesel::delete(planned_meals::table.filter(planned_meals::meal_plan_id.eq(id))).execute(conn)?;
        diesel::delete(meal_plans::table.find(id)).execute(conn)
    })?;

    if removed > 0 {
        info!("Deleted meal plan {}", id);
    }
    Ok(removed)
}

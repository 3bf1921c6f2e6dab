use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{debug, info, instrument};

use crate::agent::{shopping_list_for_meals, MealPlanner};
use crate::dto::{MealPlanSummaryDto, PlanMealsDto, PlanResponseDto, ShoppingListDto};
use crate::errors::ApiError;
use crate::repo;
use crate::AppState;

/// Handler for generating a meal plan
///
/// This function handles POST requests to `/plan-meals`.
///
/// ### Arguments
///
/// * `state` - The application state
/// * `payload` - The number of days and meals per day, optional preferences and seed
///
/// ### Returns
///
/// The generated plan as JSON, after it has been stored
#[instrument(skip(state, payload), fields(days = %payload.days, meals_per_day = %payload.meals_per_day))]
pub async fn plan_meals_handler(
    // Extract the shared state
    State(state): State<AppState>,
    // Extract and deserialize the JSON request body
    Json(payload): Json<PlanMealsDto>,
) -> Result<Json<PlanResponseDto>, ApiError> {
    info!("Generating meal plan");

    let planner = MealPlanner::new(&state.catalog, state.chat.as_ref(), state.embedder.as_ref(), &state.index);
    let generated = planner.plan(&payload.into_request()).await?;

    // Store the plan before answering, so its id can be fetched again
    repo::create_meal_plan(&state.pool, &generated.plan, &generated.meals).map_err(ApiError::Database)?;

    info!("Successfully created meal plan with id: {}", generated.plan.get_id());
    Ok(Json(PlanResponseDto::new(&generated.plan, &generated.meals, generated.shopping_list)))
}

/// Handler for listing stored meal plans
///
/// This function handles GET requests to `/meal-plans`.
///
/// ### Returns
///
/// Summaries of all stored plans, newest first
#[instrument(skip(state))]
pub async fn list_meal_plans_handler(
    // Extract the shared state
    State(state): State<AppState>,
) -> Result<Json<Vec<MealPlanSummaryDto>>, ApiError> {
    debug!("Listing meal plans");

    let plans = repo::list_meal_plans(&state.pool).map_err(ApiError::Database)?;

    debug!("Found {} meal plans", plans.len());
    Ok(Json(plans.iter().map(MealPlanSummaryDto::from).collect()))
}

/// Handler for retrieving a stored meal plan
///
/// This function handles GET requests to `/meal-plans/{id}`.
///
/// ### Arguments
///
/// * `state` - The application state
/// * `id` - The ID of the plan, extracted from the URL path
///
/// ### Returns
///
/// The plan with its meals grouped by day and a shopping list rebuilt from the catalog
#[instrument(skip(state), fields(meal_plan_id = %id))]
pub async fn get_meal_plan_handler(
    // Extract the shared state
    State(state): State<AppState>,
    // Extract the plan ID from the URL path
    Path(id): Path<String>,
) -> Result<Json<PlanResponseDto>, ApiError> {
    debug!("Getting meal plan");

    let (plan, meals) = repo::get_meal_plan(&state.pool, &id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound("Meal plan"))?;
    let shopping_list = shopping_list_for_meals(&state.catalog, &meals);

    Ok(Json(PlanResponseDto::new(&plan, &meals, shopping_list)))
}

/// Handler for the shopping list of a stored meal plan
///
/// This function handles GET requests to `/meal-plans/{id}/shopping-list`.
///
/// ### Arguments
///
/// * `state` - The application state
/// * `id` - The ID of the plan, extracted from the URL path
#[instrument(skip(state), fields(meal_plan_id = %id))]
pub async fn get_shopping_list_handler(
    // Extract the shared state
    State(state): State<AppState>,
    // Extract the plan ID from the URL path
    Path(id): Path<String>,
) -> Result<Json<ShoppingListDto>, ApiError> {
    debug!("Building shopping list");

    let (plan, meals) = repo::get_meal_plan(&state.pool, &id)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound("Meal plan"))?;

    Ok(Json(ShoppingListDto {
        meal_plan_id: plan.get_id(),
        items: shopping_list_for_meals(&state.catalog, &meals),
    }))
}

/// Handler for deleting a stored meal plan
///
/// This function handles DELETE requests to `/meal-plans/{id}`.
///
/// ### Returns
///
/// `204 No Content` once the plan and its meals are gone
#[instrument(skip(state), fields(meal_plan_id = %id))]
pub async fn delete_meal_plan_handler(
    // Extract the shared state
    State(state): State<AppState>,
    // Extract the plan ID from the URL path
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = repo::delete_meal_plan(&state.pool, &id).map_err(ApiError::Database)?;
    if deleted == 0 {
        return Err(ApiError::NotFound("Meal plan"));
    }

    info!("Deleted meal plan");
    Ok(StatusCode::NO_CONTENT)
}

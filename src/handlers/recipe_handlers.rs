use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::Query;
use tracing::{debug, info, instrument};

use crate::agent::{recommend_similar, search_recipes};
use crate::dto::{ListRecipesQuery, SearchQuery, SearchResultsDto};
use crate::errors::ApiError;
use crate::models::RecipeView;
use crate::AppState;

/// Handler for listing recipes
///
/// This function handles GET requests to `/recipes`.
///
/// ### Arguments
///
/// * `state` - The application state
/// * `query` - The page size and the tags every listed recipe must carry
///
/// ### Returns
///
/// Up to `limit` recipes in catalog order, with their image URLs resolved
#[instrument(skip(state))]
pub async fn list_recipes_handler(
    // Extract the shared state
    State(state): State<AppState>,
    // Extract the query parameters; `tag` may repeat
    Query(query): Query<ListRecipesQuery>,
) -> Result<Json<Vec<RecipeView>>, ApiError> {
    debug!("Listing recipes");

    let recipes: Vec<RecipeView> = state
        .catalog
        .list(query.limit, &query.tag)
        .into_iter()
        .map(|recipe| state.catalog.attach_images(recipe))
        .collect();

    debug!("Found {} recipes", recipes.len());
    Ok(Json(recipes))
}

/// Handler for searching recipes
///
/// This function handles GET requests to `/recipes/search`.
///
/// ### Arguments
///
/// * `state` - The application state
/// * `query` - The free-text query `q` and the number of results `top_k`
///
/// ### Returns
///
/// The best matching recipes, best first, and whether they were found
/// semantically or lexically
#[instrument(skip(state))]
pub async fn search_recipes_handler(
    // Extract the shared state
    State(state): State<AppState>,
    // Extract the query parameters
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResultsDto>, ApiError> {
    let (q, top_k) = query.validate().map_err(ApiError::InvalidRequest)?;
    info!("Searching recipes");

    let results = search_recipes(&state.catalog, state.embedder.as_ref(), &state.index, q, top_k).await;

    debug!("Search found {} recipes", results.recipes.len());
    Ok(Json(SearchResultsDto {
        query: q.to_string(),
        mode: results.mode,
        results: results
            .recipes
            .into_iter()
            .map(|recipe| state.catalog.attach_images(recipe))
            .collect(),
    }))
}

/// Handler for retrieving a specific recipe
///
/// This function handles GET requests to `/recipe/{id}`.
///
/// ### Arguments
///
/// * `state` - The application state
/// * `recipe_id` - The `id_legacy` of the recipe, extracted from the URL path
///
/// ### Returns
///
/// The recipe with its image URLs and up to three AI-recommended similar
/// recipes; the recommendations are empty if the model is unavailable
#[instrument(skip(state))]
pub async fn get_recipe_handler(
    // Extract the shared state
    State(state): State<AppState>,
    // Extract the recipe ID from the URL path
    Path(recipe_id): Path<String>,
) -> Result<Json<RecipeView>, ApiError> {
    debug!("Getting recipe");

    let recipe = state.catalog.get(&recipe_id).ok_or(ApiError::NotFound("Recipe"))?;

    let recommended: Vec<RecipeView> = recommend_similar(state.chat.as_ref(), &state.catalog, recipe)
        .await
        .into_iter()
        .map(|similar| state.catalog.attach_images(similar))
        .collect();

    let mut view = state.catalog.attach_images(recipe);
    view.recommended_recipes = Some(recommended);

    Ok(Json(view))
}

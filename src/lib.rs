/// CulinAIry: An Agentic Meal Planner Library
///
/// This library provides the core functionality of the CulinAIry backend:
/// an in-memory recipe catalog, semantic recipe retrieval, a meal planner
/// backed by a language model, persisted meal plans with shopping lists,
/// and the web API exposing all of it.
///
/// ### Modules
///
/// - `agent`: Retrieval, planning and recommendation workflow
/// - `catalog`: The recipe database loaded from JSON
/// - `config`: Layered configuration (defaults, config file, CLI/env)
/// - `db`: Database connection management
/// - `embeddings`: Embedding client and in-memory vector index
/// - `llm`: Chat model client
/// - `models`: Recipes and meal plans
/// - `repo`: Repository layer for database operations
/// - `schema`: Database schema definitions
/// - `shopping`: Shopping list aggregation
///
/// ### Web API
///
/// The library exposes a RESTful API using Axum with the following endpoints:
///
/// - `GET /`: Welcome message
/// - `GET /health`: Liveness probe
/// - `GET /recipes`: List recipes, optionally filtered by tag
/// - `GET /recipes/search`: Search recipes by free text
/// - `GET /recipe/{id}`: Get a recipe with AI recommendations
/// - `POST /plan-meals`: Generate and store a meal plan
/// - `GET /meal-plans`: List stored meal plans
/// - `GET /meal-plans/{id}`: Get a stored meal plan
/// - `GET /meal-plans/{id}/shopping-list`: Shopping list of a stored plan
/// - `DELETE /meal-plans/{id}`: Delete a stored meal plan
/// - `GET /ai/test`: Check that the language model answers
/// - `POST /ai/chat`: Chat with the meal-planning assistant
/// - `POST /ai/chat/stream`: Chat, streaming the reply as server-sent events

/// Agentic workflow module
pub mod agent;

/// Recipe database module
pub mod catalog;

/// Configuration module
pub mod config;

/// Database connection module
pub mod db;

/// Data transfer objects module
pub mod dto;

/// Embeddings module
pub mod embeddings;

/// API error module
pub mod errors;

/// Web API handlers module
pub mod handlers;

/// Language model module
pub mod llm;

/// Data models module
pub mod models;

/// Repository module for database operations
pub mod repo;

/// Database schema module
pub mod schema;

/// Shopping list module
pub mod shopping;

#[cfg(test)]
pub mod test_utils;

use anyhow::anyhow;
use axum::{
    routing::{get, post},
    Router,
};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::catalog::RecipeCatalog;
use crate::embeddings::{EmbeddingIndex, EmbeddingModel};
use crate::handlers::*;
use crate::llm::ChatModel;

/// Embedded migrations
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Shared state handed to every handler
///
/// Everything is behind an `Arc`, so cloning the state per request is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Meal plan storage
    pub pool: Arc<db::DbPool>,
    /// The recipe database, read-only after startup
    pub catalog: Arc<RecipeCatalog>,
    /// Chat model used for recommendations, summaries and chat
    pub chat: Arc<dyn ChatModel>,
    /// Embedding model used to embed search queries
    pub embedder: Arc<dyn EmbeddingModel>,
    /// Recipe vectors, filled in the background after startup
    pub index: Arc<EmbeddingIndex>,
}

/// Creates the application router with all routes configured
///
/// This function sets up the Axum router with all the API endpoints.
///
/// ### Arguments
///
/// * `state` - The shared state handed to all handlers
///
/// ### Returns
///
/// An Axum Router configured with all routes, permissive CORS and request tracing
pub fn create_app(state: AppState) -> Router {
    Router::new()
        // Welcome and liveness routes
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        // Route for listing recipes
        .route("/recipes", get(list_recipes_handler))
        // Route for searching recipes
        .route("/recipes/search", get(search_recipes_handler))
        // Route for getting a specific recipe by ID
        .route("/recipe/{id}", get(get_recipe_handler))
        // Route for generating a meal plan
        .route("/plan-meals", post(plan_meals_handler))
        // Routes for stored meal plans
        .route("/meal-plans", get(list_meal_plans_handler))
        .route("/meal-plans/{id}", get(get_meal_plan_handler).delete(delete_meal_plan_handler))
        .route("/meal-plans/{id}/shopping-list", get(get_shopping_list_handler))
        // Routes for talking to the language model
        .route("/ai/test", get(ai_test_handler))
        .route("/ai/chat", post(chat_handler))
        .route("/ai/chat/stream", post(chat_stream_handler))
        // Add the shared state
        .with_state(state)
        // The web UI is served from another origin
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Runs the embedded migrations
///
/// This function applies all pending database migrations to set up the schema.
///
/// ### Arguments
///
/// * `conn` - A mutable reference to a SQLite connection
///
/// ### Returns
///
/// An error if a migration failed to apply
pub fn run_migrations(conn: &mut diesel::SqliteConnection) -> anyhow::Result<()> {
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow!("Failed to run migrations: {}", e))?;
    Ok(())
}

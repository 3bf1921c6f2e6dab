use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::agent::PlanError;
use crate::llm::LlmError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("No recipes available to plan with")]
    NoRecipes,
    #[error("AI service error: {0}")]
    Upstream(#[from] LlmError),
}

impl From<PlanError> for ApiError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::Invalid(msg) => ApiError::InvalidRequest(msg),
            PlanError::NoRecipes => ApiError::NoRecipes,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Database(err) => {
                error!("Internal error: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found", what)),
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NoRecipes => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "No recipes available to plan with".to_string(),
            ),
            ApiError::Upstream(err) => {
                error!("AI service error: {}", err);
                (StatusCode::BAD_GATEWAY, "AI service unavailable".to_string())
            }
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

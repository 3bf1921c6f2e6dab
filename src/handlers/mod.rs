/// Web API Handlers
///
/// This module contains the handlers for the RESTful API endpoints.
/// Each handler is responsible for processing a specific type of HTTP request,
/// extracting the necessary data, calling the catalog, the agent or the
/// repository, and returning a properly formatted response.

mod health_handlers;
mod recipe_handlers;
mod plan_handlers;
mod ai_handlers;

// Re-export all handlers
pub use health_handlers::*;
pub use recipe_handlers::*;
pub use plan_handlers::*;
pub use ai_handlers::*;

use culinairy::dto::{
    AiTestDto, ChatDto, ChatReplyDto, MealPlanSummaryDto, PlanMealsDto, PlanResponseDto, SearchResultsDto,
    ShoppingListDto,
};
use culinairy::models::RecipeView;
use futures::StreamExt;
use reqwest::Client;
use reqwest_eventsource::{Event, EventSource};
use thiserror::Error;

/// Data of the event that ends a successful chat stream
const STREAM_DONE: &str = "[DONE]";

/// Error type for CLI client operations
#[derive(Debug, Error)]
pub enum ClientError {
    /// Server returned an error status with a message body
    #[error("Server error ({}): {message}", .status.as_u16())]
    Server { status: reqwest::StatusCode, message: String },
    /// Network/connection/request error
    #[error("{0}")]
    Request(#[source] reqwest::Error),
    /// The chat stream broke off or reported an error
    #[error("Stream error: {0}")]
    Stream(String),
}

/// Extension trait for checking HTTP responses and extracting server error messages
trait ResponseExt {
    /// Checks for error status and extracts the server's error message body
    async fn check(self) -> Result<reqwest::Response, ClientError>;
}

impl ResponseExt for reqwest::Response {
    async fn check(self) -> Result<reqwest::Response, ClientError> {
        if self.status().is_success() {
            return Ok(self);
        }
        let status = self.status();
        let message = match self.json::<serde_json::Value>().await {
            Ok(body) => body.get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("Unknown error")
                .to_string(),
            Err(_) => format!("HTTP {}", status),
        };
        Err(ClientError::Server { status, message })
    }
}

/// HTTP client wrapper for communicating with the CulinAIry server
pub struct CulinairyClient {
    /// The base URL of the server (e.g. "http://localhost:8080")
    base_url: String,
    /// The underlying HTTP client
    client: Client,
}

impl CulinairyClient {
    /// Creates a new CulinairyClient
    ///
    /// ### Arguments
    ///
    /// * `base_url` - The base URL of the CulinAIry server
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Checks that the server is up
    pub async fn health(&self) -> Result<serde_json::Value, ClientError> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await.map_err(ClientError::Request)?.check().await?;
        response.json().await.map_err(ClientError::Request)
    }

    // ── Recipe endpoints ─────────────────────────────────────────────

    /// Lists recipes, keeping only those carrying every tag
    pub async fn list_recipes(&self, limit: usize, tags: &[String]) -> Result<Vec<RecipeView>, ClientError> {
        let url = format!("{}/recipes", self.base_url);
        let mut params: Vec<(&str, String)> = vec![("limit", limit.to_string())];
        params.extend(tags.iter().map(|tag| ("tag", tag.clone())));

        let response = self.client.get(&url).query(&params)
            .send().await.map_err(ClientError::Request)?
            .check().await?;
        response.json().await.map_err(ClientError::Request)
    }

    /// Gets a recipe with its recommendations
    pub async fn get_recipe(&self, id: &str) -> Result<RecipeView, ClientError> {
        let url = format!("{}/recipe/{}", self.base_url, id);
        let response = self.client.get(&url).send().await.map_err(ClientError::Request)?.check().await?;
        response.json().await.map_err(ClientError::Request)
    }

    /// Searches recipes by free text
    pub async fn search_recipes(&self, query: &str, top_k: Option<usize>) -> Result<SearchResultsDto, ClientError> {
        let url = format!("{}/recipes/search", self.base_url);
        let mut params: Vec<(&str, String)> = vec![("q", query.to_string())];
        if let Some(top_k) = top_k {
            params.push(("top_k", top_k.to_string()));
        }

        let response = self.client.get(&url).query(&params)
            .send().await.map_err(ClientError::Request)?
            .check().await?;
        response.json().await.map_err(ClientError::Request)
    }

    // ── Meal plan endpoints ──────────────────────────────────────────

    /// Generates and stores a meal plan
    pub async fn plan_meals(&self, dto: &PlanMealsDto) -> Result<PlanResponseDto, ClientError> {
        let url = format!("{}/plan-meals", self.base_url);
        let response = self.client.post(&url).json(dto).send().await.map_err(ClientError::Request)?.check().await?;
        response.json().await.map_err(ClientError::Request)
    }

    /// Lists stored meal plans, newest first
    pub async fn list_meal_plans(&self) -> Result<Vec<MealPlanSummaryDto>, ClientError> {
        let url = format!("{}/meal-plans", self.base_url);
        let response = self.client.get(&url).send().await.map_err(ClientError::Request)?.check().await?;
        response.json().await.map_err(ClientError::Request)
    }

    /// Gets a stored meal plan
    pub async fn get_meal_plan(&self, id: &str) -> Result<PlanResponseDto, ClientError> {
        let url = format!("{}/meal-plans/{}", self.base_url, id);
        let response = self.client.get(&url).send().await.map_err(ClientError::Request)?.check().await?;
        response.json().await.map_err(ClientError::Request)
    }

    /// Gets the shopping list of a stored meal plan
    pub async fn get_shopping_list(&self, id: &str) -> Result<ShoppingListDto, ClientError> {
        let url = format!("{}/meal-plans/{}/shopping-list", self.base_url, id);
        let response = self.client.get(&url).send().await.map_err(ClientError::Request)?.check().await?;
        response.json().await.map_err(ClientError::Request)
    }

    /// Deletes a stored meal plan
    pub async fn delete_meal_plan(&self, id: &str) -> Result<(), ClientError> {
        let url = format!("{}/meal-plans/{}", self.base_url, id);
        self.client.delete(&url).send().await.map_err(ClientError::Request)?.check().await?;
        Ok(())
    }

    // ── AI endpoints ─────────────────────────────────────────────────

    /// Runs the server's AI smoke test
    pub async fn ai_test(&self) -> Result<AiTestDto, ClientError> {
        let url = format!("{}/ai/test", self.base_url);
        let response = self.client.get(&url).send().await.map_err(ClientError::Request)?.check().await?;
        response.json().await.map_err(ClientError::Request)
    }

    /// Sends a conversation and waits for the full reply
    pub async fn chat(&self, dto: &ChatDto) -> Result<ChatReplyDto, ClientError> {
        let url = format!("{}/ai/chat", self.base_url);
        let response = self.client.post(&url).json(dto).send().await.map_err(ClientError::Request)?.check().await?;
        response.json().await.map_err(ClientError::Request)
    }

    /// Sends a conversation and hands each reply fragment to `on_delta` as it arrives
    ///
    /// ### Returns
    ///
    /// The full reply once the server sends `[DONE]`
    pub async fn chat_stream<F>(&self, dto: &ChatDto, mut on_delta: F) -> Result<String, ClientError>
    where
        F: FnMut(&str),
    {
        let url = format!("{}/ai/chat/stream", self.base_url);
        let request = self.client.post(&url).json(dto);
        let mut es = EventSource::new(request).map_err(|e| ClientError::Stream(e.to_string()))?;
        // Reconnecting would send the conversation again
        es.set_retry_policy(Box::new(reqwest_eventsource::retry::Never));

        let mut reply = String::new();
        while let Some(event) = es.next().await {
            match event {
                Ok(Event::Open) => {}
                Ok(Event::Message(msg)) if msg.event == "error" => {
                    es.close();
                    return Err(ClientError::Stream(msg.data));
                }
                Ok(Event::Message(msg)) => {
                    if msg.data == STREAM_DONE {
                        es.close();
                        return Ok(reply);
                    }
                    on_delta(&msg.data);
                    reply.push_str(&msg.data);
                }
                Err(reqwest_eventsource::Error::InvalidStatusCode(status, response)) => {
                    es.close();
                    return Err(response.check().await.err().unwrap_or(ClientError::Server {
                        status,
                        message: format!("HTTP {}", status),
                    }));
                }
                Err(e) => {
                    es.close();
                    return Err(ClientError::Stream(e.to_string()));
                }
            }
        }

        Err(ClientError::Stream("stream ended before [DONE]".to_string()))
    }
}

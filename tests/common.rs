#![allow(dead_code)]

/// Common test utilities for CulinAIry integration tests
///
/// This file contains shared functions and utilities for all integration tests,
/// including test application setup, scripted stand-ins for the language and
/// embedding models, and helpers for sending requests to the router.

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use culinairy::{
    catalog::RecipeCatalog,
    create_app,
    db::init_pool,
    embeddings::{EmbeddingIndex, EmbeddingModel, InputType},
    llm::{ChatModel, ChatRequest, ChatResponse, LlmError, StreamChunk},
    run_migrations, AppState,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tower::Service;

/// Recipe database used by every integration test
///
/// Uses both spellings of the cuisine key, textual quantities and a bare
/// ingredient name, as found in real exports.
pub fn recipes_json() -> Value {
    json!({
        "recipes": [
            {
                "id_legacy": "cal-smart-tex-mex-beef-bowls",
                "title": "Cal Smart Tex-Mex Beef Bowls",
                "description": "Spicy ground beef bowls with rice and beans",
                "cousine": "Mexican",
                "tags": ["high-protein", "spicy"],
                "images": ["beef-bowls.jpg"],
                "ingredients": [
                    {"name": "Ground beef", "quantity": "1", "unit": "lb"},
                    {"name": "Rice", "quantity": "1 1/2", "unit": "cup"},
                    {"name": "Onion", "quantity": 1, "unit": "whole"}
                ]
            },
            {
                "id_legacy": "chickpea-coconut-curry",
                "title": "Chickpea Coconut Curry",
                "description": "Creamy vegetarian curry",
                "cuisine": "Indian",
                "tags": ["vegetarian", "spicy"],
                "images": ["https://cdn.example.com/curry.png"],
                "ingredients": [
                    {"name": "Chickpeas", "quantity": 400, "unit": "g"},
                    {"name": "Coconut milk", "quantity": "1", "unit": "cup"},
                    {"name": "onion", "quantity": 1}
                ]
            },
            {
                "id_legacy": "greek-salad",
                "title": "Greek Salad",
                "description": "Fresh vegetarian salad with feta",
                "cuisine": "Greek",
                "tags": ["vegetarian", "low-carb"],
                "ingredients": [
                    {"name": "Feta", "quantity": 200, "unit": "g"},
                    "Cucumber"
                ]
            },
            {
                "id_legacy": "blueberry-pancakes",
                "title": "Blueberry Pancakes",
                "description": "Fluffy breakfast pancakes",
                "cuisine": "American",
                "tags": ["breakfast"],
                "images": ["/pancakes.jpg"],
                "ingredients": [
                    {"name": "Flour", "quantity": "2", "unit": "cup"},
                    {"name": "Milk", "quantity": "3/4", "unit": "cup"}
                ]
            }
        ]
    })
}

/// A chat model with a scripted reply
///
/// Answers every request with the same reply, or fails every request when
/// built with `failing`. Received requests are recorded.
#[derive(Debug, Default)]
pub struct ScriptedChat {
    reply: Option<String>,
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedChat {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self { reply: Some(reply.into()), requests: Mutex::new(Vec::new()) }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    fn answer(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        self.requests.lock().unwrap().push(request);
        match self.reply {
            Some(ref reply) => Ok(ChatResponse {
                content: reply.clone(),
                finish_reason: Some("stop".to_string()),
                usage: None,
            }),
            None => Err(LlmError::ApiError { status: 503, message: "model offline".to_string() }),
        }
    }
}

#[async_trait]
impl ChatModel for ScriptedChat {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        self.answer(request)
    }

    async fn stream(
        &self,
        request: ChatRequest,
        chunk_tx: mpsc::Sender<StreamChunk>,
    ) -> Result<ChatResponse, LlmError> {
        match self.answer(request) {
            Ok(response) => {
                for word in response.content.split_inclusive(' ') {
                    let _ = chunk_tx.send(StreamChunk::Delta(word.to_string())).await;
                }
                let _ = chunk_tx.send(StreamChunk::Done).await;
                Ok(response)
            }
            Err(e) => {
                let _ = chunk_tx.send(StreamChunk::Error(e.to_string())).await;
                Err(e)
            }
        }
    }
}

/// An embedding model hashing words onto 64 dimensions
#[derive(Debug, Default)]
pub struct WordHashEmbedder;

impl WordHashEmbedder {
    pub fn vector(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; 64];
        for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            let bucket = word
                .to_lowercase()
                .bytes()
                .fold(7usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize))
                % 64;
            vector[bucket] += 1.0;
        }
        vector
    }
}

#[async_trait]
impl EmbeddingModel for WordHashEmbedder {
    async fn embed(&self, texts: &[String], _input_type: InputType) -> Result<Vec<Vec<f32>>, LlmError> {
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }
}

/// Creates a test application over an in-memory SQLite database
///
/// This helper function:
/// 1. Writes the test recipe database to a temporary file and loads it
/// 2. Creates an in-memory SQLite database and runs the migrations
/// 3. Creates an Axum application with an empty embedding index
///
/// ### Returns
///
/// The router and the state it was built with
pub fn create_test_app(chat: Arc<dyn ChatModel>) -> (Router, AppState) {
    let dir = tempfile::tempdir().unwrap();
    let recipes_path = dir.path().join("recipes.json");
    std::fs::write(&recipes_path, recipes_json().to_string()).unwrap();
    let catalog = RecipeCatalog::load(&recipes_path, "http://localhost:8080/images/").unwrap();

    // A unique shared-cache name keeps all pooled connections on one database
    let database_url = format!("file:it_{}?mode=memory&cache=shared", uuid::Uuid::new_v4());
    let pool = init_pool(&database_url).unwrap();
    run_migrations(&mut pool.get().unwrap()).unwrap();

    let state = AppState {
        pool: Arc::new(pool),
        catalog: Arc::new(catalog),
        chat,
        embedder: Arc::new(WordHashEmbedder),
        index: Arc::new(EmbeddingIndex::new()),
    };
    (create_app(state.clone()), state)
}

/// Sends a request and returns the status and the raw body
pub async fn send_raw(app: &mut Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, String) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.call(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

/// Sends a request and parses the body as JSON (`null` when empty)
pub async fn send(app: &mut Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, text) = send_raw(app, method, uri, body).await;
    let json = if text.is_empty() { Value::Null } else { serde_json::from_str(&text).unwrap() };
    (status, json)
}

/// Generates a meal plan via the API and returns the response body
pub async fn create_plan(app: &mut Router, body: Value) -> Value {
    let (status, plan) = send(app, Method::POST, "/plan-meals", Some(body)).await;
    assert_eq!(status, StatusCode::OK, "plan-meals failed: {}", plan);
    plan
}

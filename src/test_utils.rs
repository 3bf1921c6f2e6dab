use crate::*;
use crate::embeddings::{EmbeddingModel, InputType};
use crate::llm::{ChatModel, ChatRequest, ChatResponse, LlmError, StreamChunk};
use crate::models::{tokenize, Ingredient, Recipe};
use async_trait::async_trait;
use proptest::prelude::*;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Sets up a test database with migrations applied
///
/// This function:
/// 1. Creates an in-memory SQLite database
/// 2. Runs all migrations to set up the schema
///
/// ### Returns
///
/// An Arc-wrapped database connection pool connected to the in-memory database
pub fn setup_test_db() -> Arc<db::DbPool> {
    // Plain ":memory:" gives each connection its own database; a unique
    // shared-cache URI keeps every connection of this pool on the same one.
    let unique_id = uuid::Uuid::new_v4();
    let database_url = format!("file:test_{}?mode=memory&cache=shared", unique_id);
    let pool = db::init_pool(&database_url).expect("Failed to create pool");

    let mut conn = pool.get().expect("Failed to get connection");
    run_migrations(&mut conn).expect("Failed to run migrations");

    Arc::new(pool)
}

/// A small recipe database covering several cuisines, tags and unit kinds
pub fn sample_recipes() -> Vec<Recipe> {
    let mut tacos = Recipe::new("tex-mex-beef-bowls", "Tex-Mex Beef Bowls");
    tacos.description = Some("Spicy ground beef with rice and black beans".to_string());
    tacos.cuisine = Some("Mexican".to_string());
    tacos.tags = vec!["high-protein".to_string(), "spicy".to_string()];
    tacos.images = vec!["beef-bowls.jpg".to_string()];
    tacos.ingredients = vec![
        Ingredient::new("Ground beef", Some(1.0), Some("lb")),
        Ingredient::new("Rice", Some(1.0), Some("cup")),
        Ingredient::new("Black beans", Some(15.0), Some("oz")),
        Ingredient::new("Onion", Some(1.0), Some("whole")),
    ];

    let mut curry = Recipe::new("chickpea-curry", "Chickpea Curry");
    curry.description = Some("Creamy vegetarian curry with coconut milk".to_string());
    curry.cuisine = Some("Indian".to_string());
    curry.tags = vec!["vegetarian".to_string(), "spicy".to_string()];
    curry.ingredients = vec![
        Ingredient::new("Chickpeas", Some(400.0), Some("g")),
        Ingredient::new("Coconut milk", Some(1.0), Some("cup")),
        Ingredient::new("onion", Some(1.0), None),
        Ingredient::new("Garlic", Some(2.0), Some("cloves")),
    ];

    let mut salad = Recipe::new("greek-salad", "Greek Salad");
    salad.description = Some("Fresh vegetarian salad with feta and olives".to_string());
    salad.cuisine = Some("Greek".to_string());
    salad.tags = vec!["vegetarian".to_string(), "low-carb".to_string()];
    salad.images = vec!["https://cdn.example.com/salad.png".to_string()];
    salad.ingredients = vec![
        Ingredient::new("Feta", Some(200.0), Some("g")),
        Ingredient::new("Olive oil", Some(2.0), Some("tbsp")),
        Ingredient::new("Cucumber", None, None),
    ];

    let mut pancakes = Recipe::new("fluffy-pancakes", "Fluffy Pancakes");
    pancakes.description = Some("Breakfast pancakes with maple syrup".to_string());
    pancakes.cuisine = Some("American".to_string());
    pancakes.tags = vec!["breakfast".to_string()];
    pancakes.ingredients = vec![
        Ingredient::new("Flour", Some(2.0), Some("cup")),
        Ingredient::new("Milk", Some(1.5), Some("cup")),
        Ingredient::new("Maple syrup", None, Some("drizzle")),
    ];

    vec![tacos, curry, salad, pancakes]
}

/// A catalog over `sample_recipes` with images under `/images`
pub fn sample_catalog() -> catalog::RecipeCatalog {
    catalog::RecipeCatalog::new(sample_recipes(), "/images")
}

/// Application state over a fresh test database
///
/// Uses a working `FakeEmbedder` and an empty embedding index, so searches are
/// lexical until the caller indexes the catalog.
pub fn test_state(catalog: catalog::RecipeCatalog, chat: FakeChat) -> AppState {
    AppState {
        pool: setup_test_db(),
        catalog: Arc::new(catalog),
        chat: Arc::new(chat),
        embedder: Arc::new(FakeEmbedder::default()),
        index: Arc::new(embeddings::EmbeddingIndex::new()),
    }
}

/// A scripted chat model
///
/// Answers every request with the same reply (or fails), and records the
/// requests it received.
#[derive(Debug, Default)]
pub struct FakeChat {
    reply: Option<String>,
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl FakeChat {
    /// A model that always answers `reply`
    pub fn replying(reply: impl Into<String>) -> Self {
        Self { reply: Some(reply.into()), requests: Mutex::new(Vec::new()) }
    }

    /// A model whose every call fails as if the endpoint were down
    pub fn failing() -> Self {
        Self::default()
    }

    /// The user prompt of the last request
    pub fn last_prompt(&self) -> Option<String> {
        let requests = self.requests.lock().unwrap();
        requests.last().and_then(|r| r.messages.last()).map(|m| m.content.clone())
    }

    fn answer(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        self.requests.lock().unwrap().push(request);
        match self.reply {
            Some(ref reply) => Ok(ChatResponse {
                content: reply.clone(),
                finish_reason: Some("stop".to_string()),
                usage: None,
            }),
            None => Err(LlmError::ApiError { status: 503, message: "unavailable".to_string() }),
        }
    }
}

#[async_trait]
impl ChatModel for FakeChat {
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

/// A deterministic bag-of-words embedder
///
/// Each token is hashed onto one of 64 dimensions, so texts sharing words
/// get similar vectors.
#[derive(Debug, Default)]
pub struct FakeEmbedder {
    fail: bool,
}

impl FakeEmbedder {
    /// An embedder whose every call fails
    pub fn failing() -> Self {
        Self { fail: true }
    }

    pub fn vector(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; 64];
        for token in tokenize(text) {
            let bucket = token.bytes().fold(7usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize)) % 64;
            vector[bucket] += 1.0;
        }
        vector
    }
}

#[async_trait]
impl EmbeddingModel for FakeEmbedder {
    async fn embed(&self, texts: &[String], _input_type: InputType) -> Result<Vec<Vec<f32>>, LlmError> {
        if self.fail {
            return Err(LlmError::ApiError { status: 503, message: "unavailable".to_string() });
        }
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }
}

/// Generates strings with surrounding and inner whitespace noise
pub fn arb_messy_string() -> impl Strategy<Value = String> {
    ("[ \t]{0,3}", "[a-zA-Z0-9_./:-]{1,20}", "[ \t]{0,3}")
        .prop_map(|(lead, body, trail)| format!("{}{}{}", lead, body, trail))
}

use diesel::sql_types::Text;
use diesel::{QueryableByName, RunQueryDsl};

#[derive(QueryableByName, Debug)]
struct TableName {
    #[diesel(sql_type = Text)]
    name: String,
}

/// Tests the setup_test_db function
///
/// This test verifies that the test database can be created and that every
/// table created by the migrations is queryable.
#[test]
fn test_setup_test_db() {
    let pool = setup_test_db();
    let mut conn = pool.get().unwrap();

    let table_names: Vec<TableName> = diesel::sql_query("SELECT name FROM sqlite_master WHERE type='table'")
        .load(&mut conn)
        .expect("Failed to load table names");

    for table in ["meal_plans", "planned_meals", "__diesel_schema_migrations"] {
        assert!(table_names.iter().any(|t| t.name == table), "Table '{}' not found in database", table);

        let query = format!("SELECT COUNT(*) FROM {}", table);
        let result = diesel::sql_query(&query).execute(&mut conn);
        assert!(result.is_ok(), "Failed to query table '{}': {:?}", table, result.err());
    }
}

#[test]
fn test_sample_catalog_has_unique_ids() {
    let catalog = sample_catalog();
    assert_eq!(catalog.len(), sample_recipes().len());
}

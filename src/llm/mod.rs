//! LLM client module
//!
//! Provides the `ChatModel` seam used by the agent and HTTP handlers, the NIM
//! implementation of it, and a one-shot `ask` helper.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

mod error;
mod nim;
mod types;

pub use error::LlmError;
pub use nim::NimChatClient;
pub use types::{ChatMessage, ChatRequest, ChatResponse, Role, StreamChunk, TokenUsage};

/// System prompt used for every meal-planning request
pub const MEAL_PLANNER_SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant for meal planning and recipe generation.";

/// A language model that answers chat requests
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run a chat completion and wait for the full reply
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, LlmError>;

    /// Run a chat completion, forwarding reply fragments as they arrive
    ///
    /// Sends `StreamChunk::Delta` for each fragment, then `StreamChunk::Done`,
    /// or `StreamChunk::Error` if the stream fails. The full reply is returned
    /// once the stream ends. If the receiver is dropped the stream is
    /// abandoned and an error is returned.
    async fn stream(
        &self,
        request: ChatRequest,
        chunk_tx: mpsc::Sender<StreamChunk>,
    ) -> Result<ChatResponse, LlmError>;
}

/// Sends a single prompt under the meal-planning system prompt and returns the reply text
///
/// A `temperature` of None uses the model client's configured default.
pub async fn ask(chat: &dyn ChatModel, prompt: &str, temperature: Option<f32>) -> Result<String, LlmError> {
    debug!(prompt_len = prompt.len(), ?temperature, "ask: called");
    let mut request = ChatRequest::with_system(MEAL_PLANNER_SYSTEM_PROMPT, prompt);
    if let Some(temperature) = temperature {
        request = request.temperature(temperature);
    }
    let response = chat.complete(request).await?;
    Ok(response.content)
}

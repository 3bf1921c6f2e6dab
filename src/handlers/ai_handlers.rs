use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{self, Stream};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::agent::{ai_test, AI_TEST_PROMPT, AI_UNAVAILABLE};
use crate::dto::{AiTestDto, ChatDto, ChatReplyDto};
use crate::errors::ApiError;
use crate::llm::StreamChunk;
use crate::AppState;

/// Data of the event that ends a successful stream
pub const STREAM_DONE: &str = "[DONE]";

/// Buffered reply fragments per streaming request
const STREAM_BUFFER: usize = 64;

/// Handler for the AI smoke test
///
/// This function handles GET requests to `/ai/test`.
///
/// ### Returns
///
/// The fixed prompt and the model's reply; the reply reads
/// "AI service unavailable" if the model could not be reached
#[instrument(skip(state))]
pub async fn ai_test_handler(
    // Extract the shared state
    State(state): State<AppState>,
) -> Json<AiTestDto> {
    let ai_response = ai_test(state.chat.as_ref()).await;

    Json(AiTestDto {
        status: "ok".to_string(),
        prompt: AI_TEST_PROMPT.to_string(),
        ai_response,
    })
}

/// Handler for chatting with the meal-planning assistant
///
/// This function handles POST requests to `/ai/chat`.
///
/// ### Arguments
///
/// * `state` - The application state
/// * `payload` - The conversation and optional sampling options
///
/// ### Returns
///
/// The assistant's reply, or a 502 if the model failed
#[instrument(skip(state, payload), fields(messages = payload.messages.len()))]
pub async fn chat_handler(
    // Extract the shared state
    State(state): State<AppState>,
    // Extract and deserialize the JSON request body
    Json(payload): Json<ChatDto>,
) -> Result<Json<ChatReplyDto>, ApiError> {
    let request = payload.into_request().map_err(ApiError::InvalidRequest)?;
    info!("Sending chat request");

    let response = state.chat.complete(request).await?;

    debug!(reply_len = response.content.len(), "Chat reply received");
    Ok(Json(ChatReplyDto {
        reply: response.content,
        finish_reason: response.finish_reason,
        usage: response.usage,
    }))
}

/// Handler for chatting with the assistant, streaming the reply
///
/// This function handles POST requests to `/ai/chat/stream`.
///
/// The reply is sent as server-sent events: one `data:` event per fragment,
/// then `data: [DONE]`. If the model fails the stream ends with an
/// `event: error` event instead.
#[instrument(skip(state, payload), fields(messages = payload.messages.len()))]
pub async fn chat_stream_handler(
    // Extract the shared state
    State(state): State<AppState>,
    // Extract and deserialize the JSON request body
    Json(payload): Json<ChatDto>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let request = payload.into_request().map_err(ApiError::InvalidRequest)?;
    info!("Streaming chat request");

    let (chunk_tx, chunk_rx) = mpsc::channel(STREAM_BUFFER);
    let chat = state.chat.clone();
    tokio::spawn(async move {
        if let Err(e) = chat.stream(request, chunk_tx).await {
            warn!("Chat stream failed: {}", e);
        }
    });

    Ok(Sse::new(chunk_events(chunk_rx)).keep_alive(KeepAlive::default()))
}

/// Turns model stream chunks into server-sent events
///
/// Ends after the first `Done` or `Error`, or when the sender goes away.
fn chunk_events(chunk_rx: mpsc::Receiver<StreamChunk>) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold((chunk_rx, false), |(mut chunk_rx, finished)| async move {
        if finished {
            return None;
        }
        let event = match chunk_rx.recv().await? {
            StreamChunk::Delta(text) => return Some((Ok(Event::default().data(text)), (chunk_rx, false))),
            StreamChunk::Done => Event::default().data(STREAM_DONE),
            StreamChunk::Error(message) => {
                warn!("Model stream reported an error: {}", message);
                Event::default().event("error").data(AI_UNAVAILABLE)
            }
        };
        Some((Ok(event), (chunk_rx, true)))
    })
}

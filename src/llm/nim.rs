//! NVIDIA NIM chat client
//!
//! NIM serves an OpenAI-compatible `/v1/chat/completions` endpoint. This client
//! implements `ChatModel` for it with both blocking and SSE-streamed responses.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, RequestBuilder, Response};
use reqwest_eventsource::{Event, EventSource};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::error::is_retryable_status;
use super::{ChatModel, ChatRequest, ChatResponse, LlmError, StreamChunk, TokenUsage};
use crate::config::Config;

/// Maximum number of retries for transient errors
const MAX_RETRIES: u32 = 3;

/// Initial backoff delay for retries
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Chat client for a NIM (or any OpenAI-compatible) inference endpoint
pub struct NimChatClient {
    model: String,
    api_key: Option<String>,
    base_url: String,
    http: Client,
    temperature: f32,
    max_tokens: u32,
    initial_backoff: Duration,
}

impl NimChatClient {
    /// Create a new client from configuration
    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        debug!(llm_url = %config.llm_url, model = %config.llm_model, "from_config: called");
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(LlmError::Network)?;

        Ok(Self {
            model: config.llm_model.clone(),
            api_key: config.llm_api_key.clone(),
            base_url: config.llm_url.trim_end_matches('/').to_string(),
            http,
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
        })
    }

    /// Overrides the delay before the first retry; later retries double it
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    /// The model name sent with every request
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Build the request body for the chat completions API
    pub(crate) fn build_request_body(&self, request: &ChatRequest, stream: bool) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": request.messages,
            "temperature": request.temperature.unwrap_or(self.temperature),
            "max_tokens": request.max_tokens.unwrap_or(self.max_tokens),
            "top_p": 1,
            "n": 1,
            "frequency_penalty": 0.0,
            "stream": stream,
        })
    }

    fn post(&self, body: &serde_json::Value, accept: &str) -> RequestBuilder {
        let builder = self
            .http
            .post(self.endpoint())
            .header("accept", accept)
            .header("content-type", "application/json")
            .json(body);
        match self.api_key {
            Some(ref key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    /// Sends a request, retrying network failures and transient statuses with exponential backoff
    async fn send_with_retry(&self, body: &serde_json::Value) -> Result<Response, LlmError> {
        let mut last_error = None;
        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let backoff = self.initial_backoff * 2u32.pow(attempt - 1);
                warn!(attempt, backoff_ms = backoff.as_millis() as u64, "send_with_retry: retrying after transient error");
                tokio::time::sleep(backoff).await;
            }

            let response = match self.post(body, "application/json").send().await {
                Ok(r) => r,
                Err(e) => {
                    debug!(attempt, error = %e, "send_with_retry: network error");
                    last_error = Some(LlmError::Network(e));
                    continue;
                }
            };

            let status = response.status().as_u16();

            if status == 429 {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(60);
                return Err(LlmError::RateLimited {
                    retry_after: Duration::from_secs(retry_after),
                });
            }

            if is_retryable_status(status) && attempt < MAX_RETRIES {
                let text = response.text().await.unwrap_or_default();
                debug!(attempt, status, "send_with_retry: retryable status");
                last_error = Some(LlmError::ApiError { status, message: text });
                continue;
            }

            if !response.status().is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(LlmError::ApiError { status, message: text });
            }

            return Ok(response);
        }

        Err(last_error.unwrap_or_else(|| LlmError::InvalidResponse("Max retries exceeded".to_string())))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompletionBody {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    message: Option<CompletionMessage>,
    #[serde(default)]
    delta: Option<CompletionMessage>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Turns a completions response body into a `ChatResponse`
pub(crate) fn parse_completion(body: CompletionBody) -> Result<ChatResponse, LlmError> {
    let choice = body
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse("Response contained no choices".to_string()))?;

    let content = choice
        .message
        .and_then(|m| m.content)
        .unwrap_or_default()
        .trim()
        .to_string();

    Ok(ChatResponse {
        content,
        finish_reason: choice.finish_reason,
        usage: body.usage,
    })
}

#[async_trait]
impl ChatModel for NimChatClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        debug!(model = %self.model, messages = request.messages.len(), "complete: called");
        let body = self.build_request_body(&request, false);
        let response = self.send_with_retry(&body).await?;
        let body: CompletionBody = response.json().await?;
        parse_completion(body)
    }

    async fn stream(
        &self,
        request: ChatRequest,
        chunk_tx: mpsc::Sender<StreamChunk>,
    ) -> Result<ChatResponse, LlmError> {
        debug!(model = %self.model, messages = request.messages.len(), "stream: called");
        let body = self.build_request_body(&request, true);

        let mut es = EventSource::new(self.post(&body, "text/event-stream"))
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        // A POST must not be replayed behind the caller's back
        es.set_retry_policy(Box::new(reqwest_eventsource::retry::Never));

        let mut full_content = String::new();
        let mut finish_reason = None;
        let mut usage = None;

        while let Some(event) = es.next().await {
            match event {
                Ok(Event::Open) => {
                    debug!("stream: Event::Open");
                }
                Ok(Event::Message(msg)) => {
                    let data = msg.data.trim();
                    if data == "[DONE]" {
                        debug!("stream: [DONE]");
                        break;
                    }

                    let chunk: CompletionBody = match serde_json::from_str(data) {
                        Ok(chunk) => chunk,
                        Err(e) => {
                            debug!(error = %e, "stream: skipping undecodable chunk");
                            continue;
                        }
                    };

                    if chunk.usage.is_some() {
                        usage = chunk.usage;
                    }
                    for choice in chunk.choices {
                        if let Some(content) = choice.delta.and_then(|d| d.content)
                            && !content.is_empty()
                        {
                            full_content.push_str(&content);
                            if chunk_tx.send(StreamChunk::Delta(content)).await.is_err() {
                                // Nobody is listening any more; stop pulling the generation
                                es.close();
                                debug!("stream: receiver dropped, closing upstream");
                                return Err(LlmError::InvalidResponse("Stream receiver dropped".to_string()));
                            }
                        }
                        if choice.finish_reason.is_some() {
                            finish_reason = choice.finish_reason;
                        }
                    }
                }
                Err(reqwest_eventsource::Error::StreamEnded) => {
                    debug!("stream: stream ended");
                    break;
                }
                Err(reqwest_eventsource::Error::InvalidStatusCode(status, response)) => {
                    es.close();
                    let message = response.text().await.unwrap_or_default();
                    let err = LlmError::ApiError { status: status.as_u16(), message };
                    let _ = chunk_tx.send(StreamChunk::Error(err.to_string())).await;
                    return Err(err);
                }
                Err(e) => {
                    es.close();
                    debug!(error = %e, "stream: event error");
                    let _ = chunk_tx.send(StreamChunk::Error(e.to_string())).await;
                    return Err(LlmError::InvalidResponse(e.to_string()));
                }
            }
        }
        es.close();

        if chunk_tx.send(StreamChunk::Done).await.is_err() {
            return Err(LlmError::InvalidResponse("Stream receiver dropped".to_string()));
        }

        Ok(ChatResponse {
            content: full_content.trim().to_string(),
            finish_reason,
            usage,
        })
    }
}

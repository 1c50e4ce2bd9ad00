//! Backend gateway - posts requests to the analytics backend
//!
//! One POST per cycle, no retry, no timeout. Failures are split three ways:
//! the backend could not be reached, the backend answered with an error, or
//! the backend answered with something that is not a JSON object.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, error};
use vizask_shared::RequestPayload;

/// Default backend endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/ask-ai";

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Backend unreachable: {0}")]
    Transport(String),

    /// Shown to the user verbatim.
    #[error("{0}")]
    Backend(String),

    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),
}

impl GatewayError {
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::Transport(_) => "transport_error",
            GatewayError::Backend(_) => "backend_error",
            GatewayError::MalformedResponse(_) => "malformed_response",
        }
    }
}

// ============================================================================
// Response
// ============================================================================

/// Parsed backend answer. `answer` is the rendered text; everything else in
/// the body is kept as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendResponse {
    answer: String,
    body: Map<String, Value>,
}

impl BackendResponse {
    /// Response carrying only an answer.
    pub fn new(answer: impl Into<String>) -> Self {
        let answer = answer.into();
        let mut body = Map::new();
        body.insert("answer".to_string(), Value::String(answer.clone()));
        Self { answer, body }
    }

    /// Parse a success body. Anything but a JSON object is malformed; a
    /// missing or non-string `answer` reads as empty.
    pub fn from_body(text: &str) -> Result<Self, GatewayError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        match value {
            Value::Object(body) => {
                let answer = body
                    .get("answer")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                Ok(Self { answer, body })
            }
            other => Err(GatewayError::MalformedResponse(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// The whole response object, including `answer`.
    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Message for a non-success status: the body's `error` field when present,
/// otherwise the status line.
pub fn failure_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_owned))
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| {
            format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown Status")
            )
        })
}

// ============================================================================
// Backend trait
// ============================================================================

/// Trait abstraction over the analytics backend
#[async_trait]
pub trait Backend: Send + Sync {
    async fn send(&self, payload: &RequestPayload) -> Result<BackendResponse, GatewayError>;
}

/// HTTP backend (reqwest)
pub struct HttpBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpBackend {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn send(&self, payload: &RequestPayload) -> Result<BackendResponse, GatewayError> {
        debug!(endpoint = %self.endpoint, mode = payload.mode().label(), "posting request");

        let resp = self
            .client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                error!(endpoint = %self.endpoint, "backend request failed: {}", e);
                GatewayError::Transport(e.to_string())
            })?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        debug!(status = status.as_u16(), bytes = text.len(), "backend responded");

        if !status.is_success() {
            return Err(GatewayError::Backend(failure_message(status, &text)));
        }

        BackendResponse::from_body(&text)
    }
}

// ============================================================================
// Fake backend (testing)
// ============================================================================

/// Fake backend for deterministic testing
///
/// Replays queued results in order and records every payload it receives.
/// With an empty queue it answers with an empty `answer`. Clones share
/// state, so a test can keep one handle and give another to the controller.
#[derive(Clone, Default)]
pub struct FakeBackend {
    queue: Arc<Mutex<VecDeque<Result<BackendResponse, GatewayError>>>>,
    received: Arc<Mutex<Vec<RequestPayload>>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fake whose next request is answered with `answer`.
    pub fn with_answer(answer: &str) -> Self {
        let fake = Self::new();
        fake.push(Ok(BackendResponse::new(answer)));
        fake
    }

    /// Fake whose next request fails with `err`.
    pub fn failing(err: GatewayError) -> Self {
        let fake = Self::new();
        fake.push(Err(err));
        fake
    }

    pub fn push(&self, result: Result<BackendResponse, GatewayError>) {
        lock(&self.queue).push_back(result);
    }

    pub fn call_count(&self) -> usize {
        lock(&self.received).len()
    }

    pub fn payloads(&self) -> Vec<RequestPayload> {
        lock(&self.received).clone()
    }

    pub fn last_payload(&self) -> Option<RequestPayload> {
        lock(&self.received).last().cloned()
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn send(&self, payload: &RequestPayload) -> Result<BackendResponse, GatewayError> {
        lock(&self.received).push(payload.clone());
        lock(&self.queue)
            .pop_front()
            .unwrap_or_else(|| Ok(BackendResponse::new("")))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

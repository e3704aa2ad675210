//! HTTP client for the Infomaniak AI chat-completion endpoint.
//!
//! The resolver only needs "prompt in, text out, may fail"; that seam is
//! the `LlmClient` trait so tests can script responses without a network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("AI endpoint unreachable at {0}")]
    Connection(String),

    #[error("AI endpoint returned error (status {status}): {body}")]
    Endpoint { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),
}

/// Black-box completion collaborator: text in, text out, may fail.
pub trait LlmClient {
    fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Blocking client for Infomaniak's OpenAI-compatible chat completions.
pub struct InfomaniakClient {
    url: String,
    api_token: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl InfomaniakClient {
    pub fn new(product_id: &str, api_token: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            url: format!(
                "https://api.infomaniak.com/1/ai/{product_id}/openai/chat/completions"
            ),
            api_token: api_token.to_string(),
            model: "llama3".to_string(),
            client,
            timeout_secs,
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    model: &'a str,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    content: &'a str,
    role: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
    error: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl LlmClient for InfomaniakClient {
    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let body = ChatRequest {
            messages: vec![ChatMessage {
                content: prompt,
                role: "user",
            }],
            model: &self.model,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    LlmError::Connection(self.url.clone())
                } else if e.is_timeout() {
                    LlmError::HttpClient(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    LlmError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LlmError::Endpoint {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;

        match parsed.choices.and_then(|mut c| c.drain(..).next()) {
            Some(choice) => Ok(choice.message.content),
            None => Err(LlmError::MalformedResponse(format!(
                "no choices in response: {}",
                parsed
                    .error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "unknown error".to_string())
            ))),
        }
    }
}

/// Mock LLM client for tests; plays back a scripted response sequence.
///
/// The resolver consumes several completions per task, so the script is a
/// queue; once drained, the last entry repeats. `Err` entries simulate
/// collaborator failures. Cloning shares the script and call counter, so
/// a test can keep a handle after boxing the mock into a resolver.
#[derive(Clone)]
pub struct MockLlmClient {
    script: Arc<Mutex<VecDeque<Result<String, String>>>>,
    last: String,
    calls: Arc<AtomicUsize>,
}

impl MockLlmClient {
    pub fn new(responses: &[&str]) -> Self {
        Self::scripted(responses.iter().map(|r| Ok(r.to_string())).collect())
    }

    pub fn scripted(script: Vec<Result<String, String>>) -> Self {
        let last = script
            .iter()
            .rev()
            .find_map(|r| r.as_ref().ok().cloned())
            .unwrap_or_default();
        Self {
            script: Arc::new(Mutex::new(script.into_iter().collect())),
            last,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LlmClient for MockLlmClient {
    fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock().unwrap();
        match script.pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(LlmError::HttpClient(message)),
            None => Ok(self.last.clone()),
        }
    }
}

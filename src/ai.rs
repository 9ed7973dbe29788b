use log::debug;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const LOCAL_ORIGIN: &str = "http://localhost:7783";

const SYSTEM_PROMPT: &str = "You are a Python programming assistant. When you \
return code, wrap it in ```python blocks. Always give clear and concise answers.";

/// Errors from the upstream chat-completions API, split so the handler can
/// map each kind to a distinct HTTP status.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Request timeout")]
    Timeout,
    #[error("Connection error")]
    Connect,
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("HTTP client error: {0}")]
    HttpClient(reqwest::Error),
    #[error("Malformed API response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ChatError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ChatError::Timeout
        } else if e.is_connect() {
            ChatError::Connect
        } else {
            ChatError::HttpClient(e)
        }
    }
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

/// Client for the OpenRouter chat-completions endpoint.
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
}

impl ChatClient {
    pub fn new() -> Result<Self, ChatError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: OPENROUTER_BASE_URL.to_string(),
        })
    }

    #[cfg(test)]
    fn with_base_url(base_url: &str) -> Result<Self, ChatError> {
        let mut client = Self::new()?;
        client.base_url = base_url.to_string();
        Ok(client)
    }

    /// Sends one user message (optionally with the current editor buffer
    /// appended) and returns the assistant response text.
    pub async fn chat(&self, api_key: &str, model: &str, message: &str, code: &str) -> Result<String, ChatError> {
        let prompt = if code.is_empty() {
            message.to_string()
        } else {
            format!("{}\n\nCode:\n{}", message, code)
        };
        debug!("Sending chat request to model '{}'", model);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .header("HTTP-Referer", LOCAL_ORIGIN)
            .json(&json!({
                "model": model,
                "messages": [
                    { "role": "system", "content": SYSTEM_PROMPT },
                    { "role": "user", "content": prompt },
                ],
            }))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .and_then(|e| e.message)
                .unwrap_or(body);
            return Err(ChatError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| ChatError::Malformed(e.to_string()))?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ChatError::Malformed("Response contained no choices".to_string()))
    }
}

//! OpenAI-compatible chat-completion client.
//!
//! Posts the context document to `{base_url}/chat/completions` with bearer
//! auth and returns the first choice's content.

use crate::config::{Credentials, load_credentials};
use crate::gateway::{ChatCompletion, GatewayError};
use aivi_core::config::ApiConfig;
use aivi_core::context::ContextDocument;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, header::HeaderValue};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

#[derive(Clone)]
pub struct OpenAIChatClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAIChatClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| GatewayError::Transport {
                message: format!("Failed to build HTTP client: {err}"),
                is_retryable: false,
            })?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }

    /// Builds a client from explicit credentials and the `[api]` table.
    /// A base URL in the credentials overrides the configured one.
    pub fn with_credentials(
        credentials: Credentials,
        api: &ApiConfig,
    ) -> Result<Self, GatewayError> {
        let base_url = credentials
            .base_url
            .unwrap_or_else(|| api.base_url.clone());
        Self::new(
            credentials.api_key,
            base_url,
            Duration::from_secs(api.timeout_secs),
        )
    }

    /// Loads credentials from `~/.config/aivi/secret.json` or
    /// `OPENAI_API_KEY`.
    pub fn try_from_env(api: &ApiConfig) -> Result<Self, GatewayError> {
        Self::with_credentials(load_credentials()?, api)
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatCompletion for OpenAIChatClient {
    async fn complete(&self, request: &ContextDocument) -> Result<String, GatewayError> {
        let endpoint = self.endpoint();
        debug!("POST {} model={}", endpoint, request.model);
        let response = self
            .client
            .post(&endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|err| GatewayError::Transport {
                message: format!("Completion request failed: {err}"),
                is_retryable: err.is_connect() || err.is_timeout(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(map_http_error(status, body_text, retry_after));
        }

        let body = response.text().await.map_err(|err| GatewayError::Transport {
            message: format!("Failed to read completion body: {err}"),
            is_retryable: err.is_timeout(),
        })?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|err| GatewayError::Malformed(err.to_string()))?;

        extract_text_response(parsed)
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Only the first choice is consumed. Whitespace-only content counts as
/// missing.
fn extract_text_response(response: ChatCompletionResponse) -> Result<String, GatewayError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(GatewayError::EmptyResponse)
}

fn map_http_error(status: StatusCode, body: String, retry_after: Option<Duration>) -> GatewayError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or(body);

    let is_retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    GatewayError::Http {
        status: status.as_u16(),
        message,
        is_retryable,
        retry_after,
    }
}

fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

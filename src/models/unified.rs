use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;

use super::traits::Model;
use super::types::{ChatRequestBody, GenerationRequest};
use crate::constants::{APP_NAME, CHAT_COMPLETIONS_PATH};
use crate::stream::ByteStream;
use crate::utils::{log_debug, ListgenError, Result};

/// Model backend for any OpenAI-compatible chat completions endpoint
/// (OpenRouter by default)
pub struct UnifiedModel {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl UnifiedModel {
    /// Create a new backend for `endpoint` authenticated with `api_key`
    ///
    /// No request timeout is set: a stalled connection waits indefinitely.
    pub fn new(endpoint: &str, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!("{}/{}", APP_NAME, env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ListgenError::unknown(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Full URL of the chat completions call
    pub fn completions_url(&self) -> String {
        format!("{}{}", self.endpoint, CHAT_COMPLETIONS_PATH)
    }
}

#[async_trait]
impl Model for UnifiedModel {
    async fn stream_chat(&self, request: &GenerationRequest) -> Result<ByteStream> {
        let url = self.completions_url();
        log_debug(format!("POST {} (model {})", url, request.model));

        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(header::CONTENT_TYPE, "application/json")
            .json(&ChatRequestBody::from(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ListgenError::api(
                status.as_u16(),
                extract_error_message(status, &error_text),
            ));
        }

        let body: ByteStream = Box::pin(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(ListgenError::from)),
        );
        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Structured { message: String },
    Plain(String),
}

/// Best human-readable message from an error response body
fn extract_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        return match envelope.error {
            ErrorDetail::Structured { message } | ErrorDetail::Plain(message) => message,
        };
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_completions_url_tolerates_trailing_slash() {
        let model = UnifiedModel::new("https://openrouter.ai/api/v1/", "key".to_string()).unwrap();
        assert_eq!(
            model.completions_url(),
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }

    #[test]
    fn test_error_message_from_structured_body() {
        let body = r#"{"error":{"message":"No auth credentials found","code":401}}"#;
        assert_eq!(
            extract_error_message(StatusCode::UNAUTHORIZED, body),
            "No auth credentials found"
        );
    }

    #[test]
    fn test_error_message_from_plain_error_field() {
        let body = r#"{"error":"model not found"}"#;
        assert_eq!(
            extract_error_message(StatusCode::NOT_FOUND, body),
            "model not found"
        );
    }

    #[test]
    fn test_error_message_fallbacks() {
        assert_eq!(
            extract_error_message(StatusCode::BAD_GATEWAY, "  upstream down \n"),
            "upstream down"
        );
        assert_eq!(
            extract_error_message(StatusCode::TOO_MANY_REQUESTS, ""),
            "Too Many Requests"
        );
    }
}

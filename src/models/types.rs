use serde::Serialize;

use crate::constants::{GENERATION_MAX_TOKENS, GENERATION_TEMPERATURE};

/// One list-generation call
///
/// Only the model and the prompt vary; the sampling parameters are fixed.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    /// Prompt with all placeholders already filled in
    pub prompt_text: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub stream: bool,
}

impl GenerationRequest {
    pub fn new(model: impl Into<String>, prompt_text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt_text: prompt_text.into(),
            max_tokens: GENERATION_MAX_TOKENS,
            temperature: GENERATION_TEMPERATURE,
            stream: true,
        }
    }
}

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
}

/// A chat message as sent on the wire
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage<'a> {
    pub role: MessageRole,
    pub content: &'a str,
}

/// Request body for `/chat/completions` (OpenAI format)
#[derive(Debug, Serialize)]
pub struct ChatRequestBody<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub stream: bool,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl<'a> From<&'a GenerationRequest> for ChatRequestBody<'a> {
    fn from(request: &'a GenerationRequest) -> Self {
        Self {
            model: &request.model,
            messages: vec![ChatMessage {
                role: MessageRole::User,
                content: &request.prompt_text,
            }],
            stream: request.stream,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_request_has_fixed_parameters() {
        let request = GenerationRequest::new("openai/gpt-4o-mini", "List 5 colors");
        assert_eq!(request.max_tokens, 2000);
        assert!((request.temperature - 0.7).abs() < f32::EPSILON);
        assert!(request.stream);
    }

    #[test]
    fn test_wire_body_shape() {
        let request = GenerationRequest::new("some/model", "List 5 colors");
        let body = serde_json::to_value(ChatRequestBody::from(&request)).unwrap();

        assert_eq!(body["model"], "some/model");
        assert_eq!(body["stream"], true);
        assert_eq!(body["max_tokens"], 2000);
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "List 5 colors");
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }
}

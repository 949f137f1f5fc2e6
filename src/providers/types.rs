use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Message, Role};

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Non-2xx reply. `detail` carries the API's own message when it sent one.
    #[error("API error: {status}")]
    Status { status: u16, detail: Option<String> },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Request cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ChatRequest {
    pub api_key: String,
    pub model: String,
    pub system_prompt: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: Option<u32>,
}

impl std::fmt::Debug for ChatRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatRequest")
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("system_prompt", &self.system_prompt)
            .field("messages", &self.messages)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatResponse {
    /// Content of the first choice, if the API returned any.
    pub content: Option<String>,
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_api_key() {
        let request = ChatRequest {
            api_key: "sk-secret".to_string(),
            model: "openai/gpt-4o".to_string(),
            system_prompt: None,
            messages: Vec::new(),
            max_tokens: Some(512),
        };
        let debug = format!("{:?}", request);
        assert!(!debug.contains("sk-secret"));
    }

    #[test]
    fn status_error_message() {
        let err = ProviderError::Status {
            status: 401,
            detail: Some("No auth credentials found".to_string()),
        };
        assert_eq!(err.to_string(), "API error: 401");
    }

    #[test]
    fn timeout_message_keeps_sub_second_precision() {
        let err = ProviderError::Timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "Request timed out after 250ms");
        let err = ProviderError::Timeout(Duration::from_secs(60));
        assert_eq!(err.to_string(), "Request timed out after 60s");
    }
}

use async_trait::async_trait;

use super::types::{ChatRequest, ChatResponse, ProviderError};

/// One request/response exchange with a chat-completion API.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError>;
}

pub mod openrouter;
pub mod traits;
pub mod types;

pub use openrouter::OpenRouterClient;
pub use traits::CompletionClient;
pub use types::{ChatMessage, ChatRequest, ChatResponse, ProviderError};

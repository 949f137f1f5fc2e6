use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::models::*;
use crate::providers::traits::CompletionClient;
use crate::providers::types::{ChatMessage, ChatRequest, ChatResponse, ProviderError};

/// Chat-completion client for OpenRouter and other OpenAI-compatible APIs.
pub struct OpenRouterClient {
    client: Client,
    base_url: Url,
}

impl OpenRouterClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.base_url.as_str().trim_end_matches('/')
        )
    }

    fn build_messages(system_prompt: Option<&str>, messages: &[ChatMessage]) -> Vec<WireMessage> {
        let mut result = Vec::with_capacity(messages.len() + 1);

        if let Some(prompt) = system_prompt.filter(|p| !p.is_empty()) {
            result.push(WireMessage {
                role: "system".to_string(),
                content: Some(prompt.to_string()),
            });
        }

        result.extend(messages.iter().map(|msg| WireMessage {
            role: msg.role.as_str().to_string(),
            content: Some(msg.content.clone()),
        }));

        result
    }

    fn parse_error_detail(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorResponse>(body)
            .ok()
            .map(|parsed| parsed.error.message)
    }
}

#[async_trait]
impl CompletionClient for OpenRouterClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let body = CompletionRequest {
            model: request.model.clone(),
            messages: Self::build_messages(request.system_prompt.as_deref(), &request.messages),
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", request.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = Self::parse_error_detail(&body);
            tracing::warn!(
                "Completion request failed with HTTP {}: {}",
                status.as_u16(),
                detail.as_deref().unwrap_or("no detail")
            );
            return Err(ProviderError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content);

        Ok(ChatResponse {
            content,
            model: parsed.model.unwrap_or(request.model),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> ChatRequest {
        ChatRequest {
            api_key: "sk-test".to_string(),
            model: "openai/gpt-4o".to_string(),
            system_prompt: Some("Be a coach.".to_string()),
            messages: vec![ChatMessage {
                role: Role::User,
                content: "Tell me a story".to_string(),
            }],
            max_tokens: Some(512),
        }
    }

    fn client_for(server: &MockServer) -> OpenRouterClient {
        let base = Url::parse(&format!("{}/api/v1/", server.uri())).unwrap();
        OpenRouterClient::new(base)
    }

    #[tokio::test]
    async fn sends_bearer_and_expected_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_json(serde_json::json!({
                "model": "openai/gpt-4o",
                "messages": [
                    {"role": "system", "content": "Be a coach."},
                    {"role": "user", "content": "Tell me a story"},
                ],
                "max_tokens": 512,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "Once upon a time"}}],
                "model": "openai/gpt-4o",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server).complete(request()).await.unwrap();
        assert_eq!(response.content.as_deref(), Some("Once upon a time"));
    }

    #[tokio::test]
    async fn missing_choices_yield_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let response = client_for(&server).complete(request()).await.unwrap();
        assert_eq!(response.content, None);
        assert_eq!(response.model, "openai/gpt-4o");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "No auth credentials found", "code": 401}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).complete(request()).await.unwrap_err();
        match err {
            ProviderError::Status { status, detail } => {
                assert_eq!(status, 401);
                assert_eq!(detail.as_deref(), Some("No auth credentials found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).complete(request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[test]
    fn blank_system_prompt_is_skipped() {
        let messages = OpenRouterClient::build_messages(Some(""), &request().messages);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "user");
    }
}

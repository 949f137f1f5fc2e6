use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::config::{DEFAULT_TIMEOUT_SECS, MAX_TOKENS};
use crate::models::catalog::{self, GENERAL_GENRE};
use crate::models::{Message, Role};
use crate::providers::{ChatMessage, ChatRequest, ChatResponse, CompletionClient, ProviderError};
use crate::services::archive::SessionArchive;
use crate::services::export::{self, ExportFormat};

pub const EMPTY_REPLY: &str = "No response from model.";
pub const ERROR_REPLY: &str =
    "Sorry, there was an error contacting the AI. Please check your API key and model.";

const COACH_PROMPT: &str = "You are a creative writing coach and brainstorming partner. Help \
writers with story ideas, character development, overcoming writer's block, and refining their \
craft. Be encouraging, insightful, and creative.";

/// Built-in system instruction, specialised for any genre but "general".
pub fn system_prompt_for(genre: &str) -> String {
    if genre.is_empty() || genre == GENERAL_GENRE {
        return COACH_PROMPT.to_string();
    }
    format!(
        "You are a creative writing coach and brainstorming partner. Specialize your advice for \
the {} genre. Help writers with story ideas, character development, overcoming writer's block, \
and refining their craft. Be encouraging, insightful, and creative.",
        genre
    )
}

/// Reasons a send is refused. None of them change engine state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    #[error("Message is empty")]
    EmptyInput,

    #[error("A request is already in flight")]
    Busy,

    #[error("No API key set")]
    MissingApiKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Sending,
}

/// A user turn that has been appended and is waiting for its reply. Only
/// `begin_send` creates one, and `finish_send` consumes it.
#[derive(Debug)]
pub struct PendingTurn {
    request: ChatRequest,
}

impl PendingTurn {
    pub fn request(&self) -> &ChatRequest {
        &self.request
    }
}

/// Call the completion API for one turn, bounded by `timeout` and
/// abandoned early if `cancel` fires.
pub async fn run_turn(
    client: Arc<dyn CompletionClient>,
    turn: &PendingTurn,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<ChatResponse, ProviderError> {
    let request = turn.request.clone();
    tokio::select! {
        _ = cancel.cancelled() => Err(ProviderError::Cancelled),
        result = tokio::time::timeout(timeout, client.complete(request)) => match result {
            Ok(response) => response,
            Err(_) => Err(ProviderError::Timeout(timeout)),
        },
    }
}

/// The active conversation and its single in-flight request.
pub struct ConversationEngine {
    client: Arc<dyn CompletionClient>,
    messages: Vec<Message>,
    state: EngineState,
    model: String,
    genre: String,
    coach_prompt: Option<String>,
    api_key: Option<String>,
    error: Option<String>,
    draft: Option<String>,
    timeout: Duration,
}

impl ConversationEngine {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client,
            messages: Vec::new(),
            state: EngineState::Idle,
            model: catalog::default_model().id.to_string(),
            genre: GENERAL_GENRE.to_string(),
            coach_prompt: None,
            api_key: None,
            error: None,
            draft: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_sending(&self) -> bool {
        self.state == EngineState::Sending
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn genre(&self) -> &str {
        &self.genre
    }

    /// Last transport error, shown inline until the next accepted send.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn set_api_key(&mut self, api_key: Option<String>) {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
    }

    /// Select the model id sent to the API. `coach_prompt` replaces the
    /// built-in instruction when the model is a coach preset.
    pub fn set_model(&mut self, model: impl Into<String>, coach_prompt: Option<String>) {
        self.model = model.into();
        self.coach_prompt = coach_prompt;
    }

    pub fn set_genre(&mut self, genre: impl Into<String>) {
        self.genre = genre.into();
    }

    pub fn set_draft(&mut self, prompt: impl Into<String>) {
        self.draft = Some(prompt.into());
    }

    pub fn draft(&self) -> Option<&str> {
        self.draft.as_deref()
    }

    pub fn take_draft(&mut self) -> Option<String> {
        self.draft.take()
    }

    pub fn system_prompt(&self) -> String {
        match &self.coach_prompt {
            Some(prompt) if !prompt.trim().is_empty() => prompt.clone(),
            _ => system_prompt_for(&self.genre),
        }
    }

    /// Send one user turn and wait for the reply. Returns the appended
    /// assistant message, which is the error reply on transport failure.
    pub async fn send(
        &mut self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<&Message, SendError> {
        let turn = self.begin_send(text)?;
        let result = run_turn(self.client.clone(), &turn, self.timeout, cancel).await;
        Ok(self.finish_send(turn, result))
    }

    /// Validate and append the user message, then enter `Sending`.
    pub fn begin_send(&mut self, text: &str) -> Result<PendingTurn, SendError> {
        if text.trim().is_empty() {
            return Err(SendError::EmptyInput);
        }
        if self.state == EngineState::Sending {
            return Err(SendError::Busy);
        }
        let api_key = self.api_key.clone().ok_or(SendError::MissingApiKey)?;

        self.error = None;
        self.draft = None;
        self.messages.push(Message::user(text));
        self.state = EngineState::Sending;

        let request = ChatRequest {
            api_key,
            model: self.model.clone(),
            system_prompt: Some(self.system_prompt()),
            messages: self.messages.iter().map(ChatMessage::from).collect(),
            max_tokens: Some(MAX_TOKENS),
        };
        tracing::debug!(
            "Sending {} messages to {}",
            request.messages.len(),
            request.model
        );

        Ok(PendingTurn { request })
    }

    /// Append the reply (or the error reply) and return to `Idle`.
    pub fn finish_send(
        &mut self,
        _turn: PendingTurn,
        result: Result<ChatResponse, ProviderError>,
    ) -> &Message {
        let reply = match result {
            Ok(response) => {
                tracing::debug!("Reply from {}", response.model);
                let content = response
                    .content
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| EMPTY_REPLY.to_string());
                Message::new(Role::Assistant, content)
            }
            Err(e) => {
                tracing::error!("Completion failed: {}", e);
                self.error = Some(e.to_string());
                Message::new(Role::Assistant, ERROR_REPLY)
            }
        };
        self.state = EngineState::Idle;
        self.messages.push(reply);
        &self.messages[self.messages.len() - 1]
    }

    /// Archive a non-empty conversation and start afresh.
    pub fn clear(&mut self, archive: &mut SessionArchive) {
        let messages = std::mem::take(&mut self.messages);
        archive.archive(messages);
        self.error = None;
    }

    /// Replace the conversation with a restored one. The current
    /// conversation is dropped, not archived.
    pub fn restore(&mut self, messages: Vec<Message>) {
        self.messages = messages;
        self.error = None;
    }

    pub fn export_as_text(&self, archive: &mut SessionArchive) -> Option<String> {
        self.export(archive, ExportFormat::Text)
    }

    pub fn export_as_json(&self, archive: &mut SessionArchive) -> Option<String> {
        self.export(archive, ExportFormat::Json)
    }

    /// Render the conversation and archive it. Nothing is archived when the
    /// conversation is empty or fails to render; the conversation stays
    /// active either way.
    pub fn export(&self, archive: &mut SessionArchive, format: ExportFormat) -> Option<String> {
        self.export_with(archive, |messages| match format {
            ExportFormat::Text => Ok(export::export_to_text(messages)),
            ExportFormat::Json => export::export_to_json(messages),
        })
    }

    fn export_with<F>(&self, archive: &mut SessionArchive, render: F) -> Option<String>
    where
        F: FnOnce(&[Message]) -> serde_json::Result<String>,
    {
        if self.messages.is_empty() {
            return None;
        }
        let payload = match render(&self.messages) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("Failed to encode conversation: {}", e);
                return None;
            }
        };
        archive.archive(self.messages.clone());
        Some(payload)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::services::store::MemoryStore;

    enum Reply {
        Content(Option<&'static str>),
        Status(u16),
        Hang,
    }

    struct ScriptedClient {
        reply: Reply,
        seen: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedClient {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
            let model = request.model.clone();
            self.seen.lock().unwrap().push(request);
            match self.reply {
                Reply::Content(content) => Ok(ChatResponse {
                    content: content.map(str::to_string),
                    model,
                }),
                Reply::Status(status) => Err(ProviderError::Status {
                    status,
                    detail: None,
                }),
                Reply::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(ChatResponse { content: None, model })
                }
            }
        }
    }

    fn engine(client: Arc<ScriptedClient>) -> ConversationEngine {
        let mut engine = ConversationEngine::new(client);
        engine.set_api_key(Some("sk-test".to_string()));
        engine
    }

    fn archive() -> SessionArchive {
        SessionArchive::load(Arc::new(MemoryStore::new()))
    }

    fn contents(engine: &ConversationEngine) -> Vec<(Role, String)> {
        engine
            .messages()
            .iter()
            .map(|m| (m.role, m.content.clone()))
            .collect()
    }

    #[tokio::test]
    async fn story_scenario() {
        let client = ScriptedClient::new(Reply::Content(Some("Once upon a time")));
        let mut engine = engine(client.clone());

        let reply = engine
            .send("Tell me a story", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(reply.content, "Once upon a time");

        assert_eq!(
            contents(&engine),
            vec![
                (Role::User, "Tell me a story".to_string()),
                (Role::Assistant, "Once upon a time".to_string()),
            ]
        );
        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(engine.error(), None);

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen[0].max_tokens, Some(512));
        assert_eq!(seen[0].system_prompt.as_deref(), Some(COACH_PROMPT));
    }

    #[tokio::test]
    async fn auth_failure_appends_error_reply() {
        let client = ScriptedClient::new(Reply::Status(401));
        let mut engine = engine(client);

        engine.send("hello", &CancellationToken::new()).await.unwrap();

        assert_eq!(
            contents(&engine),
            vec![
                (Role::User, "hello".to_string()),
                (Role::Assistant, ERROR_REPLY.to_string()),
            ]
        );
        assert_eq!(engine.error(), Some("API error: 401"));
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[tokio::test]
    async fn missing_content_uses_placeholder() {
        let mut engine = engine(ScriptedClient::new(Reply::Content(None)));
        let reply = engine.send("hi", &CancellationToken::new()).await.unwrap();
        assert_eq!(reply.content, EMPTY_REPLY);
    }

    #[tokio::test]
    async fn blank_input_is_rejected_without_change() {
        let client = ScriptedClient::new(Reply::Content(Some("x")));
        let mut engine = engine(client.clone());

        let err = engine.send("", &CancellationToken::new()).await.unwrap_err();
        assert_eq!(err, SendError::EmptyInput);
        let err = engine.send("  \n", &CancellationToken::new()).await.unwrap_err();
        assert_eq!(err, SendError::EmptyInput);

        assert!(engine.messages().is_empty());
        assert!(client.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn send_while_sending_is_rejected() {
        let mut engine = engine(ScriptedClient::new(Reply::Content(Some("x"))));

        let turn = engine.begin_send("first").unwrap();
        assert_eq!(engine.state(), EngineState::Sending);
        assert_eq!(engine.begin_send("second").unwrap_err(), SendError::Busy);

        let users = engine
            .messages()
            .iter()
            .filter(|m| m.role == Role::User)
            .count();
        assert_eq!(users, 1);

        engine.finish_send(
            turn,
            Ok(ChatResponse {
                content: Some("reply".to_string()),
                model: "m".to_string(),
            }),
        );
        assert_eq!(engine.state(), EngineState::Idle);
        assert!(engine.begin_send("second").is_ok());
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let mut engine = ConversationEngine::new(ScriptedClient::new(Reply::Content(None)));
        assert_eq!(engine.begin_send("hi").unwrap_err(), SendError::MissingApiKey);
        assert!(engine.messages().is_empty());
    }

    #[test]
    fn request_carries_full_history_and_genre_prompt() {
        let mut engine = engine(ScriptedClient::new(Reply::Content(None)));
        engine.restore(vec![Message::user("earlier"), Message::assistant("answer")]);
        engine.set_genre("fantasy");

        let turn = engine.begin_send("next").unwrap();
        let request = turn.request();
        let roles: Vec<_> = request.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User]);
        assert_eq!(request.messages[2].content, "next");
        assert!(request
            .system_prompt
            .as_deref()
            .unwrap()
            .contains("Specialize your advice for the fantasy genre"));
    }

    #[test]
    fn coach_prompt_overrides_builtin() {
        let mut engine = engine(ScriptedClient::new(Reply::Content(None)));
        engine.set_model("noir-coach", Some("Write like Chandler.".to_string()));
        assert_eq!(engine.system_prompt(), "Write like Chandler.");
        engine.set_model("openai/gpt-4o", None);
        assert_eq!(engine.system_prompt(), COACH_PROMPT);
    }

    #[tokio::test]
    async fn timeout_follows_failure_path() {
        let mut engine =
            engine(ScriptedClient::new(Reply::Hang)).with_timeout(Duration::from_millis(20));

        let reply = engine.send("hello", &CancellationToken::new()).await.unwrap();
        assert_eq!(reply.content, ERROR_REPLY);
        assert_eq!(engine.error(), Some("Request timed out after 20ms"));
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[tokio::test]
    async fn cancellation_follows_failure_path() {
        let mut engine = engine(ScriptedClient::new(Reply::Hang));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let reply = engine.send("hello", &cancel).await.unwrap();
        assert_eq!(reply.content, ERROR_REPLY);
        assert_eq!(engine.error(), Some("Request cancelled"));
    }

    #[test]
    fn clear_archives_then_empties() {
        let mut engine = engine(ScriptedClient::new(Reply::Content(None)));
        let mut archive = archive();
        let messages = vec![
            Message::user("one"),
            Message::assistant("two"),
            Message::user("three"),
        ];
        engine.restore(messages.clone());

        engine.clear(&mut archive);

        assert!(engine.messages().is_empty());
        assert_eq!(archive.sessions().len(), 1);
        assert_eq!(archive.sessions()[0].messages, messages);

        engine.clear(&mut archive);
        assert_eq!(archive.sessions().len(), 1);
    }

    #[test]
    fn restore_does_not_archive_current() {
        let mut engine = engine(ScriptedClient::new(Reply::Content(None)));
        let archive = archive();
        engine.restore(vec![Message::user("unsaved")]);
        engine.restore(vec![Message::user("restored")]);

        assert!(archive.sessions().is_empty());
        assert_eq!(engine.messages()[0].content, "restored");
    }

    #[test]
    fn export_archives_and_keeps_conversation() {
        let mut engine = engine(ScriptedClient::new(Reply::Content(None)));
        let mut archive = archive();

        assert_eq!(engine.export_as_text(&mut archive), None);
        assert!(archive.sessions().is_empty());

        engine.restore(vec![Message::user("hello"), Message::assistant("hi there")]);
        let text = engine.export_as_text(&mut archive).unwrap();
        assert!(text.contains("] You: hello"));
        assert!(text.contains("] AI: hi there"));
        assert_eq!(archive.sessions().len(), 1);
        assert_eq!(engine.messages().len(), 2);

        let json = engine.export_as_json(&mut archive).unwrap();
        let back: Vec<Message> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, engine.messages());
        assert_eq!(archive.sessions().len(), 2);
    }

    #[test]
    fn failed_render_archives_nothing() {
        let mut engine = engine(ScriptedClient::new(Reply::Content(None)));
        let mut archive = archive();
        engine.restore(vec![Message::user("one")]);

        let out = engine.export_with(&mut archive, |_| {
            Err(serde_json::from_str::<u32>("not a number").unwrap_err())
        });

        assert_eq!(out, None);
        assert!(archive.sessions().is_empty());
        assert_eq!(engine.messages().len(), 1);
    }

    #[test]
    fn draft_is_consumed_once() {
        let mut engine = engine(ScriptedClient::new(Reply::Content(None)));
        engine.set_draft("Suggest a twist ending");
        assert_eq!(engine.draft(), Some("Suggest a twist ending"));
        assert_eq!(engine.take_draft().as_deref(), Some("Suggest a twist ending"));
        assert_eq!(engine.take_draft(), None);

        engine.set_draft("Name my dragon");
        let turn = engine.begin_send("Name my dragon").unwrap();
        assert_eq!(engine.draft(), None);
        engine.finish_send(turn, Err(ProviderError::Cancelled));
    }
}

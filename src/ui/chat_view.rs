use std::fmt::Write;

use chrono::{DateTime, Local, Utc};

use crate::models::catalog;
use crate::models::Message;
use crate::services::ConversationEngine;

pub fn render_message(number: usize, message: &Message) -> String {
    let time = DateTime::<Utc>::from_timestamp_millis(message.timestamp)
        .map(|dt| dt.with_timezone(&Local).format("%H:%M").to_string())
        .unwrap_or_default();
    format!("{:>3} [{}] {}: {}", number, time, message.role.label(), message.content)
}

/// Genre badge, model, and any pending draft or error.
pub fn render_status(engine: &ConversationEngine) -> String {
    let genre = catalog::find_genre(engine.genre())
        .map(|g| g.name)
        .unwrap_or(engine.genre());
    let model = catalog::find_model(engine.model())
        .map(|m| m.name)
        .unwrap_or(engine.model());

    let mut out = format!("Genre: {} | Model: {}", genre, model);
    if engine.is_sending() {
        out.push_str("\nWaiting for the model... (Ctrl-C to cancel)");
    }
    if !engine.has_api_key() {
        out.push_str("\nPlease enter your API key to start chatting (/key <api-key>).");
    }
    if let Some(draft) = engine.draft() {
        let _ = write!(out, "\nDraft: {}", draft);
    }
    if let Some(error) = engine.error() {
        let _ = write!(out, "\n! {}", error);
    }
    out
}

pub fn render_transcript(engine: &ConversationEngine) -> String {
    if engine.messages().is_empty() {
        return "Start a conversation with your creative writing coach!".to_string();
    }
    engine
        .messages()
        .iter()
        .enumerate()
        .map(|(i, m)| render_message(i + 1, m))
        .collect::<Vec<_>>()
        .join("\n")
}

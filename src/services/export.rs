use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};

use crate::models::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Text,
    Json,
}

impl ExportFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Text => "conversation.txt",
            ExportFormat::Json => "conversation.json",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Text => "text/plain",
            ExportFormat::Json => "application/json",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "txt" | "text" => Some(ExportFormat::Text),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }
}

/// `[HH:MM] You: ...` transcript in local time, one blank line between
/// messages.
pub fn export_to_text(messages: &[Message]) -> String {
    export_to_text_in(messages, &Local)
}

pub fn export_to_text_in<Tz>(messages: &[Message], tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    messages
        .iter()
        .map(|m| {
            let time = DateTime::<Utc>::from_timestamp_millis(m.timestamp)
                .map(|dt| dt.with_timezone(tz).format("%H:%M").to_string())
                .unwrap_or_else(|| "--:--".to_string());
            format!("[{}] {}: {}", time, m.role.label(), m.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn export_to_json(messages: &[Message]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(messages)
}

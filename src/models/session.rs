use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::ids::{FolderId, SessionId};
use super::message::Message;

/// A conversation snapshot kept in the session archive.
///
/// Messages are frozen at archive time; only `name` and `folder` change
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub messages: Vec<Message>,
    /// Archive time in milliseconds since the Unix epoch.
    pub created: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<FolderId>,
}

impl Session {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            id: SessionId::new(),
            messages,
            created: Utc::now().timestamp_millis(),
            name: None,
            folder: None,
        }
    }

    /// Display title: the user-given name, else the archive date and size.
    pub fn title(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.to_string();
        }
        let created = chrono::DateTime::<Utc>::from_timestamp_millis(self.created)
            .map(|dt| {
                dt.with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string()
            })
            .unwrap_or_else(|| "unknown date".to_string());
        format!("{} ({} msgs)", created, self.messages.len())
    }
}

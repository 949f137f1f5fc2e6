use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::ids::MessageId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Speaker label used in plain-text transcripts.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Assistant => "AI",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content: content.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_wire_shape() {
        let msg = Message {
            id: MessageId::from("abc"),
            role: Role::Assistant,
            content: "Once upon a time".to_string(),
            timestamp: 1_700_000_000_000,
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": "abc",
                "role": "assistant",
                "content": "Once upon a time",
                "timestamp": 1_700_000_000_000i64,
            })
        );
    }

    #[test]
    fn unknown_role_is_rejected() {
        let raw = r#"{"id":"a","role":"system","content":"x","timestamp":0}"#;
        assert!(serde_json::from_str::<Message>(raw).is_err());
    }
}

//! Subset of the Telegram Bot API payloads the bridge reads.

use serde::Deserialize;

use crate::common::messages::{display_name, InboundMessage};

/// `getUpdates` response envelope.
///
/// Updates are kept as raw JSON so one malformed entry cannot hide the
/// `update_id` of the others.
#[derive(Debug, Deserialize)]
pub struct UpdatesResponse {
    pub ok: bool,
    #[serde(default)]
    pub result: Vec<serde_json::Value>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub message_thread_id: Option<i64>,
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Message {
    /// Build the inbound message, or `None` when there is no text.
    pub fn into_inbound(self) -> Option<InboundMessage> {
        let text = self.text?;
        let (remote_username, display_name) = match self.from {
            Some(user) => (
                user.username,
                display_name(user.first_name.as_deref(), user.last_name.as_deref()),
            ),
            None => (None, display_name(None, None)),
        };

        Some(InboundMessage {
            text,
            remote_username,
            display_name,
            reply_message_id: Some(self.message_id),
            thread_id: self.message_thread_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_into_inbound() {
        let message: Message = serde_json::from_value(json!({
            "message_id": 77,
            "message_thread_id": 5,
            "chat": {"id": -100123, "type": "supergroup"},
            "from": {"id": 1, "username": "alice", "first_name": "Alice", "last_name": "Smith"},
            "text": "/say hi"
        }))
        .unwrap();

        let inbound = message.into_inbound().unwrap();
        assert_eq!(inbound.text, "/say hi");
        assert_eq!(inbound.remote_username.as_deref(), Some("alice"));
        assert_eq!(inbound.display_name, "Alice Smith");
        assert_eq!(inbound.reply_message_id, Some(77));
        assert_eq!(inbound.thread_id, Some(5));
    }

    #[test]
    fn test_message_without_sender_or_text() {
        let message: Message = serde_json::from_value(json!({
            "message_id": 1,
            "chat": {"id": 9},
            "text": "hello"
        }))
        .unwrap();
        let inbound = message.into_inbound().unwrap();
        assert_eq!(inbound.remote_username, None);
        assert_eq!(inbound.display_name, "TG");
        assert_eq!(inbound.thread_id, None);

        let sticker: Message = serde_json::from_value(json!({
            "message_id": 2,
            "chat": {"id": 9},
            "sticker": {"file_id": "x"}
        }))
        .unwrap();
        assert!(sticker.into_inbound().is_none());
    }
}

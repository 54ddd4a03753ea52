//! Canonical message types for bridge communication.

/// Display name used when Telegram gives us nothing better.
pub const FALLBACK_NAME: &str = "TG";

/// A text message received from the configured Telegram chat.
///
/// Built once per Telegram update and consumed by a single router dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Raw message text, including the command prefix.
    pub text: String,
    /// Sender's Telegram username without the `@`, if they have one.
    pub remote_username: Option<String>,
    /// Sender's "First Last" name as Telegram reports it.
    pub display_name: String,
    /// Message id to reply to.
    pub reply_message_id: Option<i64>,
    /// Forum topic the message was posted in.
    pub thread_id: Option<i64>,
}

impl InboundMessage {
    /// Convenience constructor for a message with no reply/topic metadata.
    #[cfg(test)]
    pub fn new(text: impl Into<String>, remote_username: Option<&str>, display_name: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            remote_username: remote_username.map(str::to_string),
            display_name: display_name.into(),
            reply_message_id: None,
            thread_id: None,
        }
    }
}

/// Build the sender display name from Telegram's name fields.
///
/// `first_name` falls back to [`FALLBACK_NAME`]; `last_name` is appended
/// after a space when present.
pub fn display_name(first_name: Option<&str>, last_name: Option<&str>) -> String {
    let mut name = first_name.unwrap_or(FALLBACK_NAME).to_string();
    if let Some(last) = last_name {
        name.push(' ');
        name.push_str(last);
    }
    name.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_variants() {
        assert_eq!(display_name(Some("Alice"), Some("Smith")), "Alice Smith");
        assert_eq!(display_name(Some("Alice"), None), "Alice");
        assert_eq!(display_name(None, Some("Smith")), "TG Smith");
        assert_eq!(display_name(None, None), "TG");
        assert_eq!(display_name(Some(" Bob "), None), "Bob");
    }
}

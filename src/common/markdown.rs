//! Telegram MarkdownV2 escaping.

/// Characters Telegram treats as MarkdownV2 syntax.
const SPECIAL_CHARS: &str = "_*[]()~`>#+-=|{}.!";

/// Prefix of service messages that Telegram should render as a quote.
const QUOTE_PREFIX: &str = "> ";

/// Escape every MarkdownV2 special character with a backslash.
///
/// Not idempotent: running it over already-escaped text adds a second
/// backslash before every special character. Apply it exactly once.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for ch in text.chars() {
        if SPECIAL_CHARS.contains(ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Escape like [`escape`], but keep a leading `"> "` so the message
/// renders as a quote block.
pub fn escape_service_aware(text: &str) -> String {
    match text.strip_prefix(QUOTE_PREFIX) {
        Some(rest) => format!("{}{}", QUOTE_PREFIX, escape(rest)),
        None => escape(text),
    }
}

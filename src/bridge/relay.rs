//! Game events -> Telegram service messages.
//!
//! Each event is gated by its service toggle and by outbound being usable,
//! both read from the latest config snapshot at call time.

use std::sync::Arc;

use crate::config::{Config, ConfigHolder};
use crate::telegram::TelegramGateway;

/// Forwards game events to the Telegram chat.
#[derive(Clone)]
pub struct ServiceRelay {
    config: ConfigHolder,
    telegram: Arc<dyn TelegramGateway>,
}

impl ServiceRelay {
    pub fn new(config: ConfigHolder, telegram: Arc<dyn TelegramGateway>) -> Self {
        Self { config, telegram }
    }

    /// Player chat line, sent as `<player> message`.
    pub fn on_chat(&self, player: &str, message: &str) {
        self.send_if(|c| c.service.chat, || format!("<{}> {}", player, message));
    }

    pub fn on_join(&self, player: &str) {
        self.send_if(|c| c.service.join_quit, || format!("> {} joined the game", player));
    }

    pub fn on_quit(&self, player: &str) {
        self.send_if(|c| c.service.join_quit, || format!("> {} left the game", player));
    }

    /// Player death. Without a death message the cause is reported instead.
    pub fn on_death(&self, player: &str, death_message: Option<&str>, cause: Option<&str>) {
        self.send_if(
            |c| c.service.deaths,
            || match death_message.filter(|m| !m.trim().is_empty()) {
                Some(message) => format!("> {}", message),
                None => format!("> {} died ({})", player, cause.unwrap_or("unknown")),
            },
        );
    }

    pub fn on_server_starting(&self) {
        self.send_if(|c| c.service.start_stop, || "> Server starting".to_string());
    }

    pub fn on_server_stopping(&self) {
        self.send_if(|c| c.service.start_stop, || "> Server stopping".to_string());
    }

    fn send_if(&self, toggle: impl Fn(&Config) -> bool, text: impl FnOnce() -> String) {
        let config = self.config.get();
        if config.has_outbound() && toggle(&config) {
            self.telegram.send_service(&text());
        }
    }
}

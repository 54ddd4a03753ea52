//! Inbound Telegram command routing.
//!
//! `/say hello world` becomes command `say` with args `hello world` and is
//! handed to whatever handler is registered under `say`. Anything that is
//! not a registered command is ignored without feedback.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::bridge::commands::TelegramCommand;
use crate::common::InboundMessage;
use crate::config::ConfigHolder;

/// Maps lowercase command names to handlers.
pub struct InboundCommandRouter {
    config: ConfigHolder,
    commands: HashMap<String, Arc<dyn TelegramCommand>>,
}

impl InboundCommandRouter {
    pub fn new(config: ConfigHolder) -> Self {
        Self {
            config,
            commands: HashMap::new(),
        }
    }

    /// Register a handler; a later registration under the same name wins.
    pub fn register(mut self, name: &str, handler: Arc<dyn TelegramCommand>) -> Self {
        self.commands.insert(name.to_lowercase(), handler);
        self
    }

    /// Registered command names, sorted.
    pub fn command_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Dispatch a message to its command handler, if any.
    pub fn route(&self, message: &InboundMessage) {
        let config = self.config.get();
        let Some((command, args)) = parse_command(config.command_prefix(), &message.text) else {
            return;
        };

        match self.commands.get(&command) {
            Some(handler) => {
                debug!("Telegram command /{} from {:?}", command, message.remote_username);
                handler.handle(&args, message);
            }
            None => debug!("Ignoring unknown Telegram command: {}", command),
        }
    }
}

/// Split `<prefix><command> <args>` into a lowercase command and trimmed args.
///
/// Returns `None` for blank text or text without the prefix.
pub fn parse_command(prefix: &str, text: &str) -> Option<(String, String)> {
    if text.trim().is_empty() {
        return None;
    }
    let body = text.strip_prefix(prefix)?.trim();

    let (command, args) = match body.split_once(' ') {
        Some((command, args)) => (command, args.trim()),
        None => (body, ""),
    };
    Some((command.to_lowercase(), args.to_string()))
}

//! Telegram commands (/say, /online).

use std::sync::Arc;

use tracing::info;

use crate::bridge::names::NameResolver;
use crate::common::InboundMessage;
use crate::game::GameBridge;
use crate::telegram::TelegramGateway;

/// Header line of the /online reply.
pub const ONLINE_HEADER: &str = "Current online:";

/// A command invoked from Telegram.
///
/// Handlers run on the poller task; a handler that blocks stalls every
/// later inbound message.
pub trait TelegramCommand: Send + Sync {
    fn handle(&self, args: &str, message: &InboundMessage);
}

/// `/say <text>`: broadcast `[name] text` in game.
pub struct SayCommand {
    game: Arc<dyn GameBridge>,
    names: NameResolver,
}

impl SayCommand {
    pub fn new(game: Arc<dyn GameBridge>, names: NameResolver) -> Self {
        Self { game, names }
    }
}

impl TelegramCommand for SayCommand {
    fn handle(&self, args: &str, message: &InboundMessage) {
        if args.is_empty() {
            return;
        }

        let name = self
            .names
            .resolve_effective(message.remote_username.as_deref(), &message.display_name);
        info!("Telegram -> Game: [{}] {}", name, args);
        self.game.broadcast(&format!("[{}] {}", name, args));
    }
}

/// `/online`: reply with the online player list.
pub struct OnlineCommand {
    game: Arc<dyn GameBridge>,
    telegram: Arc<dyn TelegramGateway>,
}

impl OnlineCommand {
    pub fn new(game: Arc<dyn GameBridge>, telegram: Arc<dyn TelegramGateway>) -> Self {
        Self { game, telegram }
    }
}

impl TelegramCommand for OnlineCommand {
    fn handle(&self, _args: &str, message: &InboundMessage) {
        let reply = format_online(&self.game.online_names());
        self.telegram
            .send_reply(&reply, message.reply_message_id, message.thread_id);
    }
}

fn format_online(names: &[String]) -> String {
    std::iter::once(ONLINE_HEADER)
        .chain(names.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join("\n")
}

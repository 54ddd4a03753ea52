//! Headless game adapter driven by stdin.
//!
//! Each input line is one game event:
//!
//! ```text
//! chat <player> <text>        player chat line
//! join <player>               player logged in
//! quit <player>               player logged out
//! death <player> [message]    player died
//! tglink <player> [username]  show or create the player's Telegram link
//! tgunlink <player>           remove the player's Telegram link
//! online                      list online players
//! reload                      re-read the config file
//! ```
//!
//! Broadcasts from Telegram are printed to stdout.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{error, info, warn};

use crate::bridge::{LinkAdmin, ServiceRelay};
use crate::common::error::ConsoleError;
use crate::config::{self, ConfigHolder};
use crate::game::GameBridge;

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleEvent {
    Chat { player: String, text: String },
    Join { player: String },
    Quit { player: String },
    Death { player: String, message: Option<String> },
    Link { player: String, username: Option<String> },
    Unlink { player: String },
    Online,
    Reload,
}

/// Parse a console line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<ConsoleEvent>, ConsoleError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = split_word(line);
    let verb = verb.to_lowercase();
    match verb.as_str() {
        "online" => return Ok(Some(ConsoleEvent::Online)),
        "reload" => return Ok(Some(ConsoleEvent::Reload)),
        "chat" | "join" | "quit" | "death" | "tglink" | "tgunlink" => {}
        _ => return Err(ConsoleError::UnknownCommand { verb }),
    }

    let (player, tail) = split_word(rest);
    if player.is_empty() {
        return Err(ConsoleError::MissingPlayer { verb });
    }
    let player = player.to_string();
    let tail = (!tail.is_empty()).then(|| tail.to_string());

    let event = match verb.as_str() {
        "chat" => ConsoleEvent::Chat {
            player,
            text: tail.ok_or(ConsoleError::Usage {
                usage: "chat <player> <text>",
            })?,
        },
        "join" => ConsoleEvent::Join { player },
        "quit" => ConsoleEvent::Quit { player },
        "death" => ConsoleEvent::Death { player, message: tail },
        "tglink" => ConsoleEvent::Link { player, username: tail },
        _ => ConsoleEvent::Unlink { player },
    };
    Ok(Some(event))
}

fn split_word(s: &str) -> (&str, &str) {
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (s, ""),
    }
}

/// In-memory game state: who is online, and where broadcasts go.
#[derive(Debug, Default)]
pub struct ConsoleGame {
    online: Mutex<Vec<String>>,
}

impl ConsoleGame {
    fn online(&self) -> MutexGuard<'_, Vec<String>> {
        self.online.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn join(&self, player: &str) {
        let mut online = self.online();
        if !online.iter().any(|p| p == player) {
            online.push(player.to_string());
        }
    }

    fn quit(&self, player: &str) {
        self.online().retain(|p| p != player);
    }
}

impl GameBridge for ConsoleGame {
    fn broadcast(&self, message: &str) {
        println!("[broadcast] {}", message);
    }

    fn online_names(&self) -> Vec<String> {
        self.online().clone()
    }
}

/// Feeds console events into the bridge.
pub struct ConsoleSession {
    game: Arc<ConsoleGame>,
    relay: ServiceRelay,
    admin: LinkAdmin,
    config: ConfigHolder,
    config_path: String,
}

impl ConsoleSession {
    pub fn new(
        game: Arc<ConsoleGame>,
        relay: ServiceRelay,
        admin: LinkAdmin,
        config: ConfigHolder,
        config_path: impl Into<String>,
    ) -> Self {
        Self {
            game,
            relay,
            admin,
            config,
            config_path: config_path.into(),
        }
    }

    /// Apply one event and return the text to show the operator, if any.
    pub fn handle(&self, event: ConsoleEvent) -> Option<String> {
        match event {
            ConsoleEvent::Chat { player, text } => {
                self.relay.on_chat(&player, &text);
                None
            }
            ConsoleEvent::Join { player } => {
                self.game.join(&player);
                self.relay.on_join(&player);
                None
            }
            ConsoleEvent::Quit { player } => {
                self.game.quit(&player);
                self.relay.on_quit(&player);
                None
            }
            ConsoleEvent::Death { player, message } => {
                self.relay.on_death(&player, message.as_deref(), None);
                None
            }
            ConsoleEvent::Link { player, username } => Some(
                match username {
                    Some(username) => self.admin.link(&player, &username),
                    None => self.admin.show(&player),
                }
                .to_string(),
            ),
            ConsoleEvent::Unlink { player } => Some(self.admin.unlink(&player).to_string()),
            ConsoleEvent::Online => {
                let names = self.game.online_names();
                Some(format!("{} online: {}", names.len(), names.join(", ")))
            }
            ConsoleEvent::Reload => Some(
                match config::reload(&self.config, &self.config_path) {
                    Ok(()) => "Configuration reloaded".to_string(),
                    Err(e) => format!("Reload failed: {}", e),
                },
            ),
        }
    }

    /// Read events until the input ends.
    pub async fn run<R>(&self, input: R)
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => match parse_line(&line) {
                    Ok(Some(event)) => {
                        if let Some(reply) = self.handle(event) {
                            println!("{}", reply);
                        }
                    }
                    Ok(None) => {}
                    Err(e) => warn!("Console: {}", e),
                },
                Ok(None) => {
                    info!("Console input closed");
                    break;
                }
                Err(e) => {
                    error!("Failed to read console input: {}", e);
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::JsonLinkRepository;
    use crate::config::Config;
    use crate::testing::RecordingGateway;
    use tempfile::TempDir;

    fn session() -> (TempDir, Arc<RecordingGateway>, ConsoleSession) {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.telegram.enabled = true;
        config.telegram.bot_token = "t".to_string();
        config.telegram.chat_id = "1".to_string();
        let holder = ConfigHolder::new(config);

        let telegram = Arc::new(RecordingGateway::default());
        let links = Arc::new(JsonLinkRepository::open(dir.path().join("links.json")));
        let session = ConsoleSession::new(
            Arc::new(ConsoleGame::default()),
            ServiceRelay::new(holder.clone(), telegram.clone()),
            LinkAdmin::new(links),
            holder,
            dir.path().join("missing.conf").display().to_string(),
        );
        (dir, telegram, session)
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("   "), Ok(None));
        assert_eq!(
            parse_line("chat Steve hello there"),
            Ok(Some(ConsoleEvent::Chat {
                player: "Steve".to_string(),
                text: "hello there".to_string()
            }))
        );
        assert_eq!(
            parse_line("DEATH Steve"),
            Ok(Some(ConsoleEvent::Death {
                player: "Steve".to_string(),
                message: None
            }))
        );
        assert_eq!(
            parse_line("tglink Steve @alice"),
            Ok(Some(ConsoleEvent::Link {
                player: "Steve".to_string(),
                username: Some("@alice".to_string())
            }))
        );
        assert_eq!(parse_line("online"), Ok(Some(ConsoleEvent::Online)));
        assert_eq!(
            parse_line("chat Steve"),
            Err(ConsoleError::Usage {
                usage: "chat <player> <text>"
            })
        );
        assert_eq!(
            parse_line("JOIN"),
            Err(ConsoleError::MissingPlayer {
                verb: "join".to_string()
            })
        );
        assert_eq!(
            parse_line("chat"),
            Err(ConsoleError::MissingPlayer {
                verb: "chat".to_string()
            })
        );
        assert_eq!(
            parse_line("dance"),
            Err(ConsoleError::UnknownCommand {
                verb: "dance".to_string()
            })
        );
        assert_eq!(
            parse_line("dance Steve"),
            Err(ConsoleError::UnknownCommand {
                verb: "dance".to_string()
            })
        );
    }

    #[test]
    fn test_join_quit_tracks_online() {
        let (_dir, telegram, session) = session();

        session.handle(ConsoleEvent::Join { player: "Steve".to_string() });
        session.handle(ConsoleEvent::Join { player: "Alex".to_string() });
        session.handle(ConsoleEvent::Join { player: "Steve".to_string() });
        session.handle(ConsoleEvent::Quit { player: "Alex".to_string() });

        assert_eq!(session.game.online_names(), vec!["Steve"]);
        assert_eq!(
            telegram.services(),
            vec![
                "> Steve joined the game",
                "> Alex joined the game",
                "> Steve joined the game",
                "> Alex left the game",
            ]
        );
    }

    #[test]
    fn test_link_commands() {
        let (_dir, _telegram, session) = session();

        let reply = session.handle(ConsoleEvent::Link {
            player: "Steve".to_string(),
            username: Some("alice".to_string()),
        });
        assert_eq!(reply.as_deref(), Some("Linked Telegram alice → MC name Steve"));

        let reply = session.handle(ConsoleEvent::Link {
            player: "Steve".to_string(),
            username: None,
        });
        assert_eq!(reply.as_deref(), Some("Linked @alice → Steve"));

        let reply = session.handle(ConsoleEvent::Unlink { player: "Steve".to_string() });
        assert_eq!(reply.as_deref(), Some("Unlinked @alice from Steve"));
    }

    #[tokio::test]
    async fn test_run_reads_until_eof() {
        let (_dir, telegram, session) = session();
        let input: &[u8] = b"join Steve\nchat Steve hi!\nbogus\n\ndeath Steve\n";

        session.run(input).await;

        assert_eq!(
            telegram.services(),
            vec!["> Steve joined the game", "<Steve> hi!", "> Steve died (unknown)"]
        );
    }

    #[test]
    fn test_reload_with_missing_file_uses_defaults() {
        let (_dir, _telegram, session) = session();
        assert!(session.config.get().has_outbound());

        let reply = session.handle(ConsoleEvent::Reload);
        assert_eq!(reply.as_deref(), Some("Configuration reloaded"));
        assert!(!session.config.get().has_outbound());
    }
}

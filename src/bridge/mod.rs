//! Bridge integration layer between the game server and Telegram.
//!
//! ## Module Structure
//!
//! - `links`: Telegram username <-> game identity store
//! - `names`: Sender name resolution for inbound messages
//! - `router`: Inbound command parsing and dispatch
//! - `commands`: `/say` and `/online` handlers
//! - `relay`: Game events -> Telegram service messages
//! - `admin`: In-game `tglink` / `tgunlink` actions

pub mod admin;
pub mod commands;
pub mod links;
pub mod names;
pub mod relay;
pub mod router;

pub use admin::LinkAdmin;
pub use commands::{OnlineCommand, SayCommand};
pub use links::JsonLinkRepository;
pub use names::NameResolver;
pub use relay::ServiceRelay;
pub use router::InboundCommandRouter;

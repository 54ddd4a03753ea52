//! Game server side of the bridge.
//!
//! The bridge only needs two things from the game: a way to show a line
//! to every player and the list of players currently online.

pub mod console;

pub use console::{ConsoleGame, ConsoleSession};

/// What the bridge can ask of the game server.
pub trait GameBridge: Send + Sync {
    /// Show a system message to every online player.
    fn broadcast(&self, message: &str);

    /// Names of the players currently online.
    fn online_names(&self) -> Vec<String>;
}

//! In-game link administration (`tglink`, `tgunlink`).

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::bridge::links::LinkRepository;

/// Outcome shown to the player who ran the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminReply {
    Success(String),
    Failure(String),
}

impl AdminReply {
    #[cfg(test)]
    pub fn is_success(&self) -> bool {
        matches!(self, AdminReply::Success(_))
    }
}

impl fmt::Display for AdminReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminReply::Success(text) | AdminReply::Failure(text) => f.write_str(text),
        }
    }
}

/// Link commands run by a player on their own identity.
#[derive(Clone)]
pub struct LinkAdmin {
    links: Arc<dyn LinkRepository>,
}

impl LinkAdmin {
    pub fn new(links: Arc<dyn LinkRepository>) -> Self {
        Self { links }
    }

    /// `tglink` without arguments: show the current link.
    pub fn show(&self, identity: &str) -> AdminReply {
        match self.links.find_tg_by_mc(identity) {
            Some(username) => AdminReply::Success(format!("Linked @{} → {}", username, identity)),
            None => AdminReply::Success(
                "No Telegram username linked. Use /tglink <username>".to_string(),
            ),
        }
    }

    /// `tglink <username>`. An already linked username is never taken over.
    pub fn link(&self, identity: &str, raw_username: &str) -> AdminReply {
        let raw = raw_username.trim();
        if raw.is_empty() || raw == "@" {
            return AdminReply::Failure(
                "Provide a Telegram username, e.g., my_username".to_string(),
            );
        }

        if self.links.is_linked(raw) {
            return AdminReply::Failure(
                "That Telegram username is already linked and cannot be overwritten.".to_string(),
            );
        }

        match self.links.link(raw, identity) {
            Ok(()) => {
                info!("{} linked Telegram {}", identity, raw);
                AdminReply::Success(format!("Linked Telegram {} → MC name {}", raw, identity))
            }
            Err(e) => AdminReply::Failure(format!("Could not save the link: {}", e)),
        }
    }

    /// `tgunlink`: drop the player's link.
    pub fn unlink(&self, identity: &str) -> AdminReply {
        match self.links.unlink_by_mc(identity) {
            Ok(Some(username)) => {
                AdminReply::Success(format!("Unlinked @{} from {}", username, identity))
            }
            Ok(None) => AdminReply::Success("You have no Telegram username linked.".to_string()),
            Err(e) => AdminReply::Failure(format!("Could not save the unlink: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::links::JsonLinkRepository;
    use tempfile::TempDir;

    fn admin() -> (TempDir, Arc<JsonLinkRepository>, LinkAdmin) {
        let dir = TempDir::new().unwrap();
        let links = Arc::new(JsonLinkRepository::open(dir.path().join("links.json")));
        let admin = LinkAdmin::new(links.clone());
        (dir, links, admin)
    }

    #[test]
    fn test_show_link() {
        let (_dir, _links, admin) = admin();
        assert_eq!(
            admin.show("Steve").to_string(),
            "No Telegram username linked. Use /tglink <username>"
        );

        assert!(admin.link("Steve", "@Alice").is_success());
        assert_eq!(admin.show("Steve").to_string(), "Linked @alice → Steve");
    }

    #[test]
    fn test_link_requires_username() {
        let (_dir, links, admin) = admin();
        assert!(!admin.link("Steve", "  ").is_success());
        assert!(!admin.link("Steve", "@").is_success());
        assert_eq!(links.len(), 0);
    }

    #[test]
    fn test_link_refuses_to_overwrite() {
        let (_dir, links, admin) = admin();
        assert_eq!(
            admin.link("Steve", "alice"),
            AdminReply::Success("Linked Telegram alice → MC name Steve".to_string())
        );

        let reply = admin.link("Alex", "@ALICE");
        assert_eq!(
            reply,
            AdminReply::Failure(
                "That Telegram username is already linked and cannot be overwritten.".to_string()
            )
        );
        assert_eq!(links.resolve_mc_from_tg(Some("alice")).as_deref(), Some("Steve"));
    }

    #[test]
    fn test_unlink() {
        let (_dir, _links, admin) = admin();
        assert_eq!(
            admin.unlink("Steve").to_string(),
            "You have no Telegram username linked."
        );

        admin.link("Steve", "alice");
        assert_eq!(admin.unlink("Steve").to_string(), "Unlinked @alice from Steve");
        assert_eq!(
            admin.unlink("Steve").to_string(),
            "You have no Telegram username linked."
        );
    }
}

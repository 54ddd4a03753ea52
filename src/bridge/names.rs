//! Which name an inbound Telegram message is attributed to in game.

use std::sync::Arc;

use crate::bridge::links::LinkRepository;
use crate::common::FALLBACK_NAME;

/// Picks the in-game name for a Telegram sender.
#[derive(Clone)]
pub struct NameResolver {
    links: Arc<dyn LinkRepository>,
}

impl NameResolver {
    pub fn new(links: Arc<dyn LinkRepository>) -> Self {
        Self { links }
    }

    /// Linked game identity first, then `@username`, then the Telegram
    /// display name, then [`FALLBACK_NAME`].
    pub fn resolve_effective(&self, remote_username: Option<&str>, display_name: &str) -> String {
        if let Some(linked) = self.links.resolve_mc_from_tg(remote_username) {
            if !linked.trim().is_empty() {
                return linked;
            }
        }

        if let Some(username) = remote_username.filter(|u| !u.trim().is_empty()) {
            return format!("@{}", username);
        }

        if !display_name.trim().is_empty() {
            return display_name.to_string();
        }

        FALLBACK_NAME.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::links::JsonLinkRepository;
    use tempfile::TempDir;

    fn resolver() -> (TempDir, Arc<JsonLinkRepository>, NameResolver) {
        let dir = TempDir::new().unwrap();
        let links = Arc::new(JsonLinkRepository::open(dir.path().join("links.json")));
        let resolver = NameResolver::new(links.clone());
        (dir, links, resolver)
    }

    #[test]
    fn test_fallback_label() {
        let (_dir, _links, names) = resolver();
        assert_eq!(names.resolve_effective(None, ""), "TG");
        assert_eq!(names.resolve_effective(Some(" "), "  "), "TG");
    }

    #[test]
    fn test_display_name_when_no_username() {
        let (_dir, _links, names) = resolver();
        assert_eq!(names.resolve_effective(None, "Alice"), "Alice");
    }

    #[test]
    fn test_username_when_not_linked() {
        let (_dir, _links, names) = resolver();
        assert_eq!(names.resolve_effective(Some("bob"), "Bob B"), "@bob");
    }

    #[test]
    fn test_linked_identity_wins() {
        let (_dir, links, names) = resolver();
        links.link("bob", "Steve").unwrap();
        assert_eq!(names.resolve_effective(Some("bob"), "Bob B"), "Steve");
        assert_eq!(names.resolve_effective(Some("BOB"), "Bob B"), "Steve");
    }
}

//! Telegram username <-> game identity links.
//!
//! Links live in memory behind a single mutex and are written back to a
//! JSON document after every mutation:
//!
//! ```json
//! { "some_user": "Steve", "other": "Alex" }
//! ```
//!
//! Keys are normalized usernames (no leading `@`, lowercase). Several
//! usernames may point at the same identity; only the admin layer decides
//! whether that is allowed.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info, warn};

use crate::common::error::{LinkStoreError, LinkStoreResult};

/// Storage of Telegram -> game identity links.
pub trait LinkRepository: Send + Sync {
    /// Game identity linked to a Telegram username.
    fn resolve_mc_from_tg(&self, remote_username: Option<&str>) -> Option<String>;

    /// Link a username to an identity, replacing any previous link for
    /// that username. Blank inputs are ignored.
    fn link(&self, remote_username: &str, local_identity: &str) -> LinkStoreResult<()>;

    /// Remove the first link pointing at `local_identity` and return its
    /// username.
    fn unlink_by_mc(&self, local_identity: &str) -> LinkStoreResult<Option<String>>;

    /// Username of the first link pointing at `local_identity`.
    fn find_tg_by_mc(&self, local_identity: &str) -> Option<String>;

    fn is_linked(&self, remote_username: &str) -> bool {
        self.resolve_mc_from_tg(Some(remote_username)).is_some()
    }
}

/// Strip a leading `@`, trim and lowercase a Telegram username.
pub fn normalize_username(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('@')
        .unwrap_or(trimmed)
        .trim()
        .to_lowercase()
}

/// File-backed [`LinkRepository`].
#[derive(Debug)]
pub struct JsonLinkRepository {
    path: PathBuf,
    links: Mutex<BTreeMap<String, String>>,
}

impl JsonLinkRepository {
    /// Open the store at `path`, loading existing links.
    ///
    /// Load problems are logged and leave the store empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let links = load_links(&path);
        info!("Loaded {} Telegram link(s) from {}", links.len(), path.display());
        Self {
            path,
            links: Mutex::new(links),
        }
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored links.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        // Every mutation is a single map call, so a poisoned map is still consistent.
        self.links.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Rewrite the whole document: temp file first, then rename over the target.
    fn save(&self, links: &BTreeMap<String, String>) -> LinkStoreResult<()> {
        let json = serde_json::to_string_pretty(links)?;
        let io_err = |source| LinkStoreError::Io {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(io_err)?;
        fs::rename(&tmp_path, &self.path).map_err(io_err)?;

        debug!("Saved {} link(s) to {}", links.len(), self.path.display());
        Ok(())
    }

    fn save_logged(&self, links: &BTreeMap<String, String>) -> LinkStoreResult<()> {
        self.save(links).map_err(|e| {
            warn!("Failed to persist Telegram links: {}", e);
            e
        })
    }
}

impl LinkRepository for JsonLinkRepository {
    fn resolve_mc_from_tg(&self, remote_username: Option<&str>) -> Option<String> {
        let key = normalize_username(remote_username?);
        self.lock().get(&key).cloned()
    }

    fn link(&self, remote_username: &str, local_identity: &str) -> LinkStoreResult<()> {
        let key = normalize_username(remote_username);
        if key.is_empty() || local_identity.trim().is_empty() {
            return Ok(());
        }

        let mut links = self.lock();
        if let Some(previous) = links.insert(key.clone(), local_identity.to_string()) {
            debug!("Replacing link @{} -> {} with {}", key, previous, local_identity);
        }
        info!("Linked Telegram @{} -> {}", key, local_identity);
        self.save_logged(&links)
    }

    fn unlink_by_mc(&self, local_identity: &str) -> LinkStoreResult<Option<String>> {
        let mut links = self.lock();
        let Some(key) = first_key_for(&links, local_identity) else {
            return Ok(None);
        };

        links.remove(&key);
        info!("Unlinked Telegram @{} from {}", key, local_identity);
        self.save_logged(&links)?;
        Ok(Some(key))
    }

    fn find_tg_by_mc(&self, local_identity: &str) -> Option<String> {
        first_key_for(&self.lock(), local_identity)
    }
}

fn first_key_for(links: &BTreeMap<String, String>, local_identity: &str) -> Option<String> {
    links
        .iter()
        .find(|(_, identity)| identity.as_str() == local_identity)
        .map(|(key, _)| key.clone())
}

fn load_links(path: &Path) -> BTreeMap<String, String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create link store directory {}: {}", parent.display(), e);
        }
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(e) => {
            warn!("Failed to read link store {}: {}", path.display(), e);
            return BTreeMap::new();
        }
    };

    if content.trim().is_empty() {
        return BTreeMap::new();
    }

    match serde_json::from_str(&content) {
        Ok(links) => links,
        Err(e) => {
            warn!("Failed to parse link store {}, starting empty: {}", path.display(), e);
            BTreeMap::new()
        }
    }
}

//! Process-wide configuration snapshot.
//!
//! Readers grab an `Arc<Config>` and keep using it for the rest of the
//! operation; a reload swaps in a whole new snapshot.

use std::sync::Arc;

use tokio::sync::watch;

use crate::config::types::Config;

/// Shared holder for the latest configuration snapshot.
#[derive(Debug, Clone)]
pub struct ConfigHolder {
    tx: Arc<watch::Sender<Arc<Config>>>,
}

impl ConfigHolder {
    pub fn new(config: Config) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(config));
        Self { tx: Arc::new(tx) }
    }

    /// The latest snapshot.
    pub fn get(&self) -> Arc<Config> {
        self.tx.borrow().clone()
    }

    /// Replace the snapshot wholesale.
    pub fn replace(&self, config: Config) {
        self.tx.send_replace(Arc::new(config));
    }

    /// Receiver that is notified on every replacement.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Config>> {
        self.tx.subscribe()
    }
}

impl Default for ConfigHolder {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

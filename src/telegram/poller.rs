//! Inbound long-poll loop.
//!
//! One background task calls [`TelegramGateway::poll_once`] over and over
//! and routes every message it yields. Errors are logged and followed by a
//! short backoff; nothing here ever ends the loop except [`Poller::stop`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use backon::BackoffBuilder;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bridge::InboundCommandRouter;
use crate::common::InboundMessage;
use crate::config::Config;
use crate::telegram::gateway::{PollOutcome, TelegramGateway};

/// Wait after a failed poll.
const POLL_BACKOFF: Duration = Duration::from_secs(2);

/// Constant 2s backoff, unlimited retries.
fn poll_backoff() -> impl Iterator<Item = Duration> {
    backon::ConstantBuilder::default()
        .with_delay(POLL_BACKOFF)
        .without_max_times()
        .build()
}

struct PollerTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owns the inbound polling task.
pub struct Poller {
    gateway: Arc<dyn TelegramGateway>,
    router: Arc<InboundCommandRouter>,
    running: Arc<AtomicBool>,
    task: Mutex<Option<PollerTask>>,
}

impl Poller {
    pub fn new(gateway: Arc<dyn TelegramGateway>, router: Arc<InboundCommandRouter>) -> Self {
        Self {
            gateway,
            router,
            running: Arc::new(AtomicBool::new(false)),
            task: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Spawn the polling task. Does nothing if it is already running.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_loop(
            self.gateway.clone(),
            self.router.clone(),
            self.running.clone(),
            cancel.clone(),
        ));

        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        *task = Some(PollerTask { cancel, handle });
        info!("Inbound poller started");
    }

    /// Stop the polling task, abandoning any in-flight long poll.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);

        let task = self.task.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(task) = task {
            task.cancel.cancel();
            drop(task.handle);
            info!("Inbound poller stopped");
        }
    }

    /// Start or stop polling whenever a new config flips inbound.
    ///
    /// Runs until the config sender is dropped.
    pub async fn follow_config(self: Arc<Self>, mut rx: watch::Receiver<Arc<Config>>) {
        while rx.changed().await.is_ok() {
            let inbound = rx.borrow_and_update().inbound_enabled();
            match (inbound, self.is_running()) {
                (true, false) => self.start(),
                (false, true) => self.stop(),
                _ => {}
            }
        }
        debug!("Config watch closed, poller no longer follows reloads");
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_loop(
    gateway: Arc<dyn TelegramGateway>,
    router: Arc<InboundCommandRouter>,
    running: Arc<AtomicBool>,
    cancel: CancellationToken,
) {
    let mut backoff = poll_backoff();

    while running.load(Ordering::SeqCst) {
        let mut route = |message: InboundMessage| router.route(&message);

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            outcome = gateway.poll_once(&mut route) => outcome,
        };

        let delay = match outcome {
            Ok(PollOutcome::Polled(delivered)) => {
                if delivered > 0 {
                    debug!("Routed {} Telegram message(s)", delivered);
                }
                backoff = poll_backoff();
                continue;
            }
            Ok(PollOutcome::Disabled) => POLL_BACKOFF,
            Err(e) => {
                warn!("Telegram poll failed: {}", e);
                backoff.next().unwrap_or(POLL_BACKOFF)
            }
        };

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }

    debug!("Inbound poll loop exited");
}

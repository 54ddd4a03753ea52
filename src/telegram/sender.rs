//! Bounded worker pool for outbound Telegram requests.
//!
//! Producers (game events) never block: when the queue is full the oldest
//! queued request is dropped to make room. A fixed set of worker tasks
//! drains the queue. Delivery is best-effort and never retried.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::common::error::TelegramResult;

/// Maximum number of requests waiting for a worker.
pub const SEND_QUEUE_CAPACITY: usize = 256;

/// Number of worker tasks draining the queue.
pub const SEND_WORKERS: usize = 3;

/// One `sendMessage` call waiting to be made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRequest {
    pub text: String,
    pub reply_message_id: Option<i64>,
    pub thread_id: Option<i64>,
}

impl SendRequest {
    pub fn service(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            reply_message_id: None,
            thread_id: None,
        }
    }
}

/// Counters describing what the pool has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendStats {
    pub submitted: u64,
    pub discarded: u64,
    pub completed: u64,
    pub failed: u64,
}

#[derive(Debug, Default)]
struct PoolInner {
    queue: Mutex<VecDeque<SendRequest>>,
    notify: Notify,
    closed: AtomicBool,
    submitted: AtomicU64,
    discarded: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
}

/// Discard-oldest queue plus the workers draining it.
#[derive(Debug, Clone)]
pub struct SendPool {
    inner: Arc<PoolInner>,
    capacity: usize,
    workers: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl SendPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(PoolInner::default()),
            capacity: capacity.max(1),
            workers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Start `count` workers, each running `handler` for one request at a time.
    pub fn spawn_workers<F, Fut>(&self, count: usize, handler: F)
    where
        F: Fn(SendRequest) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = TelegramResult<()>> + Send + 'static,
    {
        let mut workers = lock(&self.workers);
        for id in 0..count {
            let inner = self.inner.clone();
            let handler = handler.clone();
            workers.push(tokio::spawn(async move {
                while let Some(request) = next_request(&inner).await {
                    match handler(request).await {
                        Ok(()) => {
                            inner.completed.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(e) => {
                            inner.failed.fetch_add(1, Ordering::Relaxed);
                            warn!("Telegram send failed: {}", e);
                        }
                    }
                }
                debug!("Telegram send worker {} stopped", id);
            }));
        }
    }

    /// Queue a request. Returns `false` once the pool is closed.
    pub fn submit(&self, request: SendRequest) -> bool {
        if self.inner.closed.load(Ordering::SeqCst) {
            debug!("Send pool closed, dropping message");
            return false;
        }

        {
            let mut queue = lock(&self.inner.queue);
            if queue.len() >= self.capacity {
                queue.pop_front();
                self.inner.discarded.fetch_add(1, Ordering::Relaxed);
                warn!("Telegram send queue full, discarded oldest message");
            }
            queue.push_back(request);
        }
        self.inner.submitted.fetch_add(1, Ordering::Relaxed);
        self.inner.notify.notify_one();
        true
    }

    /// Requests still waiting for a worker.
    pub fn pending(&self) -> usize {
        lock(&self.inner.queue).len()
    }

    pub fn stats(&self) -> SendStats {
        SendStats {
            submitted: self.inner.submitted.load(Ordering::Relaxed),
            discarded: self.inner.discarded.load(Ordering::Relaxed),
            completed: self.inner.completed.load(Ordering::Relaxed),
            failed: self.inner.failed.load(Ordering::Relaxed),
        }
    }

    /// Stop accepting requests; workers exit once the queue is drained.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// Close the pool and wait up to `timeout` for queued requests to go out.
    pub async fn shutdown(&self, timeout: Duration) {
        self.close();
        let workers: Vec<_> = lock(&self.workers).drain(..).collect();
        let drain = join_workers(workers);

        match tokio::time::timeout(timeout, drain).await {
            Ok(()) => info!("Telegram send queue drained"),
            Err(_) => warn!(
                "Telegram send queue did not drain within {:.1}s, {} message(s) dropped",
                timeout.as_secs_f64(),
                self.pending()
            ),
        }
    }
}

impl Default for SendPool {
    fn default() -> Self {
        Self::new(SEND_QUEUE_CAPACITY)
    }
}

async fn next_request(inner: &PoolInner) -> Option<SendRequest> {
    loop {
        let notified = inner.notify.notified();
        tokio::pin!(notified);
        // Register interest before checking, so a concurrent submit or
        // close cannot slip between the check and the wait.
        notified.as_mut().enable();

        if let Some(request) = lock(&inner.queue).pop_front() {
            return Some(request);
        }
        if inner.closed.load(Ordering::SeqCst) {
            return None;
        }
        notified.await;
    }
}

async fn join_workers(handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        if let Err(e) = handle.await {
            warn!("Telegram send worker panicked: {}", e);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::TelegramError;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_discards_oldest_when_full() {
        let pool = SendPool::new(2);
        assert!(pool.submit(SendRequest::service("one")));
        assert!(pool.submit(SendRequest::service("two")));
        assert!(pool.submit(SendRequest::service("three")));

        assert_eq!(pool.pending(), 2);
        let queue = lock(&pool.inner.queue);
        assert_eq!(queue[0].text, "two");
        assert_eq!(queue[1].text, "three");
        drop(queue);

        let stats = pool.stats();
        assert_eq!(stats.submitted, 3);
        assert_eq!(stats.discarded, 1);
    }

    #[test]
    fn test_closed_pool_rejects() {
        let pool = SendPool::new(4);
        pool.close();
        assert!(!pool.submit(SendRequest::service("late")));
        assert_eq!(pool.pending(), 0);
    }

    #[tokio::test]
    async fn test_workers_drain_queue_on_shutdown() {
        let pool = SendPool::new(16);
        let seen = Arc::new(AtomicUsize::new(0));

        for i in 0..5 {
            pool.submit(SendRequest::service(format!("msg {}", i)));
        }

        let counter = seen.clone();
        pool.spawn_workers(3, move |_request| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        pool.shutdown(Duration::from_secs(2)).await;
        assert_eq!(seen.load(Ordering::SeqCst), 5);
        assert_eq!(pool.stats().completed, 5);
        assert_eq!(pool.pending(), 0);
    }

    #[tokio::test]
    async fn test_failures_are_counted_not_retried() {
        let pool = SendPool::new(16);
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        pool.spawn_workers(1, move |_request| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(TelegramError::Status { status: 500 })
            }
        });

        pool.submit(SendRequest::service("boom"));
        pool.shutdown(Duration::from_secs(2)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(pool.stats().failed, 1);
    }
}

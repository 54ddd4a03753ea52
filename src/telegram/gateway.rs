//! Telegram Bot API gateway.
//!
//! Outbound messages go through the [`SendPool`] so callers never wait on
//! the network. Inbound messages are fetched with `getUpdates` long
//! polling; the gateway owns the update offset and advances it for every
//! update it sees, whether or not the update is delivered.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::common::error::{TelegramError, TelegramResult};
use crate::common::markdown::escape_service_aware;
use crate::common::InboundMessage;
use crate::config::{Config, ConfigHolder};
use crate::telegram::sender::{SendPool, SendRequest, SEND_QUEUE_CAPACITY, SEND_WORKERS};
use crate::telegram::types::{Update, UpdatesResponse};

/// TCP connect timeout for every Bot API call.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Total timeout for one `sendMessage` call.
const SEND_TIMEOUT: Duration = Duration::from_secs(8);

/// Extra time allowed on top of the long-poll timeout.
const POLL_GRACE: Duration = Duration::from_secs(5);

/// What a single poll did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Inbound is switched off; nothing was requested.
    Disabled,
    /// A batch was fetched; holds the number of messages delivered.
    Polled(usize),
}

/// Outbound send and inbound fetch against Telegram.
#[async_trait]
pub trait TelegramGateway: Send + Sync {
    /// Fire-and-forget message to the configured chat.
    fn send_service(&self, text: &str);

    /// Fire-and-forget reply, threaded under a message/topic when given.
    fn send_reply(&self, text: &str, reply_message_id: Option<i64>, thread_id: Option<i64>);

    /// Fetch one batch of updates and hand every deliverable message to
    /// `consumer`, in update order.
    async fn poll_once(
        &self,
        consumer: &mut (dyn FnMut(InboundMessage) + Send),
    ) -> TelegramResult<PollOutcome>;
}

/// [`TelegramGateway`] over HTTP.
pub struct HttpGateway {
    config: ConfigHolder,
    client: Client,
    sender: SendPool,
    offset: AtomicI64,
}

impl HttpGateway {
    /// Build the gateway and start its send workers.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn new(config: ConfigHolder) -> TelegramResult<Self> {
        let client = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
        let sender = SendPool::new(SEND_QUEUE_CAPACITY);

        {
            let client = client.clone();
            let config = config.clone();
            sender.spawn_workers(SEND_WORKERS, move |request| {
                let client = client.clone();
                // Read the snapshot at send time, like the rest of the bridge.
                let config = config.get();
                async move { deliver(&client, &config, &request).await }
            });
        }

        Ok(Self {
            config,
            client,
            sender,
            offset: AtomicI64::new(0),
        })
    }

    /// Next update id to ask Telegram for (0 before the first update).
    pub fn offset(&self) -> i64 {
        self.offset.load(Ordering::SeqCst)
    }

    pub fn sender(&self) -> &SendPool {
        &self.sender
    }

    fn enqueue(&self, request: SendRequest) {
        if !self.config.get().has_outbound() {
            return;
        }
        self.sender.submit(request);
    }

    /// Walk a batch of raw updates, advancing the offset past every one.
    fn consume_updates(
        &self,
        chat_id: &str,
        updates: Vec<serde_json::Value>,
        consumer: &mut (dyn FnMut(InboundMessage) + Send),
    ) -> usize {
        let mut delivered = 0;

        for raw in updates {
            let Some(update_id) = raw.get("update_id").and_then(serde_json::Value::as_i64) else {
                warn!("Skipping Telegram update without update_id");
                continue;
            };
            self.offset.fetch_max(update_id.saturating_add(1), Ordering::SeqCst);

            let update: Update = match serde_json::from_value(raw) {
                Ok(update) => update,
                Err(e) => {
                    debug!("Skipping malformed Telegram update {}: {}", update_id, e);
                    continue;
                }
            };

            let Some(message) = update.message else {
                continue;
            };
            if message.chat.id.to_string() != chat_id {
                debug!(
                    "Skipping update {} from foreign chat {}",
                    update.update_id, message.chat.id
                );
                continue;
            }
            let Some(inbound) = message.into_inbound() else {
                continue;
            };

            consumer(inbound);
            delivered += 1;
        }

        delivered
    }
}

#[async_trait]
impl TelegramGateway for HttpGateway {
    fn send_service(&self, text: &str) {
        self.enqueue(SendRequest::service(text));
    }

    fn send_reply(&self, text: &str, reply_message_id: Option<i64>, thread_id: Option<i64>) {
        self.enqueue(SendRequest {
            text: text.to_string(),
            reply_message_id,
            thread_id,
        });
    }

    async fn poll_once(
        &self,
        consumer: &mut (dyn FnMut(InboundMessage) + Send),
    ) -> TelegramResult<PollOutcome> {
        let config = self.config.get();
        if !config.inbound_enabled() {
            return Ok(PollOutcome::Disabled);
        }

        let poll_seconds = config.telegram.inbound.poll_seconds;
        let mut query = vec![
            ("timeout", poll_seconds.to_string()),
            ("allowed_updates", "message".to_string()),
        ];
        let offset = self.offset();
        if offset > 0 {
            query.push(("offset", offset.to_string()));
        }

        let response = self
            .client
            .get(method_url(&config, "getUpdates"))
            .query(&query)
            .timeout(Duration::from_secs(u64::from(poll_seconds)) + POLL_GRACE)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TelegramError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let envelope: UpdatesResponse = serde_json::from_str(&body)?;
        if !envelope.ok {
            return Err(TelegramError::Api {
                description: envelope.description.unwrap_or_else(|| "ok=false".to_string()),
            });
        }

        let delivered = self.consume_updates(&config.telegram.chat_id, envelope.result, consumer);
        Ok(PollOutcome::Polled(delivered))
    }
}

/// `{api_base}/bot{token}/{method}`
fn method_url(config: &Config, method: &str) -> String {
    format!(
        "{}/bot{}/{}",
        config.telegram.api_base.trim_end_matches('/'),
        config.telegram.bot_token,
        method
    )
}

/// Form fields of a `sendMessage` call.
pub fn build_send_form(config: &Config, request: &SendRequest) -> Vec<(&'static str, String)> {
    let markdown = config.telegram.use_markdown_v2;
    let text = if markdown {
        escape_service_aware(&request.text)
    } else {
        request.text.clone()
    };

    let mut form = vec![("chat_id", config.telegram.chat_id.clone()), ("text", text)];
    if markdown {
        form.push(("parse_mode", "MarkdownV2".to_string()));
        form.push(("disable_web_page_preview", "true".to_string()));
    }
    if let Some(reply_id) = request.reply_message_id {
        form.push(("reply_to_message_id", reply_id.to_string()));
        form.push(("allow_sending_without_reply", "true".to_string()));
    }
    if let Some(thread_id) = request.thread_id {
        form.push(("message_thread_id", thread_id.to_string()));
    }
    form
}

/// POST one message. The status is checked, the body is ignored.
async fn deliver(client: &Client, config: &Config, request: &SendRequest) -> TelegramResult<()> {
    if !config.has_outbound() {
        debug!("Outbound disabled since the message was queued, dropping it");
        return Ok(());
    }

    let response = client
        .post(method_url(config, "sendMessage"))
        .timeout(SEND_TIMEOUT)
        .form(&build_send_form(config, request))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(TelegramError::Status {
            status: status.as_u16(),
        });
    }
    Ok(())
}

//! Recording fakes for the game and Telegram sides.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::common::error::TelegramResult;
use crate::common::InboundMessage;
use crate::game::GameBridge;
use crate::telegram::gateway::{PollOutcome, TelegramGateway};

/// Game that remembers every broadcast.
#[derive(Default)]
pub struct RecordingGame {
    broadcasts: Mutex<Vec<String>>,
    online: Vec<String>,
}

impl RecordingGame {
    pub fn with_online(names: &[&str]) -> Self {
        Self {
            broadcasts: Mutex::new(Vec::new()),
            online: names.iter().map(|n| n.to_string()).collect(),
        }
    }

    pub fn broadcasts(&self) -> Vec<String> {
        self.broadcasts.lock().unwrap().clone()
    }
}

impl GameBridge for RecordingGame {
    fn broadcast(&self, message: &str) {
        self.broadcasts.lock().unwrap().push(message.to_string());
    }

    fn online_names(&self) -> Vec<String> {
        self.online.clone()
    }
}

/// Gateway that records outbound messages and serves scripted polls.
#[derive(Default)]
pub struct RecordingGateway {
    services: Mutex<Vec<String>>,
    replies: Mutex<Vec<(String, Option<i64>, Option<i64>)>>,
}

impl RecordingGateway {
    pub fn services(&self) -> Vec<String> {
        self.services.lock().unwrap().clone()
    }

    pub fn replies(&self) -> Vec<(String, Option<i64>, Option<i64>)> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl TelegramGateway for RecordingGateway {
    fn send_service(&self, text: &str) {
        self.services.lock().unwrap().push(text.to_string());
    }

    fn send_reply(&self, text: &str, reply_message_id: Option<i64>, thread_id: Option<i64>) {
        self.replies
            .lock()
            .unwrap()
            .push((text.to_string(), reply_message_id, thread_id));
    }

    async fn poll_once(
        &self,
        _consumer: &mut (dyn FnMut(InboundMessage) + Send),
    ) -> TelegramResult<PollOutcome> {
        Ok(PollOutcome::Disabled)
    }
}

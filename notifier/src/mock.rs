//! Collaborators that record what would have been delivered.

use async_trait::async_trait;
use tokio::sync::Mutex;

use abi::errors::Error;
use abi::model::Platform;

use crate::{PushSender, SmsSender};

#[derive(Debug)]
pub struct RecordingPush {
    platform: Platform,
    failing: Vec<String>,
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingPush {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            failing: Vec::new(),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// sends to these device tokens fail
    pub fn failing_for(mut self, tokens: &[&str]) -> Self {
        self.failing = tokens.iter().map(|t| t.to_string()).collect();
        self
    }

    /// (token, message) pairs in send order
    pub async fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl PushSender for RecordingPush {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn send(&self, token: &str, message: &str, _badge: Option<u32>) -> Result<(), Error> {
        if self.failing.iter().any(|t| t == token) {
            return Err(Error::unavailable("device unreachable"));
        }
        self.sent
            .lock()
            .await
            .push((token.to_string(), message.to_string()));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingSms {
    fail: bool,
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingSms {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// (phone, body) pairs in send order
    pub async fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl SmsSender for RecordingSms {
    async fn send(&self, phone: &str, body: &str) -> Result<(), Error> {
        if self.fail {
            return Err(Error::unavailable("Error calling the Twilio API"));
        }
        self.sent
            .lock()
            .await
            .push((phone.to_string(), body.to_string()));
        Ok(())
    }
}

use async_trait::async_trait;
use reqwest::header;
use serde::{Deserialize, Serialize};

use abi::config::GcmConfig;
use abi::errors::Error;
use abi::model::Platform;

use crate::PushSender;

#[derive(Debug, Serialize)]
struct GcmData<'a> {
    title: &'a str,
    message: &'a str,
}

#[derive(Debug, Serialize)]
struct GcmRequest<'a> {
    to: &'a str,
    data: GcmData<'a>,
}

#[derive(Debug, Default, Deserialize)]
struct GcmResponse {
    #[serde(default)]
    failure: u32,
}

/// Android push through the legacy GCM http endpoint. The product name is the title.
#[derive(Debug)]
pub struct GcmClient {
    config: GcmConfig,
    title: String,
    client: reqwest::Client,
}

impl GcmClient {
    pub fn new(config: GcmConfig, title: impl Into<String>) -> Self {
        Self {
            config,
            title: title.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl PushSender for GcmClient {
    fn platform(&self) -> Platform {
        Platform::Gcm
    }

    // gcm has no badge
    async fn send(&self, token: &str, message: &str, _badge: Option<u32>) -> Result<(), Error> {
        let request = GcmRequest {
            to: token,
            data: GcmData {
                title: &self.title,
                message,
            },
        };
        let resp = self
            .client
            .post(&self.config.endpoint)
            .header(
                header::AUTHORIZATION,
                format!("key={}", self.config.server_key),
            )
            .json(&request)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::unavailable(format!(
                "gcm rejected push: {}",
                resp.status()
            )));
        }
        let result: GcmResponse = resp.json().await.unwrap_or_default();
        if result.failure > 0 {
            return Err(Error::unavailable("gcm reported a failed delivery"));
        }
        Ok(())
    }
}

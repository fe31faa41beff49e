use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::debug;

use abi::config::ApnsConfig;
use abi::errors::{Error, ErrorKind};
use abi::model::Platform;

use crate::PushSender;

/// provider tokens are accepted for an hour; mint a new one a little earlier
const TOKEN_TTL_SECS: i64 = 50 * 60;

#[derive(Debug, Serialize)]
struct ProviderClaims<'a> {
    iss: &'a str,
    iat: i64,
}

/// Apple push over HTTP/2 with token based authentication.
#[derive(Debug)]
pub struct ApnsClient {
    config: ApnsConfig,
    client: reqwest::Client,
    token: Mutex<Option<(String, i64)>>,
}

impl ApnsClient {
    pub fn new(config: ApnsConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder().http2_prior_knowledge().build()?;
        Ok(Self {
            config,
            client,
            token: Mutex::new(None),
        })
    }

    async fn provider_token(&self) -> Result<String, Error> {
        let now = chrono::Utc::now().timestamp();
        let mut cached = self.token.lock().await;
        if let Some((token, iat)) = cached.as_ref() {
            if now - iat < TOKEN_TTL_SECS {
                return Ok(token.clone());
            }
        }

        let pem = tokio::fs::read(&self.config.key_path).await?;
        let key = EncodingKey::from_ec_pem(&pem)?;
        let mut header = Header::new(Algorithm::ES256);
        header.kid = Some(self.config.key_id.clone());
        let claims = ProviderClaims {
            iss: &self.config.team_id,
            iat: now,
        };
        let token = encode(&header, &claims, &key)?;
        debug!("minted apns provider token");
        *cached = Some((token.clone(), now));
        Ok(token)
    }
}

#[async_trait]
impl PushSender for ApnsClient {
    fn platform(&self) -> Platform {
        Platform::Apns
    }

    async fn send(&self, token: &str, message: &str, badge: Option<u32>) -> Result<(), Error> {
        let mut aps = json!({ "alert": message });
        if let Some(badge) = badge {
            aps["badge"] = json!(badge);
        }
        let url = format!(
            "{}/3/device/{}",
            self.config.endpoint.trim_end_matches('/'),
            token
        );
        let resp = self
            .client
            .post(url)
            .bearer_auth(self.provider_token().await?)
            .header("apns-topic", &self.config.topic)
            .header("apns-push-type", "alert")
            .json(&json!({ "aps": aps }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::with_details(
                ErrorKind::Unavailable,
                format!("apns rejected push ({}): {}", status, body),
            ));
        }
        Ok(())
    }
}

use async_trait::async_trait;
use tracing::debug;

use abi::config::SmsConfig;
use abi::errors::{Error, ErrorKind};

use crate::SmsSender;

/// Twilio's Messages resource.
#[derive(Debug)]
pub struct TwilioClient {
    config: SmsConfig,
    client: reqwest::Client,
}

impl TwilioClient {
    pub fn new(config: SmsConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/Accounts/{}/Messages.json",
            self.config.api_base.trim_end_matches('/'),
            self.config.account
        )
    }
}

#[async_trait]
impl SmsSender for TwilioClient {
    async fn send(&self, phone: &str, body: &str) -> Result<(), Error> {
        let params = [
            ("To", phone),
            ("From", self.config.from.as_str()),
            ("Body", body),
        ];
        let resp = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account, Some(&self.config.token))
            .form(&params)
            .send()
            .await
            .map_err(|e| Error::new(ErrorKind::Unavailable, "Error calling the Twilio API", e))?;

        if !resp.status().is_success() {
            return Err(Error::unavailable(format!(
                "Error calling the Twilio API: {}",
                resp.status()
            )));
        }
        debug!("sms sent to {}", phone);
        Ok(())
    }
}

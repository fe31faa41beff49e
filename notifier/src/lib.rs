use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use abi::config::{Config, ProductConfig};
use abi::errors::Error;
use abi::model::{NotificationIntent, NotifyOptions, Platform};
use db::DbRepo;

mod apns;
mod gcm;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod sms;
pub mod template;

pub use apns::ApnsClient;
pub use gcm::GcmClient;
pub use sms::TwilioClient;

/// badge shown on ios for every push
const PUSH_BADGE: u32 = 1;

/// Delivers one message to one device of a single platform.
#[async_trait]
pub trait PushSender: Send + Sync + Debug {
    fn platform(&self) -> Platform;

    async fn send(&self, token: &str, message: &str, badge: Option<u32>) -> Result<(), Error>;
}

/// Texts a phone number. A non-success answer is an `Unavailable` error.
#[async_trait]
pub trait SmsSender: Send + Sync + Debug {
    async fn send(&self, phone: &str, body: &str) -> Result<(), Error>;
}

/// Routes a message to push devices and, for identities without an app
/// account, to sms.
#[derive(Debug, Clone)]
pub struct Notifier {
    product: ProductConfig,
    db: DbRepo,
    push: HashMap<Platform, Arc<dyn PushSender>>,
    sms: Arc<dyn SmsSender>,
}

impl Notifier {
    pub fn new(
        product: ProductConfig,
        db: DbRepo,
        push: Vec<Arc<dyn PushSender>>,
        sms: Arc<dyn SmsSender>,
    ) -> Self {
        let push = push
            .into_iter()
            .map(|sender| (sender.platform(), sender))
            .collect();
        Self {
            product,
            db,
            push,
            sms,
        }
    }

    /// apns, gcm and twilio as configured
    pub fn from_config(config: &Config, db: DbRepo) -> Result<Self, Error> {
        let apns: Arc<dyn PushSender> = Arc::new(ApnsClient::new(config.push.apns.clone())?);
        let gcm: Arc<dyn PushSender> = Arc::new(GcmClient::new(
            config.push.gcm.clone(),
            config.product.name.clone(),
        ));
        let sms = Arc::new(TwilioClient::new(config.sms.clone()));
        Ok(Self::new(config.product.clone(), db, vec![apns, gcm], sms))
    }

    pub fn product(&self) -> &ProductConfig {
        &self.product
    }

    /// the sms collaborator, for texts that bypass routing such as login codes
    pub fn sms(&self) -> &Arc<dyn SmsSender> {
        &self.sms
    }

    pub async fn dispatch(&self, intent: &NotificationIntent) -> Result<(), Error> {
        self.notify(&intent.recipients, &intent.message, &intent.options)
            .await
    }

    pub async fn notify(
        &self,
        recipients: &[String],
        message: &str,
        options: &NotifyOptions,
    ) -> Result<(), Error> {
        if recipients.is_empty() {
            return Ok(());
        }

        self.push_all(recipients, message).await?;

        if !options.allow_sms {
            return Ok(());
        }

        let phones = self.db.user.sms_audience(recipients).await?;
        if phones.is_empty() {
            return Ok(());
        }

        let body = self.sms_body(message, options).await?;
        for phone in phones {
            self.sms.send(&phone, &body).await?;
        }
        Ok(())
    }

    /// every active device of every recipient gets the message as is;
    /// a failing device is logged and skipped
    async fn push_all(&self, recipients: &[String], message: &str) -> Result<(), Error> {
        let devices = self.db.device.list_for_users(recipients).await?;
        for device in devices {
            let Some(sender) = self.push.get(&device.platform) else {
                warn!("no push sender for platform {}", device.platform);
                continue;
            };
            match sender
                .send(&device.registration_id, message, Some(PUSH_BADGE))
                .await
            {
                Ok(()) => debug!("pushed to {} device {}", device.platform, device.id),
                Err(err) => warn!(
                    "push to {} device {} failed: {}",
                    device.platform, device.id, err
                ),
            }
        }
        Ok(())
    }

    async fn sms_body(&self, message: &str, options: &NotifyOptions) -> Result<String, Error> {
        if let (Some(event_id), Some(from)) = (&options.related_event, &options.from_identity) {
            let link = self.db.event.get_or_create_link(event_id, &from.id).await?;
            let url = template::share_link(&self.product, &link.link_id);
            return Ok(template::shared_plans(from, &url));
        }
        if options.added_friend {
            return Ok(template::added_friend_sms(&self.product, message));
        }
        Ok(template::with_download_footer(&self.product, message))
    }
}

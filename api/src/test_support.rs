use std::sync::Arc;

use abi::config::Config;
use abi::model::{Device, DeviceRegister, Platform, SocialProfile, User};
use db::DbRepo;
use notifier::mock::{RecordingPush, RecordingSms};
use notifier::Notifier;

use crate::api_utils::custom_extract::gen_token;
use crate::api_utils::social::fake::FakeSocialGraph;
use crate::AppState;

/// App state over memory storage with recording collaborators.
pub struct TestApp {
    pub state: AppState,
    pub apns: Arc<RecordingPush>,
    pub sms: Arc<RecordingSms>,
}

pub fn fb_profile() -> SocialProfile {
    SocialProfile {
        id: "10101".to_string(),
        name: "Alan Turing".to_string(),
        first_name: Some("Alan".to_string()),
        last_name: Some("Turing".to_string()),
        email: Some("alan@example.com".to_string()),
        image_url: Some("https://graph.facebook.com/v2.2/10101/picture".to_string()),
    }
}

fn friend_profile() -> SocialProfile {
    SocialProfile {
        id: "20202".to_string(),
        name: "Grace Hopper".to_string(),
        ..Default::default()
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(RecordingSms::default())
    }

    pub fn with_failing_sms() -> Self {
        Self::build(RecordingSms::failing())
    }

    fn build(sms: RecordingSms) -> Self {
        let config = Config::load("../abi/fixtures/config.yml").unwrap();
        let db = DbRepo::memory();
        let apns = Arc::new(RecordingPush::new(Platform::Apns));
        let gcm = Arc::new(RecordingPush::new(Platform::Gcm));
        let sms = Arc::new(sms);
        let notifier = Notifier::new(
            config.product.clone(),
            db.clone(),
            vec![apns.clone(), gcm],
            sms.clone(),
        );
        let social = FakeSocialGraph::default()
            .with_profile("fb-token", fb_profile())
            .with_profile("friend-token", friend_profile())
            .with_friends("fb-token", &["20202", "30303"]);
        let state = AppState::from_parts(
            &config.server,
            db,
            cache::memory(),
            notifier,
            Arc::new(social),
        );
        Self { state, apns, sms }
    }

    /// an identity that finished signup
    pub async fn member(&self, name: &str, username: &str) -> User {
        let mut user = User::new(Some(name.to_string()));
        user.username = Some(username.to_string());
        self.state.db.user.create_user(&user).await.unwrap()
    }

    /// a contact-imported identity: phone, no username
    pub async fn shadow(&self, name: &str, phone: &str) -> User {
        self.state
            .db
            .user
            .create_user_with_phone(&User::new(Some(name.to_string())), phone)
            .await
            .unwrap()
    }

    pub async fn register_device(&self, user_id: &str, token: &str) -> Device {
        let register = DeviceRegister {
            registration_id: token.to_string(),
            device_id: None,
            name: None,
        };
        let device = Device::new(user_id, Platform::Apns, register);
        self.state.db.device.upsert(&device).await.unwrap().0
    }

    pub fn token(&self, user_id: &str) -> String {
        gen_token(user_id, &self.state.jwt_secret, 30).unwrap()
    }
}

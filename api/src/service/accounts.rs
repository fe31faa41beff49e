use std::sync::Arc;

use rand::Rng;
use serde_json::Value;
use tracing::{debug, info};

use abi::errors::Error;
use abi::model::{
    Contact, SessionResponse, SocialAccount, SocialProfile, SocialProvider, User, UserUpdate,
    UserWithPhone,
};
use cache::Cache;
use db::DbRepo;
use notifier::{template, Notifier};

use crate::api_utils::custom_extract::gen_token;
use crate::api_utils::social::SocialGraph;

const ACCESS_TOKEN_KEY: &str = "access_token";

/// Phone and social login, account linking and contact import.
#[derive(Debug, Clone)]
pub struct Accounts {
    db: DbRepo,
    cache: Arc<dyn Cache>,
    notifier: Notifier,
    social: Arc<dyn SocialGraph>,
    jwt_secret: String,
    token_days: i64,
}

/// four digits, never a leading zero
fn gen_auth_code() -> String {
    rand::thread_rng().gen_range(1000..10000).to_string()
}

/// the provider profile as stored, with the last token used
fn profile_json(profile: &SocialProfile, access_token: &str) -> Result<Value, Error> {
    let mut value = serde_json::to_value(profile)?;
    if let Value::Object(map) = &mut value {
        map.insert(ACCESS_TOKEN_KEY.to_string(), Value::from(access_token));
    }
    Ok(value)
}

impl Accounts {
    pub fn new(
        db: DbRepo,
        cache: Arc<dyn Cache>,
        notifier: Notifier,
        social: Arc<dyn SocialGraph>,
        jwt_secret: String,
        token_days: i64,
    ) -> Self {
        Self {
            db,
            cache,
            notifier,
            social,
            jwt_secret,
            token_days,
        }
    }

    pub fn session(&self, user: User) -> Result<SessionResponse, Error> {
        let authtoken = gen_token(&user.id, &self.jwt_secret, self.token_days)?;
        Ok(SessionResponse { user, authtoken })
    }

    /// Texts a fresh login code, replacing any earlier one for this phone.
    pub async fn send_auth_code(&self, phone: &str) -> Result<(), Error> {
        let code = gen_auth_code();
        self.cache.save_auth_code(phone, &code).await?;
        let body = template::auth_code(self.notifier.product(), &code);
        self.notifier.sms().send(phone, &body).await?;
        debug!("auth code sent to {}", phone);
        Ok(())
    }

    /// Exchanges a valid code for a session. The first login with a phone
    /// creates a blank identity for it.
    pub async fn login_with_code(&self, phone: &str, code: &str) -> Result<SessionResponse, Error> {
        match self.cache.get_auth_code(phone).await? {
            Some(saved) if saved == code => {}
            _ => return Err(Error::unauthorized_with_details("invalid auth code")),
        }

        let user = match self.db.user.get_phone(phone).await? {
            Some(linked) => self.user(&linked.user_id).await?,
            None => {
                let user = self
                    .db
                    .user
                    .create_user_with_phone(&User::new(None), phone)
                    .await?;
                info!("new identity {} for phone login", user.id);
                user
            }
        };

        self.cache.del_auth_code(phone).await?;
        self.session(user)
    }

    pub async fn login_with_facebook(&self, access_token: &str) -> Result<SessionResponse, Error> {
        let profile = self.social.profile(access_token).await?;
        let existing = self
            .db
            .user
            .get_social_account_by_uid(SocialProvider::Facebook, &profile.id)
            .await?;

        let user = match existing {
            Some(account) => {
                self.db
                    .user
                    .update_social_profile(&account.id, &profile_json(&profile, access_token)?)
                    .await?;
                self.user(&account.user_id).await?
            }
            None => {
                let mut user = User::new(Some(profile.name.clone()));
                user.first_name = profile.first_name.clone();
                user.last_name = profile.last_name.clone();
                user.email = profile.email.clone();
                user.image_url = profile.image_url.clone();
                let user = self.db.user.create_user(&user).await?;
                self.link_facebook(&user.id, &profile, access_token).await?;
                info!("new identity {} from facebook", user.id);
                user
            }
        };
        self.session(user)
    }

    /// Links a facebook account to the caller. When that account already
    /// belongs to someone else the caller is folded into them.
    pub async fn sync_social_account(
        &self,
        caller: &str,
        access_token: &str,
    ) -> Result<SessionResponse, Error> {
        if let Some(account) = self
            .db
            .user
            .get_social_account_by_user(caller, SocialProvider::Facebook)
            .await?
        {
            let mut profile = account.profile.clone();
            if let Value::Object(map) = &mut profile {
                map.insert(ACCESS_TOKEN_KEY.to_string(), Value::from(access_token));
            }
            self.db
                .user
                .update_social_profile(&account.id, &profile)
                .await?;
            return self.session(self.user(caller).await?);
        }

        let profile = self.social.profile(access_token).await?;
        if let Some(account) = self
            .db
            .user
            .get_social_account_by_uid(SocialProvider::Facebook, &profile.id)
            .await?
        {
            info!("merging {} into {}", caller, account.user_id);
            self.db.user.merge_shadow(caller, &account.user_id).await?;
            return self.session(self.user(&account.user_id).await?);
        }

        let update = UserUpdate {
            name: Some(profile.name.clone()),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            email: profile.email.clone(),
            image_url: profile.image_url.clone(),
            ..Default::default()
        };
        let user = self.db.user.update_user(caller, &update).await?;
        self.link_facebook(caller, &profile, access_token).await?;
        self.session(user)
    }

    /// the caller's facebook friends who have an account here
    pub async fn facebook_friends(&self, caller: &str) -> Result<Vec<User>, Error> {
        let account = self
            .db
            .user
            .get_social_account_by_user(caller, SocialProvider::Facebook)
            .await?
            .ok_or_else(|| Error::bad_request("no facebook account linked"))?;
        let token = account
            .profile
            .get(ACCESS_TOKEN_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| Error::bad_request("no facebook token stored"))?;

        let uids = self.social.friend_uids(token).await?;
        let mut ids = Vec::with_capacity(uids.len());
        for uid in &uids {
            if let Some(friend) = self
                .db
                .user
                .get_social_account_by_uid(SocialProvider::Facebook, uid)
                .await?
            {
                ids.push(friend.user_id);
            }
        }
        self.db.user.get_users_by_ids(&ids).await
    }

    pub async fn import_contacts(
        &self,
        owner: &str,
        contacts: &[Contact],
    ) -> Result<Vec<UserWithPhone>, Error> {
        let imported = self.db.user.import_contacts(owner, contacts).await?;
        debug!("{} imported {} contacts", owner, imported.len());
        Ok(imported)
    }

    async fn link_facebook(
        &self,
        user_id: &str,
        profile: &SocialProfile,
        access_token: &str,
    ) -> Result<SocialAccount, Error> {
        let account = SocialAccount {
            id: nanoid::nanoid!(),
            user_id: user_id.to_string(),
            provider: SocialProvider::Facebook,
            uid: profile.id.clone(),
            profile: profile_json(profile, access_token)?,
            create_time: chrono::Utc::now().timestamp_millis(),
        };
        self.db.user.create_social_account(&account).await
    }

    async fn user(&self, id: &str) -> Result<User, Error> {
        self.db
            .user
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found_with_details(format!("user {id} not found")))
    }
}

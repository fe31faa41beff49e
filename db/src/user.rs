use std::fmt::Debug;

use async_trait::async_trait;

use abi::errors::Result;
use abi::model::{
    Contact, SocialAccount, SocialProvider, User, UserPhone, UserUpdate, UserWithPhone,
};

#[async_trait]
pub trait UserRepo: Sync + Send + Debug {
    async fn create_user(&self, user: &User) -> Result<User>;

    /// create an identity together with its phone link
    async fn create_user_with_phone(&self, user: &User, phone: &str) -> Result<User>;

    async fn get_user_by_id(&self, id: &str) -> Result<Option<User>>;

    async fn get_users_by_ids(&self, ids: &[String]) -> Result<Vec<User>>;

    /// case-insensitive
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// only the fields present in `update` change; a taken username is a Conflict
    async fn update_user(&self, id: &str, update: &UserUpdate) -> Result<User>;

    async fn add_points(&self, user_id: &str, delta: i32) -> Result<()>;

    async fn get_phone(&self, phone: &str) -> Result<Option<UserPhone>>;

    async fn create_phone(&self, user_id: &str, phone: &str) -> Result<UserPhone>;

    async fn phones_of(&self, user_ids: &[String]) -> Result<Vec<UserPhone>>;

    /// phones of the given identities that never picked a username
    async fn sms_audience(&self, user_ids: &[String]) -> Result<Vec<String>>;

    async fn get_social_account_by_uid(
        &self,
        provider: SocialProvider,
        uid: &str,
    ) -> Result<Option<SocialAccount>>;

    async fn get_social_account_by_user(
        &self,
        user_id: &str,
        provider: SocialProvider,
    ) -> Result<Option<SocialAccount>>;

    async fn create_social_account(&self, account: &SocialAccount) -> Result<SocialAccount>;

    async fn update_social_profile(&self, id: &str, profile: &serde_json::Value) -> Result<()>;

    /// move the shadow's phones onto `into_id` and delete the shadow
    async fn merge_shadow(&self, shadow_id: &str, into_id: &str) -> Result<()>;

    /// rename phone-named identities and create shadows for unknown numbers,
    /// returning every submitted phone with its identity
    async fn import_contacts(&self, owner: &str, contacts: &[Contact])
        -> Result<Vec<UserWithPhone>>;
}

use std::collections::HashMap;

use async_trait::async_trait;

use abi::errors::{Error, Result};
use abi::model::{
    Contact, SocialAccount, SocialProvider, User, UserPhone, UserUpdate, UserWithPhone,
};
use abi::utils::looks_like_phone;

use super::{MemoryDb, Tables};
use crate::user::UserRepo;

fn username_taken(tables: &Tables, username: &str, except: &str) -> bool {
    tables.users.iter().any(|u| {
        u.id != except
            && u.username
                .as_deref()
                .is_some_and(|name| name.eq_ignore_ascii_case(username))
    })
}

fn insert_user(tables: &mut Tables, user: &User) -> Result<User> {
    if tables.user(&user.id).is_some() {
        return Err(Error::conflict("user id already exists"));
    }
    if let Some(username) = &user.username {
        if username_taken(tables, username, &user.id) {
            return Err(Error::conflict("username already taken"));
        }
    }
    let now = chrono::Utc::now().timestamp_millis();
    let mut user = user.clone();
    user.create_time = now;
    user.update_time = now;
    tables.users.push(user.clone());
    Ok(user)
}

fn insert_phone(tables: &mut Tables, user_id: &str, phone: &str) -> Result<UserPhone> {
    if tables.phones.iter().any(|p| p.phone == phone) {
        return Err(Error::conflict("phone already linked"));
    }
    if tables.user(user_id).is_none() {
        return Err(Error::not_found_with_details("user not found"));
    }
    let phone = UserPhone {
        id: nanoid::nanoid!(),
        user_id: user_id.to_string(),
        phone: phone.to_string(),
    };
    tables.phones.push(phone.clone());
    Ok(phone)
}

#[async_trait]
impl UserRepo for MemoryDb {
    async fn create_user(&self, user: &User) -> Result<User> {
        let mut tables = self.tables.lock().await;
        insert_user(&mut tables, user)
    }

    async fn create_user_with_phone(&self, user: &User, phone: &str) -> Result<User> {
        let mut tables = self.tables.lock().await;
        if tables.phones.iter().any(|p| p.phone == phone) {
            return Err(Error::conflict("phone already linked"));
        }
        let user = insert_user(&mut tables, user)?;
        insert_phone(&mut tables, &user.id, phone)?;
        Ok(user)
    }

    async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.tables.lock().await.user(id).cloned())
    }

    async fn get_users_by_ids(&self, ids: &[String]) -> Result<Vec<User>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .find(|u| {
                u.username
                    .as_deref()
                    .is_some_and(|name| name.eq_ignore_ascii_case(username))
            })
            .cloned())
    }

    async fn update_user(&self, id: &str, update: &UserUpdate) -> Result<User> {
        let mut tables = self.tables.lock().await;
        if let Some(username) = &update.username {
            if username_taken(&tables, username, id) {
                return Err(Error::conflict("username already taken"));
            }
        }
        let user = tables.user_mut(id).ok_or_else(Error::not_found)?;
        if let Some(name) = &update.name {
            user.name = Some(name.clone());
        }
        if let Some(first_name) = &update.first_name {
            user.first_name = Some(first_name.clone());
        }
        if let Some(last_name) = &update.last_name {
            user.last_name = Some(last_name.clone());
        }
        if let Some(email) = &update.email {
            user.email = Some(email.clone());
        }
        if let Some(username) = &update.username {
            user.username = Some(username.clone());
        }
        if let Some(image_url) = &update.image_url {
            user.image_url = Some(image_url.clone());
        }
        if update.location.is_some() {
            user.location = update.location;
        }
        user.update_time = chrono::Utc::now().timestamp_millis();
        Ok(user.clone())
    }

    async fn add_points(&self, user_id: &str, delta: i32) -> Result<()> {
        let mut tables = self.tables.lock().await;
        if let Some(user) = tables.user_mut(user_id) {
            user.points += delta;
        }
        Ok(())
    }

    async fn get_phone(&self, phone: &str) -> Result<Option<UserPhone>> {
        let tables = self.tables.lock().await;
        Ok(tables.phones.iter().find(|p| p.phone == phone).cloned())
    }

    async fn create_phone(&self, user_id: &str, phone: &str) -> Result<UserPhone> {
        let mut tables = self.tables.lock().await;
        insert_phone(&mut tables, user_id, phone)
    }

    async fn phones_of(&self, user_ids: &[String]) -> Result<Vec<UserPhone>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .phones
            .iter()
            .filter(|p| user_ids.contains(&p.user_id))
            .cloned()
            .collect())
    }

    async fn sms_audience(&self, user_ids: &[String]) -> Result<Vec<String>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .phones
            .iter()
            .filter(|p| user_ids.contains(&p.user_id))
            .filter(|p| tables.user(&p.user_id).is_some_and(User::is_shadow))
            .map(|p| p.phone.clone())
            .collect())
    }

    async fn get_social_account_by_uid(
        &self,
        provider: SocialProvider,
        uid: &str,
    ) -> Result<Option<SocialAccount>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .social_accounts
            .iter()
            .find(|a| a.provider == provider && a.uid == uid)
            .cloned())
    }

    async fn get_social_account_by_user(
        &self,
        user_id: &str,
        provider: SocialProvider,
    ) -> Result<Option<SocialAccount>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .social_accounts
            .iter()
            .find(|a| a.provider == provider && a.user_id == user_id)
            .cloned())
    }

    async fn create_social_account(&self, account: &SocialAccount) -> Result<SocialAccount> {
        let mut tables = self.tables.lock().await;
        if tables
            .social_accounts
            .iter()
            .any(|a| a.provider == account.provider && a.uid == account.uid)
        {
            return Err(Error::conflict("social account already linked"));
        }
        tables.social_accounts.push(account.clone());
        Ok(account.clone())
    }

    async fn update_social_profile(&self, id: &str, profile: &serde_json::Value) -> Result<()> {
        let mut tables = self.tables.lock().await;
        let account = tables
            .social_accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| Error::not_found_with_details("social account not found"))?;
        account.profile = profile.clone();
        Ok(())
    }

    async fn merge_shadow(&self, shadow_id: &str, into_id: &str) -> Result<()> {
        let mut tables = self.tables.lock().await;
        for phone in tables.phones.iter_mut().filter(|p| p.user_id == shadow_id) {
            phone.user_id = into_id.to_string();
        }
        tables.delete_user(shadow_id);
        Ok(())
    }

    async fn import_contacts(
        &self,
        _owner: &str,
        contacts: &[Contact],
    ) -> Result<Vec<UserWithPhone>> {
        // a repeated phone keeps the last name submitted for it
        let names: HashMap<&str, &str> = contacts
            .iter()
            .map(|c| (c.phone.as_str(), c.name.as_str()))
            .collect();

        let mut tables = self.tables.lock().await;
        let mut result = Vec::with_capacity(names.len());
        let mut seen: Vec<&str> = Vec::with_capacity(names.len());
        // output follows the position where each phone first appears
        for contact in contacts {
            let phone = contact.phone.as_str();
            if seen.contains(&phone) {
                continue;
            }
            seen.push(phone);
            let name = names[phone];

            let linked = tables
                .phones
                .iter()
                .find(|p| p.phone == phone)
                .map(|p| p.user_id.clone());
            let user = match linked {
                Some(user_id) => {
                    let user = tables.user_mut(&user_id).ok_or_else(Error::not_found)?;
                    if looks_like_phone(user.name.as_deref()) {
                        user.name = Some(name.to_string());
                        user.update_time = chrono::Utc::now().timestamp_millis();
                    }
                    user.clone()
                }
                None => {
                    let user = insert_user(&mut tables, &User::new(Some(name.to_string())))?;
                    insert_phone(&mut tables, &user.id, phone)?;
                    user
                }
            };
            result.push(UserWithPhone {
                user,
                phone: phone.to_string(),
            });
        }
        Ok(result)
    }
}

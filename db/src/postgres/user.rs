use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::QueryAs;
use sqlx::{FromRow, PgPool, Postgres, Row};
use tracing::debug;

use abi::errors::{Error, Result};
use abi::model::{
    Contact, SocialAccount, SocialProvider, User, UserPhone, UserUpdate, UserWithPhone,
};
use abi::utils::looks_like_phone;

use crate::user::UserRepo;

#[derive(Debug)]
pub struct PostgresUser {
    pool: PgPool,
}

impl PostgresUser {
    pub fn new(pool: PgPool) -> Self {
        PostgresUser { pool }
    }
}

const INSERT_USER: &str = "INSERT INTO users
        (id, name, first_name, last_name, email, image_url, username, lat, lng, points, create_time, update_time)
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
     RETURNING *";

const INSERT_PHONE: &str =
    "INSERT INTO user_phones (id, user_id, phone) VALUES ($1, $2, $3) RETURNING *";

fn insert_user(user: &User) -> QueryAs<'_, Postgres, User, PgArguments> {
    let now = chrono::Utc::now().timestamp_millis();
    sqlx::query_as(INSERT_USER)
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.image_url)
        .bind(&user.username)
        .bind(user.location.map(|l| l.lat))
        .bind(user.location.map(|l| l.lng))
        .bind(user.points)
        .bind(now)
}

fn user_with_phone(row: &PgRow) -> std::result::Result<UserWithPhone, sqlx::Error> {
    Ok(UserWithPhone {
        user: User::from_row(row)?,
        phone: row.try_get("phone")?,
    })
}

#[async_trait]
impl UserRepo for PostgresUser {
    async fn create_user(&self, user: &User) -> Result<User> {
        let user = insert_user(user).fetch_one(&self.pool).await?;
        Ok(user)
    }

    async fn create_user_with_phone(&self, user: &User, phone: &str) -> Result<User> {
        let mut tx = self.pool.begin().await?;
        let user: User = insert_user(user).fetch_one(&mut *tx).await?;
        sqlx::query(INSERT_PHONE)
            .bind(nanoid::nanoid!())
            .bind(&user.id)
            .bind(phone)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(user)
    }

    async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn get_users_by_ids(&self, ids: &[String]) -> Result<Vec<User>> {
        let users = sqlx::query_as("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as("SELECT * FROM users WHERE LOWER(username) = LOWER($1)")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_user(&self, id: &str, update: &UserUpdate) -> Result<User> {
        let user = sqlx::query_as(
            "UPDATE users SET
            name = COALESCE($2, name),
            first_name = COALESCE($3, first_name),
            last_name = COALESCE($4, last_name),
            username = COALESCE($5, username),
            image_url = COALESCE($6, image_url),
            lat = COALESCE($7, lat),
            lng = COALESCE($8, lng),
            email = COALESCE($9, email),
            update_time = $10
            WHERE id = $1
            RETURNING *",
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.username)
        .bind(&update.image_url)
        .bind(update.location.map(|l| l.lat))
        .bind(update.location.map(|l| l.lng))
        .bind(&update.email)
        .bind(chrono::Utc::now().timestamp_millis())
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn add_points(&self, user_id: &str, delta: i32) -> Result<()> {
        sqlx::query("UPDATE users SET points = points + $2 WHERE id = $1")
            .bind(user_id)
            .bind(delta)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_phone(&self, phone: &str) -> Result<Option<UserPhone>> {
        let phone = sqlx::query_as("SELECT * FROM user_phones WHERE phone = $1")
            .bind(phone)
            .fetch_optional(&self.pool)
            .await?;
        Ok(phone)
    }

    async fn create_phone(&self, user_id: &str, phone: &str) -> Result<UserPhone> {
        let phone = sqlx::query_as(INSERT_PHONE)
            .bind(nanoid::nanoid!())
            .bind(user_id)
            .bind(phone)
            .fetch_one(&self.pool)
            .await?;
        Ok(phone)
    }

    async fn phones_of(&self, user_ids: &[String]) -> Result<Vec<UserPhone>> {
        let phones = sqlx::query_as("SELECT * FROM user_phones WHERE user_id = ANY($1)")
            .bind(user_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(phones)
    }

    async fn sms_audience(&self, user_ids: &[String]) -> Result<Vec<String>> {
        let phones: Vec<(String,)> = sqlx::query_as(
            "SELECT p.phone FROM user_phones AS p
             JOIN users AS u ON p.user_id = u.id
             WHERE p.user_id = ANY($1) AND u.username IS NULL",
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(phones.into_iter().map(|(phone,)| phone).collect())
    }

    async fn get_social_account_by_uid(
        &self,
        provider: SocialProvider,
        uid: &str,
    ) -> Result<Option<SocialAccount>> {
        let account =
            sqlx::query_as("SELECT * FROM social_accounts WHERE provider = $1 AND uid = $2")
                .bind(provider as i16)
                .bind(uid)
                .fetch_optional(&self.pool)
                .await?;
        Ok(account)
    }

    async fn get_social_account_by_user(
        &self,
        user_id: &str,
        provider: SocialProvider,
    ) -> Result<Option<SocialAccount>> {
        let account =
            sqlx::query_as("SELECT * FROM social_accounts WHERE user_id = $1 AND provider = $2")
                .bind(user_id)
                .bind(provider as i16)
                .fetch_optional(&self.pool)
                .await?;
        Ok(account)
    }

    async fn create_social_account(&self, account: &SocialAccount) -> Result<SocialAccount> {
        let account = sqlx::query_as(
            "INSERT INTO social_accounts (id, user_id, provider, uid, profile, create_time)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(&account.id)
        .bind(&account.user_id)
        .bind(account.provider as i16)
        .bind(&account.uid)
        .bind(&account.profile)
        .bind(account.create_time)
        .fetch_one(&self.pool)
        .await?;
        Ok(account)
    }

    async fn update_social_profile(&self, id: &str, profile: &serde_json::Value) -> Result<()> {
        let result = sqlx::query("UPDATE social_accounts SET profile = $2 WHERE id = $1")
            .bind(id)
            .bind(profile)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found_with_details("social account not found"));
        }
        Ok(())
    }

    async fn merge_shadow(&self, shadow_id: &str, into_id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE user_phones SET user_id = $2 WHERE user_id = $1")
            .bind(shadow_id)
            .bind(into_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(shadow_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        debug!("merged identity {} into {}", shadow_id, into_id);
        Ok(())
    }

    async fn import_contacts(
        &self,
        owner: &str,
        contacts: &[Contact],
    ) -> Result<Vec<UserWithPhone>> {
        // a repeated phone keeps the last name submitted for it
        let names: HashMap<&str, &str> = contacts
            .iter()
            .map(|c| (c.phone.as_str(), c.name.as_str()))
            .collect();
        let phones: Vec<String> = names.keys().map(|p| p.to_string()).collect();

        let mut tx = self.pool.begin().await?;
        let rows = sqlx::query(
            "SELECT u.*, p.phone FROM user_phones AS p
             JOIN users AS u ON p.user_id = u.id
             WHERE p.phone = ANY($1)",
        )
        .bind(&phones)
        .fetch_all(&mut *tx)
        .await?;

        let mut result = Vec::with_capacity(names.len());
        for row in rows {
            let mut pair = user_with_phone(&row)?;
            if looks_like_phone(pair.user.name.as_deref()) {
                let name = names[pair.phone.as_str()];
                pair.user = sqlx::query_as(
                    "UPDATE users SET name = $2, update_time = $3 WHERE id = $1 RETURNING *",
                )
                .bind(&pair.user.id)
                .bind(name)
                .bind(chrono::Utc::now().timestamp_millis())
                .fetch_one(&mut *tx)
                .await?;
            }
            result.push(pair);
        }

        for phone in phones {
            if result.iter().any(|pair| pair.phone == phone) {
                continue;
            }
            let shadow = User::new(Some(names[phone.as_str()].to_string()));
            let user: User = insert_user(&shadow).fetch_one(&mut *tx).await?;
            sqlx::query(INSERT_PHONE)
                .bind(nanoid::nanoid!())
                .bind(&user.id)
                .bind(&phone)
                .execute(&mut *tx)
                .await?;
            result.push(UserWithPhone { user, phone });
        }
        tx.commit().await?;

        debug!("{} imported {} contacts", owner, result.len());
        Ok(result)
    }
}

use async_trait::async_trait;
use sqlx::PgPool;

use abi::errors::Result;
use abi::model::{Event, Invitation, LinkInvitation, SavedEvent, EVENT_TTL_MS};

use crate::event::EventRepo;

#[derive(Debug)]
pub struct PostgresEvent {
    pool: PgPool,
}

impl PostgresEvent {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepo for PostgresEvent {
    async fn create_event(&self, event: &Event) -> Result<Event> {
        let event = sqlx::query_as(
            "INSERT INTO events
                 (id, title, creator_id, datetime, friends_only, expired, create_time, update_time)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING *",
        )
        .bind(&event.id)
        .bind(&event.title)
        .bind(&event.creator_id)
        .bind(event.datetime)
        .bind(event.friends_only)
        .bind(event.expired)
        .bind(event.create_time)
        .bind(event.update_time)
        .fetch_one(&self.pool)
        .await?;
        Ok(event)
    }

    async fn get_event(&self, id: &str) -> Result<Option<Event>> {
        let event = sqlx::query_as("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    async fn add_invitations(
        &self,
        event_id: &str,
        from_user_id: &str,
        to_users: &[String],
    ) -> Result<Vec<Invitation>> {
        let now = chrono::Utc::now().timestamp_millis();
        let mut transaction = self.pool.begin().await?;
        let mut invitations = Vec::with_capacity(to_users.len());
        for to_user in to_users {
            let invitation: Option<Invitation> = sqlx::query_as(
                "INSERT INTO invitations (id, event_id, from_user_id, to_user_id, create_time)
                 VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT (to_user_id, event_id) DO NOTHING
                 RETURNING *",
            )
            .bind(nanoid::nanoid!())
            .bind(event_id)
            .bind(from_user_id)
            .bind(to_user)
            .bind(now)
            .fetch_optional(&mut *transaction)
            .await?;
            invitations.extend(invitation);
        }
        transaction.commit().await?;
        Ok(invitations)
    }

    async fn get_or_create_link(
        &self,
        event_id: &str,
        from_user_id: &str,
    ) -> Result<LinkInvitation> {
        sqlx::query(
            "INSERT INTO link_invitations (id, event_id, from_user_id, link_id, create_time)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (event_id, from_user_id) DO NOTHING",
        )
        .bind(nanoid::nanoid!())
        .bind(event_id)
        .bind(from_user_id)
        .bind(nanoid::nanoid!(10))
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;

        let link = sqlx::query_as(
            "SELECT * FROM link_invitations WHERE event_id = $1 AND from_user_id = $2",
        )
        .bind(event_id)
        .bind(from_user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(link)
    }

    async fn save_event(&self, saved: &SavedEvent) -> Result<SavedEvent> {
        let saved = sqlx::query_as(
            "INSERT INTO saved_events (id, user_id, event_id, create_time)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(&saved.id)
        .bind(&saved.user_id)
        .bind(&saved.event_id)
        .bind(saved.create_time)
        .fetch_one(&self.pool)
        .await?;
        Ok(saved)
    }

    async fn list_savers(&self, event_id: &str) -> Result<Vec<String>> {
        let savers: Vec<(String,)> = sqlx::query_as(
            "SELECT user_id FROM saved_events WHERE event_id = $1 ORDER BY create_time, id",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(savers.into_iter().map(|(id,)| id).collect())
    }

    async fn expire_events(&self, now: i64) -> Result<Vec<String>> {
        let expired: Vec<(String,)> = sqlx::query_as(
            "UPDATE events SET expired = TRUE, update_time = $1
             WHERE NOT expired AND COALESCE(datetime, create_time) + $2 <= $1
             RETURNING id",
        )
        .bind(now)
        .bind(EVENT_TTL_MS)
        .fetch_all(&self.pool)
        .await?;
        Ok(expired.into_iter().map(|(id,)| id).collect())
    }
}

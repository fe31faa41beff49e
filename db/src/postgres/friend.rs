use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use abi::errors::Result;
use abi::model::{FriendEdge, User};

use crate::friend::FriendRepo;

#[derive(Debug)]
pub struct PostgresFriend {
    pool: PgPool,
}

impl PostgresFriend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FriendRepo for PostgresFriend {
    async fn create_edge(&self, owner: &str, target: &str) -> Result<(FriendEdge, bool)> {
        let edge = FriendEdge::new(owner, target);
        let mut transaction = self.pool.begin().await?;

        // the unique (user_id, friend_id) constraint rejects a second writer
        let edge: FriendEdge = sqlx::query_as(
            "INSERT INTO friendships (id, user_id, friend_id, since, update_time)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(&edge.id)
        .bind(&edge.user_id)
        .bind(&edge.friend_id)
        .bind(edge.since)
        .bind(edge.update_time)
        .fetch_one(&mut *transaction)
        .await?;

        let (reciprocated,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM friendships WHERE user_id = $1 AND friend_id = $2)",
        )
        .bind(target)
        .bind(owner)
        .fetch_one(&mut *transaction)
        .await?;

        transaction.commit().await?;
        debug!(
            "edge {} -> {} created, reciprocated: {}",
            owner, target, reciprocated
        );
        Ok((edge, reciprocated))
    }

    async fn delete_edge(&self, owner: &str, target: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM friendships WHERE user_id = $1 AND friend_id = $2")
            .bind(owner)
            .bind(target)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_edge(&self, owner: &str, target: &str) -> Result<Option<FriendEdge>> {
        let edge =
            sqlx::query_as("SELECT * FROM friendships WHERE user_id = $1 AND friend_id = $2")
                .bind(owner)
                .bind(target)
                .fetch_optional(&self.pool)
                .await?;
        Ok(edge)
    }

    async fn list_added_by(&self, user_id: &str) -> Result<Vec<User>> {
        let users = sqlx::query_as(
            "SELECT u.* FROM friendships AS f
             JOIN users AS u ON f.friend_id = u.id
             WHERE f.user_id = $1
             ORDER BY f.since",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn list_incoming(&self, user_id: &str) -> Result<Vec<User>> {
        let users = sqlx::query_as(
            "SELECT u.* FROM friendships AS f
             JOIN users AS u ON f.user_id = u.id
             WHERE f.friend_id = $1
             ORDER BY f.since",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::postgres::test_support::test_db;
    use crate::postgres::PostgresUser;
    use crate::user::UserRepo;
    use abi::errors::ErrorKind;

    async fn two_users(repo: &PostgresUser) -> (User, User) {
        let a = User::new(Some("A".to_string()));
        let b = User::new(Some("B".to_string()));
        repo.create_user(&a).await.unwrap();
        repo.create_user(&b).await.unwrap();
        (a, b)
    }

    #[tokio::test]
    #[ignore = "needs a running postgres"]
    async fn create_edge_should_report_reciprocity() {
        let db = test_db();
        let pool = db.pool().await;
        let users = PostgresUser::new(pool.clone());
        let repo = PostgresFriend::new(pool);
        let (a, b) = two_users(&users).await;

        let (edge, reciprocated) = repo.create_edge(&a.id, &b.id).await.unwrap();
        assert_eq!(edge.user_id, a.id);
        assert!(!reciprocated);

        let (_, reciprocated) = repo.create_edge(&b.id, &a.id).await.unwrap();
        assert!(reciprocated);
    }

    #[tokio::test]
    #[ignore = "needs a running postgres"]
    async fn duplicate_edge_should_conflict() {
        let db = test_db();
        let pool = db.pool().await;
        let users = PostgresUser::new(pool.clone());
        let repo = PostgresFriend::new(pool);
        let (a, b) = two_users(&users).await;

        repo.create_edge(&a.id, &b.id).await.unwrap();
        let err = repo.create_edge(&a.id, &b.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    #[ignore = "needs a running postgres"]
    async fn delete_missing_edge_should_be_noop() {
        let db = test_db();
        let pool = db.pool().await;
        let users = PostgresUser::new(pool.clone());
        let repo = PostgresFriend::new(pool);
        let (a, b) = two_users(&users).await;

        assert!(!repo.delete_edge(&a.id, &b.id).await.unwrap());
        repo.create_edge(&a.id, &b.id).await.unwrap();
        assert!(repo.delete_edge(&a.id, &b.id).await.unwrap());
        assert!(repo.get_edge(&a.id, &b.id).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "needs a running postgres"]
    async fn list_incoming_should_return_adders() {
        let db = test_db();
        let pool = db.pool().await;
        let users = PostgresUser::new(pool.clone());
        let repo = PostgresFriend::new(pool);
        let (a, b) = two_users(&users).await;

        repo.create_edge(&a.id, &b.id).await.unwrap();
        let incoming = repo.list_incoming(&b.id).await.unwrap();
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].id, a.id);
        let added = repo.list_added_by(&a.id).await.unwrap();
        assert_eq!(added[0].id, b.id);
    }
}

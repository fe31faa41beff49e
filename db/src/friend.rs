use std::fmt::Debug;

use async_trait::async_trait;

use abi::errors::Result;
use abi::model::{FriendEdge, User};

#[async_trait]
pub trait FriendRepo: Send + Sync + Debug {
    /// insert (owner, target) and report whether (target, owner) already exists;
    /// both happen in one transaction. A duplicate pair is a Conflict
    async fn create_edge(&self, owner: &str, target: &str) -> Result<(FriendEdge, bool)>;

    /// returns false when there was nothing to delete
    async fn delete_edge(&self, owner: &str, target: &str) -> Result<bool>;

    async fn get_edge(&self, owner: &str, target: &str) -> Result<Option<FriendEdge>>;

    /// identities `user_id` has added
    async fn list_added_by(&self, user_id: &str) -> Result<Vec<User>>;

    /// identities that added `user_id`, in edge insertion order
    async fn list_incoming(&self, user_id: &str) -> Result<Vec<User>>;
}

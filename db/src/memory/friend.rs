use async_trait::async_trait;

use abi::errors::{Error, Result};
use abi::model::{FriendEdge, User};

use super::MemoryDb;
use crate::friend::FriendRepo;

#[async_trait]
impl FriendRepo for MemoryDb {
    async fn create_edge(&self, owner: &str, target: &str) -> Result<(FriendEdge, bool)> {
        let mut tables = self.tables.lock().await;
        if tables.user(owner).is_none() || tables.user(target).is_none() {
            return Err(Error::not_found_with_details("user not found"));
        }
        if tables
            .friendships
            .iter()
            .any(|f| f.user_id == owner && f.friend_id == target)
        {
            return Err(Error::conflict("friendship already exists"));
        }
        let edge = FriendEdge::new(owner, target);
        tables.friendships.push(edge.clone());
        let reciprocated = tables
            .friendships
            .iter()
            .any(|f| f.user_id == target && f.friend_id == owner);
        Ok((edge, reciprocated))
    }

    async fn delete_edge(&self, owner: &str, target: &str) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.friendships.len();
        tables
            .friendships
            .retain(|f| !(f.user_id == owner && f.friend_id == target));
        Ok(tables.friendships.len() < before)
    }

    async fn get_edge(&self, owner: &str, target: &str) -> Result<Option<FriendEdge>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .friendships
            .iter()
            .find(|f| f.user_id == owner && f.friend_id == target)
            .cloned())
    }

    async fn list_added_by(&self, user_id: &str) -> Result<Vec<User>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .friendships
            .iter()
            .filter(|f| f.user_id == user_id)
            .filter_map(|f| tables.user(&f.friend_id).cloned())
            .collect())
    }

    async fn list_incoming(&self, user_id: &str) -> Result<Vec<User>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .friendships
            .iter()
            .filter(|f| f.friend_id == user_id)
            .filter_map(|f| tables.user(&f.user_id).cloned())
            .collect())
    }
}

use serde::{Deserialize, Serialize};

/// A directed "added as friend" edge. `user_id` is the owner who performed
/// the add, `friend_id` the identity that was added.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FriendEdge {
    pub id: String,
    pub user_id: String,
    pub friend_id: String,
    pub since: i64,
    pub update_time: i64,
}

impl FriendEdge {
    pub fn new(user_id: impl Into<String>, friend_id: impl Into<String>) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: nanoid::nanoid!(),
            user_id: user_id.into(),
            friend_id: friend_id.into(),
            since: now,
            update_time: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendshipCreate {
    pub friend: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendRequest {
    pub friend: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRequest {
    pub text: String,
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub creator_id: String,
    pub datetime: Option<i64>,
    /// only the creator's friends may save it
    #[serde(default)]
    pub friends_only: bool,
    #[serde(default)]
    pub expired: bool,
    pub create_time: i64,
    pub update_time: i64,
}

/// Events without a date expire a day after creation, dated ones a day
/// after their date.
pub const EVENT_TTL_MS: i64 = 24 * 60 * 60 * 1000;

impl Event {
    pub fn new(creator_id: impl Into<String>, req: EventCreate) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: nanoid::nanoid!(),
            title: req.title,
            creator_id: creator_id.into(),
            datetime: req.datetime,
            friends_only: req.friends_only,
            expired: false,
            create_time: now,
            update_time: now,
        }
    }

    /// Who may save this event: its creator, or someone one of whose
    /// friends already saved it. A friends-only event also needs the
    /// creator among those friends.
    pub fn can_be_saved_by(
        &self,
        user_id: &str,
        friend_ids: &[String],
        savers: &[String],
    ) -> bool {
        if self.creator_id == user_id {
            return true;
        }
        if !savers.iter().any(|s| friend_ids.contains(s)) {
            return false;
        }
        !self.friends_only || friend_ids.contains(&self.creator_id)
    }

    pub fn expires_at(&self) -> i64 {
        self.datetime.unwrap_or(self.create_time) + EVENT_TTL_MS
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invitation {
    pub id: String,
    pub event_id: String,
    pub from_user_id: String,
    pub to_user_id: String,
    pub create_time: i64,
}

/// one shareable link per (event, sender) pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkInvitation {
    pub id: String,
    pub event_id: String,
    pub from_user_id: String,
    pub link_id: String,
    pub create_time: i64,
}

/// an identity's interest in an event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedEvent {
    pub id: String,
    pub user_id: String,
    pub event_id: String,
    pub create_time: i64,
}

impl SavedEvent {
    pub fn new(user_id: impl Into<String>, event_id: impl Into<String>) -> Self {
        Self {
            id: nanoid::nanoid!(),
            user_id: user_id.into(),
            event_id: event_id.into(),
            create_time: chrono::Utc::now().timestamp_millis(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventCreate {
    pub title: String,
    #[serde(default)]
    pub datetime: Option<i64>,
    #[serde(default)]
    pub friends_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedEventCreate {
    pub event: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitationRequest {
    pub to_users: Vec<String>,
}

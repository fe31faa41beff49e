use sqlx::postgres::PgRow;
use sqlx::{Error, FromRow, Row};

use crate::errors;
use crate::model::{FriendEdge, FriendRequest, FriendshipCreate, MessageRequest};
use crate::types::Validator;

impl FromRow<'_, PgRow> for FriendEdge {
    fn from_row(row: &'_ PgRow) -> Result<Self, Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            friend_id: row.try_get("friend_id")?,
            since: row.try_get("since")?,
            update_time: row.try_get("update_time")?,
        })
    }
}

impl Validator for MessageRequest {
    fn validate(&self) -> Result<(), errors::Error> {
        if self.text.trim().is_empty() {
            return Err(errors::Error::bad_request("text is empty"));
        }
        Ok(())
    }
}

impl Validator for FriendshipCreate {
    fn validate(&self) -> Result<(), errors::Error> {
        if self.friend.is_empty() {
            return Err(errors::Error::bad_request("friend is empty"));
        }
        Ok(())
    }
}

impl Validator for FriendRequest {
    fn validate(&self) -> Result<(), errors::Error> {
        if self.friend.is_empty() {
            return Err(errors::Error::bad_request("friend is empty"));
        }
        Ok(())
    }
}

use sqlx::postgres::PgRow;
use sqlx::{Error, FromRow, Row};

use crate::errors;
use crate::model::{
    CommentRequest, Event, EventCreate, Invitation, InvitationRequest, LinkInvitation, SavedEvent,
    SavedEventCreate,
};
use crate::types::Validator;

impl FromRow<'_, PgRow> for Event {
    fn from_row(row: &'_ PgRow) -> Result<Self, Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            creator_id: row.try_get("creator_id")?,
            datetime: row.try_get("datetime")?,
            friends_only: row.try_get("friends_only")?,
            expired: row.try_get("expired")?,
            create_time: row.try_get("create_time")?,
            update_time: row.try_get("update_time")?,
        })
    }
}

impl FromRow<'_, PgRow> for Invitation {
    fn from_row(row: &'_ PgRow) -> Result<Self, Error> {
        Ok(Self {
            id: row.try_get("id")?,
            event_id: row.try_get("event_id")?,
            from_user_id: row.try_get("from_user_id")?,
            to_user_id: row.try_get("to_user_id")?,
            create_time: row.try_get("create_time")?,
        })
    }
}

impl FromRow<'_, PgRow> for LinkInvitation {
    fn from_row(row: &'_ PgRow) -> Result<Self, Error> {
        Ok(Self {
            id: row.try_get("id")?,
            event_id: row.try_get("event_id")?,
            from_user_id: row.try_get("from_user_id")?,
            link_id: row.try_get("link_id")?,
            create_time: row.try_get("create_time")?,
        })
    }
}

impl FromRow<'_, PgRow> for SavedEvent {
    fn from_row(row: &'_ PgRow) -> Result<Self, Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            event_id: row.try_get("event_id")?,
            create_time: row.try_get("create_time")?,
        })
    }
}

impl Validator for EventCreate {
    fn validate(&self) -> Result<(), errors::Error> {
        if self.title.trim().is_empty() {
            return Err(errors::Error::bad_request("title is empty"));
        }
        Ok(())
    }
}

impl Validator for InvitationRequest {
    fn validate(&self) -> Result<(), errors::Error> {
        if self.to_users.is_empty() {
            return Err(errors::Error::bad_request("to_users is empty"));
        }
        Ok(())
    }
}

impl Validator for SavedEventCreate {
    fn validate(&self) -> Result<(), errors::Error> {
        if self.event.is_empty() {
            return Err(errors::Error::bad_request("event is empty"));
        }
        Ok(())
    }
}

impl Validator for CommentRequest {
    fn validate(&self) -> Result<(), errors::Error> {
        if self.text.trim().is_empty() {
            return Err(errors::Error::bad_request("text is empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EVENT_TTL_MS;

    fn event(friends_only: bool) -> Event {
        Event::new(
            "creator",
            EventCreate {
                title: "Tacos".to_string(),
                datetime: None,
                friends_only,
            },
        )
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn creator_can_always_save() {
        assert!(event(true).can_be_saved_by("creator", &[], &[]));
    }

    #[test]
    fn saving_should_need_a_friend_who_saved() {
        let event = event(false);
        assert!(!event.can_be_saved_by("dan", &ids(&["erin"]), &ids(&["creator"])));
        assert!(event.can_be_saved_by("dan", &ids(&["erin"]), &ids(&["creator", "erin"])));
    }

    #[test]
    fn friends_only_should_need_the_creator_as_friend() {
        let event = event(true);
        let savers = ids(&["creator", "erin"]);
        assert!(!event.can_be_saved_by("dan", &ids(&["erin"]), &savers));
        assert!(event.can_be_saved_by("dan", &ids(&["erin", "creator"]), &savers));
    }

    #[test]
    fn expiry_should_count_from_date_or_creation() {
        let mut event = event(false);
        assert_eq!(event.expires_at(), event.create_time + EVENT_TTL_MS);
        event.datetime = Some(1_000);
        assert_eq!(event.expires_at(), 1_000 + EVENT_TTL_MS);
    }

    #[test]
    fn blank_comment_should_fail() {
        let req = CommentRequest {
            text: "  ".to_string(),
        };
        assert_eq!(
            req.validate().unwrap_err().kind(),
            errors::ErrorKind::BadRequest
        );
    }
}

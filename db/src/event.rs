use std::fmt::Debug;

use async_trait::async_trait;

use abi::errors::Result;
use abi::model::{Event, Invitation, LinkInvitation, SavedEvent};

#[async_trait]
pub trait EventRepo: Send + Sync + Debug {
    async fn create_event(&self, event: &Event) -> Result<Event>;

    async fn get_event(&self, id: &str) -> Result<Option<Event>>;

    /// already invited identities are skipped; returns the new rows.
    /// An unknown invitee fails the whole call and records nothing
    async fn add_invitations(
        &self,
        event_id: &str,
        from_user_id: &str,
        to_users: &[String],
    ) -> Result<Vec<Invitation>>;

    /// one link per (event, sender), created on first use
    async fn get_or_create_link(&self, event_id: &str, from_user_id: &str)
        -> Result<LinkInvitation>;

    /// Conflict when the identity already saved the event
    async fn save_event(&self, saved: &SavedEvent) -> Result<SavedEvent>;

    /// identities that saved the event, oldest save first
    async fn list_savers(&self, event_id: &str) -> Result<Vec<String>>;

    /// marks every live event whose expiry is at or before `now`; returns their ids
    async fn expire_events(&self, now: i64) -> Result<Vec<String>>;
}

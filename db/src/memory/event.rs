use async_trait::async_trait;

use abi::errors::{Error, Result};
use abi::model::{Event, Invitation, LinkInvitation, SavedEvent};

use super::MemoryDb;
use crate::event::EventRepo;

#[async_trait]
impl EventRepo for MemoryDb {
    async fn create_event(&self, event: &Event) -> Result<Event> {
        let mut tables = self.tables.lock().await;
        if tables.user(&event.creator_id).is_none() {
            return Err(Error::not_found_with_details("creator not found"));
        }
        tables.events.push(event.clone());
        Ok(event.clone())
    }

    async fn get_event(&self, id: &str) -> Result<Option<Event>> {
        let tables = self.tables.lock().await;
        Ok(tables.events.iter().find(|e| e.id == id).cloned())
    }

    async fn add_invitations(
        &self,
        event_id: &str,
        from_user_id: &str,
        to_users: &[String],
    ) -> Result<Vec<Invitation>> {
        let mut tables = self.tables.lock().await;
        if to_users.iter().any(|id| tables.user(id).is_none()) {
            return Err(Error::not_found_with_details("invitee not found"));
        }
        let now = chrono::Utc::now().timestamp_millis();
        let mut created: Vec<Invitation> = Vec::with_capacity(to_users.len());
        for to_user in to_users {
            let invited = tables
                .invitations
                .iter()
                .chain(created.iter())
                .any(|i| i.event_id == event_id && &i.to_user_id == to_user);
            if invited {
                continue;
            }
            created.push(Invitation {
                id: nanoid::nanoid!(),
                event_id: event_id.to_string(),
                from_user_id: from_user_id.to_string(),
                to_user_id: to_user.clone(),
                create_time: now,
            });
        }
        tables.invitations.extend(created.iter().cloned());
        Ok(created)
    }

    async fn get_or_create_link(
        &self,
        event_id: &str,
        from_user_id: &str,
    ) -> Result<LinkInvitation> {
        let mut tables = self.tables.lock().await;
        if let Some(link) = tables
            .links
            .iter()
            .find(|l| l.event_id == event_id && l.from_user_id == from_user_id)
        {
            return Ok(link.clone());
        }
        let link = LinkInvitation {
            id: nanoid::nanoid!(),
            event_id: event_id.to_string(),
            from_user_id: from_user_id.to_string(),
            link_id: nanoid::nanoid!(10),
            create_time: chrono::Utc::now().timestamp_millis(),
        };
        tables.links.push(link.clone());
        Ok(link)
    }

    async fn save_event(&self, saved: &SavedEvent) -> Result<SavedEvent> {
        let mut tables = self.tables.lock().await;
        if tables.user(&saved.user_id).is_none() {
            return Err(Error::not_found_with_details("user not found"));
        }
        if !tables.events.iter().any(|e| e.id == saved.event_id) {
            return Err(Error::not_found_with_details("event not found"));
        }
        if tables
            .saved_events
            .iter()
            .any(|s| s.user_id == saved.user_id && s.event_id == saved.event_id)
        {
            return Err(Error::conflict("event already saved"));
        }
        tables.saved_events.push(saved.clone());
        Ok(saved.clone())
    }

    async fn list_savers(&self, event_id: &str) -> Result<Vec<String>> {
        let tables = self.tables.lock().await;
        let mut saved: Vec<&SavedEvent> = tables
            .saved_events
            .iter()
            .filter(|s| s.event_id == event_id)
            .collect();
        saved.sort_by_key(|s| s.create_time);
        Ok(saved.into_iter().map(|s| s.user_id.clone()).collect())
    }

    async fn expire_events(&self, now: i64) -> Result<Vec<String>> {
        let mut tables = self.tables.lock().await;
        let mut expired = Vec::new();
        for event in tables
            .events
            .iter_mut()
            .filter(|e| !e.expired && e.expires_at() <= now)
        {
            event.expired = true;
            event.update_time = now;
            expired.push(event.id.clone());
        }
        Ok(expired)
    }
}

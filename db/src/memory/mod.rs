//! In-process repositories for `--memory` runs and service tests.
//! Every table sits behind one lock, so each call is atomic the way a
//! postgres transaction would be.

use tokio::sync::Mutex;

use abi::model::{
    Device, Event, FriendEdge, Invitation, LinkInvitation, SavedEvent, SocialAccount, User,
    UserPhone,
};

mod device;
mod event;
mod friend;
mod user;

#[derive(Debug, Default)]
pub(crate) struct Tables {
    users: Vec<User>,
    phones: Vec<UserPhone>,
    social_accounts: Vec<SocialAccount>,
    friendships: Vec<FriendEdge>,
    devices: Vec<Device>,
    events: Vec<Event>,
    invitations: Vec<Invitation>,
    links: Vec<LinkInvitation>,
    saved_events: Vec<SavedEvent>,
}

impl Tables {
    fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn user_mut(&mut self, id: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    /// deleting an identity cascades like the foreign keys do
    fn delete_user(&mut self, id: &str) {
        self.users.retain(|u| u.id != id);
        self.phones.retain(|p| p.user_id != id);
        self.social_accounts.retain(|a| a.user_id != id);
        self.friendships
            .retain(|f| f.user_id != id && f.friend_id != id);
        self.devices.retain(|d| d.user_id != id);
        self.invitations
            .retain(|i| i.from_user_id != id && i.to_user_id != id);
        self.links.retain(|l| l.from_user_id != id);
        self.saved_events.retain(|s| s.user_id != id);
        let events: Vec<String> = self
            .events
            .iter()
            .filter(|e| e.creator_id == id)
            .map(|e| e.id.clone())
            .collect();
        self.events.retain(|e| e.creator_id != id);
        self.invitations.retain(|i| !events.contains(&i.event_id));
        self.links.retain(|l| !events.contains(&l.event_id));
        self.saved_events.retain(|s| !events.contains(&s.event_id));
    }
}

#[derive(Debug, Default)]
pub struct MemoryDb {
    tables: Mutex<Tables>,
}

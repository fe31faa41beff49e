use std::collections::HashSet;

use tracing::debug;

use abi::errors::Error;
use abi::model::{FriendEdge, NotificationIntent, NotifyOptions, User};
use db::DbRepo;
use notifier::{template, Notifier};

/// Directed "added" edges plus the notification each add produces.
#[derive(Debug, Clone)]
pub struct FriendGraph {
    db: DbRepo,
    notifier: Notifier,
}

impl FriendGraph {
    pub fn new(db: DbRepo, notifier: Notifier) -> Self {
        Self { db, notifier }
    }

    /// Records `owner -> target` and tells the target about it. The edge
    /// stays committed when the notification fails.
    pub async fn create_edge(&self, owner: &str, target: &str) -> Result<FriendEdge, Error> {
        let (edge, intent) = self.create_edge_intent(owner, target).await?;
        self.notifier.dispatch(&intent).await?;
        Ok(edge)
    }

    /// the database half of [`create_edge`](Self::create_edge); nothing is sent
    pub async fn create_edge_intent(
        &self,
        owner: &str,
        target: &str,
    ) -> Result<(FriendEdge, NotificationIntent), Error> {
        if owner == target {
            return Err(Error::bad_request("cannot add yourself as a friend"));
        }
        let owner_user = self.user(owner).await?;
        self.user(target).await?;

        let (edge, reciprocated) = self.db.friend.create_edge(owner, target).await?;
        debug!("{} added {} (reciprocated: {})", owner, target, reciprocated);

        let intent = if reciprocated {
            NotificationIntent::new(
                vec![target.to_string()],
                template::added_back(&owner_user),
                NotifyOptions::default(),
            )
        } else {
            NotificationIntent::new(
                vec![target.to_string()],
                template::added_as_friend(&owner_user),
                NotifyOptions::added_friend(),
            )
        };
        Ok((edge, intent))
    }

    /// succeeds whether or not the edge existed
    pub async fn delete_edge(&self, owner: &str, target: &str) -> Result<(), Error> {
        let deleted = self.db.friend.delete_edge(owner, target).await?;
        if !deleted {
            debug!("no edge {} -> {} to delete", owner, target);
        }
        Ok(())
    }

    pub async fn list_added_by(&self, user_id: &str) -> Result<Vec<User>, Error> {
        self.db.friend.list_added_by(user_id).await
    }

    /// who added `user_id` and has not been added back
    pub async fn list_unreciprocated_incoming(&self, user_id: &str) -> Result<Vec<User>, Error> {
        let incoming = self.db.friend.list_incoming(user_id).await?;
        let added = self.db.friend.list_added_by(user_id).await?;
        Ok(unreciprocated(incoming, &added))
    }

    /// Sends `text` to a friend the caller has added.
    pub async fn send_message(&self, from: &str, to: &str, text: &str) -> Result<(), Error> {
        if self.db.friend.get_edge(from, to).await?.is_none() {
            return Err(Error::forbidden("you have not added this friend"));
        }
        let sender = self.user(from).await?;
        let intent = NotificationIntent::new(
            vec![to.to_string()],
            template::friend_message(&sender, text),
            NotifyOptions::default(),
        );
        self.notifier.dispatch(&intent).await
    }

    async fn user(&self, id: &str) -> Result<User, Error> {
        self.db
            .user
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found_with_details(format!("user {id} not found")))
    }
}

/// incoming minus added, keeping the incoming order
fn unreciprocated(incoming: Vec<User>, added: &[User]) -> Vec<User> {
    let added: HashSet<&str> = added.iter().map(|u| u.id.as_str()).collect();
    incoming
        .into_iter()
        .filter(|u| !added.contains(u.id.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestApp;
    use abi::errors::ErrorKind;

    #[test]
    fn unreciprocated_should_subtract_added() {
        let a = User::new(Some("A".to_string()));
        let b = User::new(Some("B".to_string()));
        let c = User::new(Some("C".to_string()));
        let result = unreciprocated(vec![a.clone(), b.clone(), c.clone()], &[b]);
        assert_eq!(result, vec![a, c]);
    }

    #[tokio::test]
    async fn create_edge_should_record_owner() {
        let app = TestApp::new();
        let a = app.member("Alice", "alice").await;
        let b = app.member("Bob", "bob").await;

        let edge = app.state.friend_graph.create_edge(&a.id, &b.id).await.unwrap();
        assert_eq!(edge.user_id, a.id);
        assert_eq!(edge.friend_id, b.id);
        assert!(app.state.db.friend.get_edge(&a.id, &b.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn duplicate_edge_should_conflict() {
        let app = TestApp::new();
        let a = app.member("Alice", "alice").await;
        let b = app.member("Bob", "bob").await;

        app.state.friend_graph.create_edge(&a.id, &b.id).await.unwrap();
        let err = app
            .state
            .friend_graph
            .create_edge(&a.id, &b.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn self_edge_should_be_rejected() {
        let app = TestApp::new();
        let a = app.member("Alice", "alice").await;
        let err = app
            .state
            .friend_graph
            .create_edge(&a.id, &a.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[tokio::test]
    async fn unknown_target_should_be_not_found() {
        let app = TestApp::new();
        let a = app.member("Alice", "alice").await;
        let err = app
            .state
            .friend_graph
            .create_edge(&a.id, "nobody")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn first_add_should_say_added_as_friend() {
        let app = TestApp::new();
        let a = app.member("Alice", "alice").await;
        let b = app.member("Bob", "bob").await;

        let (_, intent) = app
            .state
            .friend_graph
            .create_edge_intent(&a.id, &b.id)
            .await
            .unwrap();
        assert_eq!(intent.recipients, vec![b.id.clone()]);
        assert_eq!(intent.message, "Alice (@alice) added you as a friend!");
        assert!(intent.options.added_friend);
    }

    #[tokio::test]
    async fn reciprocal_add_should_say_added_back() {
        let app = TestApp::new();
        let a = app.member("Alice", "alice").await;
        let b = app.member("Bob", "bob").await;

        app.state.friend_graph.create_edge(&b.id, &a.id).await.unwrap();
        let (_, intent) = app
            .state
            .friend_graph
            .create_edge_intent(&a.id, &b.id)
            .await
            .unwrap();
        assert_eq!(intent.recipients, vec![b.id.clone()]);
        assert_eq!(intent.message, "Alice (@alice) added you back!");
        assert!(!intent.options.added_friend);
    }

    #[tokio::test]
    async fn adding_a_contact_should_text_them() {
        let app = TestApp::new();
        let a = app.member("A", "a").await;
        app.register_device(&a.id, "a-token").await;
        let b = app.shadow("B", "+15551234567").await;

        app.state.friend_graph.create_edge(&a.id, &b.id).await.unwrap();

        assert!(app.apns.sent().await.is_empty());
        assert_eq!(
            app.sms.sent().await,
            vec![(
                "+15551234567".to_string(),
                "A (@a) added you as a friend on Rallytap! - https://rallytap.com/app".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn failed_sms_should_keep_the_edge() {
        let app = TestApp::with_failing_sms();
        let a = app.member("A", "a").await;
        let b = app.shadow("B", "+15551234567").await;

        let err = app
            .state
            .friend_graph
            .create_edge(&a.id, &b.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unavailable);
        assert!(app.state.db.friend.get_edge(&a.id, &b.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_should_be_idempotent() {
        let app = TestApp::new();
        let a = app.member("Alice", "alice").await;
        let b = app.member("Bob", "bob").await;

        app.state.friend_graph.create_edge(&a.id, &b.id).await.unwrap();
        app.state.friend_graph.delete_edge(&a.id, &b.id).await.unwrap();
        app.state.friend_graph.delete_edge(&a.id, &b.id).await.unwrap();
        assert!(app.state.db.friend.get_edge(&a.id, &b.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn added_me_should_skip_those_added_back() {
        let app = TestApp::new();
        let me = app.member("Me", "me").await;
        let b = app.member("Bob", "bob").await;
        let c = app.member("Carol", "carol").await;

        app.state.friend_graph.create_edge(&b.id, &me.id).await.unwrap();
        app.state.friend_graph.create_edge(&c.id, &me.id).await.unwrap();
        app.state.friend_graph.create_edge(&me.id, &b.id).await.unwrap();

        let added_me = app
            .state
            .friend_graph
            .list_unreciprocated_incoming(&me.id)
            .await
            .unwrap();
        assert_eq!(added_me, vec![c]);
    }

    #[tokio::test]
    async fn message_without_edge_should_be_forbidden() {
        let app = TestApp::new();
        let a = app.member("Alice", "alice").await;
        let b = app.member("Bob", "bob").await;

        let err = app
            .state
            .friend_graph
            .send_message(&a.id, &b.id, "hi")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn message_should_push_to_friend() {
        let app = TestApp::new();
        let a = app.member("Alice", "alice").await;
        let b = app.member("Bob", "bob").await;
        app.register_device(&b.id, "b-token").await;
        app.state.friend_graph.create_edge(&a.id, &b.id).await.unwrap();

        app.state
            .friend_graph
            .send_message(&a.id, &b.id, "dinner?")
            .await
            .unwrap();

        let sent = app.apns.sent().await;
        assert_eq!(sent.last().unwrap().1, "Alice: dinner?");
        assert!(app.sms.sent().await.is_empty());
    }
}

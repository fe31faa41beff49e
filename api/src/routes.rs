use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::contacts::import_contacts;
use crate::handlers::devices::{register_apns, register_gcm};
use crate::handlers::events::{comment, create_event, get_event, interested, invite};
use crate::handlers::friends::{create_friendship, delete_friendship, send_message};
use crate::handlers::saved_events::save_event;
use crate::handlers::sessions::{
    create_auth_code, create_facebook_session, create_session, sync_social_account,
};
use crate::handlers::users::{
    get_added_me, get_facebook_friends, get_friends, get_me, get_user_by_id,
    get_user_by_username, update_user,
};
use crate::AppState;

pub fn app_routes(state: AppState) -> Router {
    Router::new()
        .merge(session_routes(state.clone()))
        .nest("/users", user_routes(state.clone()))
        .nest("/friendships", friend_routes(state.clone()))
        .nest("/devices", device_routes(state.clone()))
        .nest("/userphones", contact_routes(state.clone()))
        .nest("/events", event_routes(state.clone()))
        .nest("/saved-events", saved_event_routes(state))
}

fn session_routes(state: AppState) -> Router {
    Router::new()
        .route("/authcodes", post(create_auth_code))
        .route("/sessions", post(create_session))
        .route("/sessions/facebook", post(create_facebook_session))
        .route("/social-account", post(sync_social_account))
        .with_state(state)
}

fn user_routes(state: AppState) -> Router {
    Router::new()
        .route("/me", get(get_me))
        .route("/friends", get(get_friends))
        .route("/added-me", get(get_added_me))
        .route("/facebook-friends", get(get_facebook_friends))
        .route("/username/:username", get(get_user_by_username))
        .route("/:id", get(get_user_by_id).put(update_user))
        .with_state(state)
}

fn friend_routes(state: AppState) -> Router {
    Router::new()
        .route("/", post(create_friendship))
        .route("/friend", delete(delete_friendship))
        .route("/:friend/messages", post(send_message))
        .with_state(state)
}

fn device_routes(state: AppState) -> Router {
    Router::new()
        .route("/apns", post(register_apns))
        .route("/gcm", post(register_gcm))
        .with_state(state)
}

fn contact_routes(state: AppState) -> Router {
    Router::new()
        .route("/contacts", post(import_contacts))
        .with_state(state)
}

fn event_routes(state: AppState) -> Router {
    Router::new()
        .route("/", post(create_event))
        .route("/:id", get(get_event))
        .route("/:id/invitations", post(invite))
        .route("/:id/interested", get(interested))
        .route("/:id/comments", post(comment))
        .with_state(state)
}

fn saved_event_routes(state: AppState) -> Router {
    Router::new()
        .route("/", post(save_event))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::test_support::TestApp;

    use super::app_routes;

    async fn call(
        app: &TestApp,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app_routes(app.state.clone())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn missing_token_should_be_unauthorized() {
        let app = TestApp::new();
        let (status, body) = call(
            &app,
            Method::POST,
            "/friendships",
            None,
            Some(json!({ "friend": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["kind"], "UnAuthorized");

        let (status, _) = call(&app, Method::GET, "/users/me", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn friendship_should_be_created_once() {
        let app = TestApp::new();
        let a = app.member("Alice", "alice").await;
        let b = app.member("Bob", "bob").await;
        let token = app.token(&a.id);

        let (status, body) = call(
            &app,
            Method::POST,
            "/friendships",
            Some(&token),
            Some(json!({ "friend": b.id })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user_id"], a.id.as_str());
        assert_eq!(body["friend_id"], b.id.as_str());

        let (status, body) = call(
            &app,
            Method::POST,
            "/friendships",
            Some(&token),
            Some(json!({ "friend": b.id })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["kind"], "Conflict");
    }

    #[tokio::test]
    async fn adding_yourself_should_be_bad_request() {
        let app = TestApp::new();
        let a = app.member("Alice", "alice").await;
        let (status, _) = call(
            &app,
            Method::POST,
            "/friendships",
            Some(&app.token(&a.id)),
            Some(json!({ "friend": a.id })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn deleting_absent_friendship_should_succeed() {
        let app = TestApp::new();
        let a = app.member("Alice", "alice").await;
        let b = app.member("Bob", "bob").await;
        let (status, _) = call(
            &app,
            Method::DELETE,
            "/friendships/friend",
            Some(&app.token(&a.id)),
            Some(json!({ "friend": b.id })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn friend_lists_should_follow_edges() {
        let app = TestApp::new();
        let me = app.member("Me", "me").await;
        let b = app.member("Bob", "bob").await;
        let c = app.member("Carol", "carol").await;
        app.state.friend_graph.create_edge(&b.id, &me.id).await.unwrap();
        app.state.friend_graph.create_edge(&c.id, &me.id).await.unwrap();
        app.state.friend_graph.create_edge(&me.id, &b.id).await.unwrap();
        let token = app.token(&me.id);

        let (status, body) = call(&app, Method::GET, "/users/friends", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["id"], b.id.as_str());

        let (status, body) = call(&app, Method::GET, "/users/added-me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["id"], c.id.as_str());
    }

    #[tokio::test]
    async fn message_requires_an_edge() {
        let app = TestApp::new();
        let a = app.member("Alice", "alice").await;
        let b = app.member("Bob", "bob").await;
        let uri = format!("/friendships/{}/messages", b.id);
        let (status, _) = call(
            &app,
            Method::POST,
            &uri,
            Some(&app.token(&a.id)),
            Some(json!({ "text": "hi" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn phone_login_should_issue_a_token() {
        let app = TestApp::new();
        let phone = "+15551234567";

        let (status, _) = call(
            &app,
            Method::POST,
            "/authcodes",
            None,
            Some(json!({ "phone": "5551234567" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            &app,
            Method::POST,
            "/authcodes",
            None,
            Some(json!({ "phone": phone })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(app.sms.sent().await.len(), 1);

        let (status, _) = call(
            &app,
            Method::POST,
            "/sessions",
            None,
            Some(json!({ "phone": phone, "code": "0000" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let code = app.state.cache.get_auth_code(phone).await.unwrap().unwrap();
        let (status, body) = call(
            &app,
            Method::POST,
            "/sessions",
            None,
            Some(json!({ "phone": phone, "code": code })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["authtoken"].as_str().unwrap().to_string();
        let user_id = body["user"]["id"].as_str().unwrap().to_string();

        let (status, body) = call(&app, Method::GET, "/users/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], user_id.as_str());
    }

    #[tokio::test]
    async fn facebook_session_should_create_identity() {
        let app = TestApp::new();
        let (status, body) = call(
            &app,
            Method::POST,
            "/sessions/facebook",
            None,
            Some(json!({ "access_token": "fb-token" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["name"], "Alan Turing");

        let (status, _) = call(
            &app,
            Method::POST,
            "/sessions/facebook",
            None,
            Some(json!({ "access_token": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn device_registration_should_upsert() {
        let app = TestApp::new();
        let a = app.member("Alice", "alice").await;
        let b = app.member("Bob", "bob").await;
        let register = json!({ "registration_id": "apns-token-1", "name": "iPhone" });

        let (status, body) = call(
            &app,
            Method::POST,
            "/devices/apns",
            Some(&app.token(&a.id)),
            Some(register.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["platform"], "Apns");

        let (status, body) = call(
            &app,
            Method::POST,
            "/devices/apns",
            Some(&app.token(&b.id)),
            Some(register),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user_id"], b.id.as_str());
    }

    #[tokio::test]
    async fn contacts_should_be_validated_and_imported() {
        let app = TestApp::new();
        let a = app.member("Alice", "alice").await;
        let token = app.token(&a.id);

        let (status, _) = call(
            &app,
            Method::POST,
            "/userphones/contacts",
            Some(&token),
            Some(json!({ "contacts": [{ "name": "Bad", "phone": "123" }] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = call(
            &app,
            Method::POST,
            "/userphones/contacts",
            Some(&token),
            Some(json!({ "contacts": [
                { "name": "Bruce Lee", "phone": "+12036227310" },
                { "name": "Chuck Norris", "phone": "+12036227311" },
            ] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let imported = body.as_array().unwrap();
        assert_eq!(imported.len(), 2);
        assert_eq!(imported[0]["user"]["name"], "Bruce Lee");
        assert!(imported[0]["user"]["username"].is_null());
    }

    #[tokio::test]
    async fn users_can_only_edit_themselves() {
        let app = TestApp::new();
        let a = app.member("Alice", "alice").await;
        let b = app.member("Bob", "bob").await;
        let token = app.token(&a.id);

        let (status, _) = call(
            &app,
            Method::PUT,
            &format!("/users/{}", b.id),
            Some(&token),
            Some(json!({ "name": "Hacked" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = call(
            &app,
            Method::PUT,
            &format!("/users/{}", a.id),
            Some(&token),
            Some(json!({ "username": "bob" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = call(
            &app,
            Method::PUT,
            &format!("/users/{}", a.id),
            Some(&token),
            Some(json!({ "username": "ally" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "ally");
    }

    #[tokio::test]
    async fn username_lookup_should_tell_taken_from_free() {
        let app = TestApp::new();
        let a = app.member("Alice", "alice").await;
        let token = app.token(&a.id);

        let (status, _) = call(&app, Method::GET, "/users/username/ALICE", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(&app, Method::GET, "/users/username/nobody", Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invitations_should_text_the_shared_link() {
        let app = TestApp::new();
        let host = app.member("Alice", "alice").await;
        let guest = app.shadow("Bob", "+15551234567").await;
        let other = app.member("Carol", "carol").await;
        let token = app.token(&host.id);

        let (status, event) = call(
            &app,
            Method::POST,
            "/events",
            Some(&token),
            Some(json!({ "title": "tacos" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let uri = format!("/events/{}/invitations", event["id"].as_str().unwrap());

        let (status, _) = call(
            &app,
            Method::POST,
            &uri,
            Some(&app.token(&other.id)),
            Some(json!({ "to_users": [guest.id] })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = call(
            &app,
            Method::POST,
            &uri,
            Some(&token),
            Some(json!({ "to_users": [guest.id] })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.as_array().unwrap().len(), 1);

        let sent = app.sms.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "+15551234567");
        assert!(sent[0]
            .1
            .starts_with("Alice shared their plans with you - https://rallytap.com/e/"));

        let host = app.state.db.user.get_user_by_id(&host.id).await.unwrap().unwrap();
        assert_eq!(host.points, 105);
    }

    async fn new_event(app: &TestApp, token: &str, body: Value) -> String {
        let (status, event) = call(app, Method::POST, "/events", Some(token), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        event["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn inviting_unknown_user_should_record_nothing() {
        let app = TestApp::new();
        let host = app.member("Alice", "alice").await;
        let guest = app.member("Bob", "bob").await;
        let token = app.token(&host.id);
        let id = new_event(&app, &token, json!({ "title": "tacos" })).await;
        let uri = format!("/events/{id}/invitations");

        let (status, body) = call(
            &app,
            Method::POST,
            &uri,
            Some(&token),
            Some(json!({ "to_users": [guest.id, "ghost"] })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "NotFound");
        let host_now = app.state.db.user.get_user_by_id(&host.id).await.unwrap().unwrap();
        assert_eq!(host_now.points, host.points);

        let (status, body) = call(
            &app,
            Method::POST,
            &uri,
            Some(&token),
            Some(json!({ "to_users": [guest.id] })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn saving_should_need_a_friend_who_saved() {
        let app = TestApp::new();
        let host = app.member("Alice", "alice").await;
        let friend = app.member("Bob", "bob").await;
        let stranger = app.member("Carol", "carol").await;
        app.state.db.friend.create_edge(&friend.id, &host.id).await.unwrap();
        app.register_device(&host.id, "alice-phone").await;
        let id = new_event(&app, &app.token(&host.id), json!({ "title": "tacos" })).await;

        // nobody saved it yet, not even the host
        let (status, _) = call(
            &app,
            Method::POST,
            "/saved-events",
            Some(&app.token(&friend.id)),
            Some(json!({ "event": id })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = call(
            &app,
            Method::POST,
            "/saved-events",
            Some(&app.token(&host.id)),
            Some(json!({ "event": id })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user_id"], host.id.as_str());

        let (status, _) = call(
            &app,
            Method::POST,
            "/saved-events",
            Some(&app.token(&friend.id)),
            Some(json!({ "event": id })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(
            app.apns.sent().await,
            vec![(
                "alice-phone".to_string(),
                "Bob is also interested in tacos!".to_string()
            )]
        );

        let (status, _) = call(
            &app,
            Method::POST,
            "/saved-events",
            Some(&app.token(&friend.id)),
            Some(json!({ "event": id })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = call(
            &app,
            Method::POST,
            "/saved-events",
            Some(&app.token(&stranger.id)),
            Some(json!({ "event": id })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        // one point for saving, one more each time someone else saves
        let host = app.state.db.user.get_user_by_id(&host.id).await.unwrap().unwrap();
        let friend = app.state.db.user.get_user_by_id(&friend.id).await.unwrap().unwrap();
        assert_eq!(host.points, 102);
        assert_eq!(friend.points, 101);
    }

    #[tokio::test]
    async fn friends_only_event_should_need_the_creator_as_friend() {
        let app = TestApp::new();
        let host = app.member("Alice", "alice").await;
        let bob = app.member("Bob", "bob").await;
        let dan = app.member("Dan", "dan").await;
        app.state.db.friend.create_edge(&bob.id, &host.id).await.unwrap();
        app.state.db.friend.create_edge(&dan.id, &bob.id).await.unwrap();
        let id = new_event(
            &app,
            &app.token(&host.id),
            json!({ "title": "tacos", "friends_only": true }),
        )
        .await;
        for user in [&host, &bob] {
            let (status, _) = call(
                &app,
                Method::POST,
                "/saved-events",
                Some(&app.token(&user.id)),
                Some(json!({ "event": id })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, _) = call(
            &app,
            Method::POST,
            "/saved-events",
            Some(&app.token(&dan.id)),
            Some(json!({ "event": id })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn interested_and_comments_should_be_for_savers() {
        let app = TestApp::new();
        let host = app.member("Alice", "alice").await;
        let bob = app.member("Bob", "bob").await;
        let carol = app.member("Carol", "carol").await;
        app.state.db.friend.create_edge(&bob.id, &host.id).await.unwrap();
        let id = new_event(&app, &app.token(&host.id), json!({ "title": "tacos" })).await;
        for user in [&host, &bob] {
            let (status, _) = call(
                &app,
                Method::POST,
                "/saved-events",
                Some(&app.token(&user.id)),
                Some(json!({ "event": id })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }
        app.register_device(&host.id, "alice-phone").await;
        app.register_device(&bob.id, "bob-phone").await;

        let uri = format!("/events/{id}/interested");
        let (status, body) = call(&app, Method::GET, &uri, Some(&app.token(&bob.id)), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["id"], host.id.as_str());
        let (status, _) = call(&app, Method::GET, &uri, Some(&app.token(&carol.id)), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let uri = format!("/events/{id}/comments");
        let (status, _) = call(
            &app,
            Method::POST,
            &uri,
            Some(&app.token(&carol.id)),
            Some(json!({ "text": "me too?" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = call(
            &app,
            Method::POST,
            &uri,
            Some(&app.token(&bob.id)),
            Some(json!({ "text": "see you there" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            app.apns.sent().await,
            vec![(
                "alice-phone".to_string(),
                "Bob to tacos: see you there".to_string()
            )]
        );
    }
}

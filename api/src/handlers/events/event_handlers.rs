use std::collections::HashSet;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::debug;

use abi::errors::Error;
use abi::model::{
    CommentRequest, Event, EventCreate, Invitation, InvitationRequest, NotifyOptions, Points, User,
};
use notifier::template;

use crate::api_utils::custom_extract::{AuthUser, PathExtractor, ValidJson};
use crate::AppState;

pub(crate) async fn load_event(app_state: &AppState, id: &str) -> Result<Event, Error> {
    app_state
        .db
        .event
        .get_event(id)
        .await?
        .ok_or_else(|| Error::not_found_with_details("event not found"))
}

pub(crate) async fn load_user(app_state: &AppState, id: &str) -> Result<User, Error> {
    app_state
        .db
        .user
        .get_user_by_id(id)
        .await?
        .ok_or_else(|| Error::not_found_with_details("user not found"))
}

pub async fn create_event(
    State(app_state): State<AppState>,
    AuthUser(caller): AuthUser,
    ValidJson(req): ValidJson<EventCreate>,
) -> Result<(StatusCode, Json<Event>), Error> {
    let event = app_state
        .db
        .event
        .create_event(&Event::new(caller, req))
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn get_event(
    State(app_state): State<AppState>,
    AuthUser(_): AuthUser,
    PathExtractor(id): PathExtractor<String>,
) -> Result<Json<Event>, Error> {
    Ok(Json(load_event(&app_state, &id).await?))
}

/// Invites users to the caller's event. Only new invitees are notified;
/// those without the app get the shared-plans link by text.
pub async fn invite(
    State(app_state): State<AppState>,
    AuthUser(caller): AuthUser,
    PathExtractor(id): PathExtractor<String>,
    ValidJson(req): ValidJson<InvitationRequest>,
) -> Result<(StatusCode, Json<Vec<Invitation>>), Error> {
    let event = load_event(&app_state, &id).await?;
    if event.creator_id != caller {
        return Err(Error::forbidden("only the creator can invite"));
    }
    let from = load_user(&app_state, &caller).await?;

    let invitees: Vec<String> = req
        .to_users
        .iter()
        .collect::<HashSet<_>>()
        .into_iter()
        .cloned()
        .collect();
    let known = app_state.db.user.get_users_by_ids(&invitees).await?;
    if known.len() != invitees.len() {
        return Err(Error::not_found_with_details("invitee not found"));
    }

    let invitations = app_state
        .db
        .event
        .add_invitations(&event.id, &caller, &req.to_users)
        .await?;
    app_state
        .db
        .user
        .add_points(&caller, Points::SENT_INVITATION)
        .await?;
    debug!("{} invited {} to {}", caller, invitations.len(), event.id);

    let recipients: Vec<String> = invitations.iter().map(|i| i.to_user_id.clone()).collect();
    let message = template::invitation(&from, &event.title);
    app_state
        .notifier
        .notify(
            &recipients,
            &message,
            &NotifyOptions::invitation(&event.id, from),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(invitations)))
}

/// everyone else who saved the event; only savers may look
pub async fn interested(
    State(app_state): State<AppState>,
    AuthUser(caller): AuthUser,
    PathExtractor(id): PathExtractor<String>,
) -> Result<Json<Vec<User>>, Error> {
    let event = load_event(&app_state, &id).await?;
    let savers = app_state.db.event.list_savers(&event.id).await?;
    if !savers.contains(&caller) {
        return Err(Error::forbidden("you aren't interested in this event yet"));
    }
    let others: Vec<String> = savers.into_iter().filter(|id| *id != caller).collect();
    let users = app_state.db.user.get_users_by_ids(&others).await?;
    Ok(Json(users))
}

/// Relays a comment to everyone who saved the event, except its author.
pub async fn comment(
    State(app_state): State<AppState>,
    AuthUser(caller): AuthUser,
    PathExtractor(id): PathExtractor<String>,
    ValidJson(req): ValidJson<CommentRequest>,
) -> Result<StatusCode, Error> {
    let event = load_event(&app_state, &id).await?;
    let savers = app_state.db.event.list_savers(&event.id).await?;
    if event.creator_id != caller && !savers.contains(&caller) {
        return Err(Error::forbidden("you aren't interested in this event yet"));
    }
    let from = load_user(&app_state, &caller).await?;

    let recipients: Vec<String> = savers.into_iter().filter(|id| *id != caller).collect();
    let message = template::event_comment(&from, &event.title, &req.text);
    app_state
        .notifier
        .notify(&recipients, &message, &NotifyOptions::default())
        .await?;
    Ok(StatusCode::OK)
}

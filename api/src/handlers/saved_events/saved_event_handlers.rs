use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::debug;

use abi::errors::Error;
use abi::model::{NotifyOptions, Points, SavedEvent, SavedEventCreate};
use notifier::template;

use crate::api_utils::custom_extract::{AuthUser, ValidJson};
use crate::handlers::events::{load_event, load_user};
use crate::AppState;

/// Marks the caller as interested. Friends who already saved the event
/// hear about it; the caller and the event's creator earn points.
pub async fn save_event(
    State(app_state): State<AppState>,
    AuthUser(caller): AuthUser,
    ValidJson(req): ValidJson<SavedEventCreate>,
) -> Result<(StatusCode, Json<SavedEvent>), Error> {
    let event = load_event(&app_state, &req.event).await?;
    let user = load_user(&app_state, &caller).await?;
    let friend_ids: Vec<String> = app_state
        .db
        .friend
        .list_added_by(&caller)
        .await?
        .into_iter()
        .map(|u| u.id)
        .collect();
    let savers = app_state.db.event.list_savers(&event.id).await?;
    if !event.can_be_saved_by(&caller, &friend_ids, &savers) {
        return Err(Error::forbidden("you don't have access to that event"));
    }

    let saved = app_state
        .db
        .event
        .save_event(&SavedEvent::new(&caller, &event.id))
        .await?;
    app_state
        .db
        .user
        .add_points(&caller, Points::SAVED_EVENT)
        .await?;
    if event.creator_id != caller {
        app_state
            .db
            .user
            .add_points(&event.creator_id, Points::SAVED_EVENT)
            .await?;
    }
    debug!("{} saved {}", caller, event.id);

    let friends_interested: Vec<String> = savers
        .into_iter()
        .filter(|id| friend_ids.contains(id))
        .collect();
    let message = template::also_interested(&user, &event.title);
    app_state
        .notifier
        .notify(&friends_interested, &message, &NotifyOptions::default())
        .await?;

    Ok((StatusCode::CREATED, Json(saved)))
}

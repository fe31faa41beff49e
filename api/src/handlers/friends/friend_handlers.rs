use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::debug;

use abi::errors::Error;
use abi::model::{FriendEdge, FriendRequest, FriendshipCreate, MessageRequest};

use crate::api_utils::custom_extract::{AuthUser, PathExtractor, ValidJson};
use crate::AppState;

// add someone; they get a push or, without the app, a text
pub async fn create_friendship(
    State(app_state): State<AppState>,
    AuthUser(caller): AuthUser,
    ValidJson(req): ValidJson<FriendshipCreate>,
) -> Result<(StatusCode, Json<FriendEdge>), Error> {
    debug!("{} adds {}", caller, req.friend);
    let edge = app_state
        .friend_graph
        .create_edge(&caller, &req.friend)
        .await?;
    Ok((StatusCode::CREATED, Json(edge)))
}

pub async fn delete_friendship(
    State(app_state): State<AppState>,
    AuthUser(caller): AuthUser,
    ValidJson(req): ValidJson<FriendRequest>,
) -> Result<StatusCode, Error> {
    app_state
        .friend_graph
        .delete_edge(&caller, &req.friend)
        .await?;
    Ok(StatusCode::OK)
}

pub async fn send_message(
    State(app_state): State<AppState>,
    AuthUser(caller): AuthUser,
    PathExtractor(friend): PathExtractor<String>,
    ValidJson(req): ValidJson<MessageRequest>,
) -> Result<StatusCode, Error> {
    app_state
        .friend_graph
        .send_message(&caller, &friend, &req.text)
        .await?;
    Ok(StatusCode::CREATED)
}

use axum::extract::State;
use axum::Json;

use abi::errors::Error;
use abi::model::{User, UserUpdate};

use crate::api_utils::custom_extract::{AuthUser, PathExtractor, ValidJson};
use crate::AppState;

pub async fn get_me(
    State(app_state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<User>, Error> {
    get_user(&app_state, &caller).await.map(Json)
}

pub async fn get_user_by_id(
    State(app_state): State<AppState>,
    AuthUser(_): AuthUser,
    PathExtractor(id): PathExtractor<String>,
) -> Result<Json<User>, Error> {
    get_user(&app_state, &id).await.map(Json)
}

/// only the caller may edit themself
pub async fn update_user(
    State(app_state): State<AppState>,
    AuthUser(caller): AuthUser,
    PathExtractor(id): PathExtractor<String>,
    ValidJson(update): ValidJson<UserUpdate>,
) -> Result<Json<User>, Error> {
    if id != caller {
        return Err(Error::forbidden("cannot edit another user"));
    }
    let user = app_state.db.user.update_user(&id, &update).await?;
    Ok(Json(user))
}

/// 200 when the username is taken, 404 when it is free
pub async fn get_user_by_username(
    State(app_state): State<AppState>,
    AuthUser(_): AuthUser,
    PathExtractor(username): PathExtractor<String>,
) -> Result<Json<User>, Error> {
    let user = app_state
        .db
        .user
        .get_user_by_username(&username)
        .await?
        .ok_or(Error::not_found())?;
    Ok(Json(user))
}

pub async fn get_friends(
    State(app_state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<Vec<User>>, Error> {
    let friends = app_state.friend_graph.list_added_by(&caller).await?;
    Ok(Json(friends))
}

pub async fn get_added_me(
    State(app_state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<Vec<User>>, Error> {
    let users = app_state
        .friend_graph
        .list_unreciprocated_incoming(&caller)
        .await?;
    Ok(Json(users))
}

pub async fn get_facebook_friends(
    State(app_state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> Result<Json<Vec<User>>, Error> {
    let friends = app_state.accounts.facebook_friends(&caller).await?;
    Ok(Json(friends))
}

async fn get_user(app_state: &AppState, id: &str) -> Result<User, Error> {
    app_state
        .db
        .user
        .get_user_by_id(id)
        .await?
        .ok_or(Error::not_found())
}

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use abi::errors::Error;
use abi::model::{AccessTokenRequest, AuthCodeRequest, SessionRequest, SessionResponse};

use crate::api_utils::custom_extract::{AuthUser, ValidJson};
use crate::AppState;

/// text a login code to a phone
pub async fn create_auth_code(
    State(app_state): State<AppState>,
    ValidJson(req): ValidJson<AuthCodeRequest>,
) -> Result<StatusCode, Error> {
    app_state.accounts.send_auth_code(&req.phone).await?;
    Ok(StatusCode::CREATED)
}

pub async fn create_session(
    State(app_state): State<AppState>,
    ValidJson(req): ValidJson<SessionRequest>,
) -> Result<Json<SessionResponse>, Error> {
    let session = app_state
        .accounts
        .login_with_code(&req.phone, &req.code)
        .await?;
    Ok(Json(session))
}

pub async fn create_facebook_session(
    State(app_state): State<AppState>,
    ValidJson(req): ValidJson<AccessTokenRequest>,
) -> Result<Json<SessionResponse>, Error> {
    let session = app_state
        .accounts
        .login_with_facebook(&req.access_token)
        .await?;
    Ok(Json(session))
}

/// link facebook to the caller; may answer with a different, merged identity
pub async fn sync_social_account(
    State(app_state): State<AppState>,
    AuthUser(caller): AuthUser,
    ValidJson(req): ValidJson<AccessTokenRequest>,
) -> Result<Json<SessionResponse>, Error> {
    let session = app_state
        .accounts
        .sync_social_account(&caller, &req.access_token)
        .await?;
    Ok(Json(session))
}

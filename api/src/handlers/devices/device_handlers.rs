use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use abi::errors::Error;
use abi::model::{Device, DeviceRegister, Platform};

use crate::api_utils::custom_extract::{AuthUser, ValidJson};
use crate::AppState;

pub async fn register_apns(
    State(app_state): State<AppState>,
    AuthUser(caller): AuthUser,
    ValidJson(req): ValidJson<DeviceRegister>,
) -> Result<(StatusCode, Json<Device>), Error> {
    register(&app_state, caller, Platform::Apns, req).await
}

pub async fn register_gcm(
    State(app_state): State<AppState>,
    AuthUser(caller): AuthUser,
    ValidJson(req): ValidJson<DeviceRegister>,
) -> Result<(StatusCode, Json<Device>), Error> {
    register(&app_state, caller, Platform::Gcm, req).await
}

/// 201 for a new registration, 200 when an existing one moved to the caller
async fn register(
    app_state: &AppState,
    caller: String,
    platform: Platform,
    req: DeviceRegister,
) -> Result<(StatusCode, Json<Device>), Error> {
    let device = Device::new(caller, platform, req);
    let (device, created) = app_state.db.device.upsert(&device).await?;
    if created {
        info!("registered {} device {}", platform, device.id);
        Ok((StatusCode::CREATED, Json(device)))
    } else {
        Ok((StatusCode::OK, Json(device)))
    }
}

use axum::extract::State;
use axum::Json;

use abi::errors::Error;
use abi::model::{ContactsRequest, UserWithPhone};

use crate::api_utils::custom_extract::{AuthUser, ValidJson};
use crate::AppState;

/// every submitted phone comes back with the identity now linked to it
pub async fn import_contacts(
    State(app_state): State<AppState>,
    AuthUser(caller): AuthUser,
    ValidJson(req): ValidJson<ContactsRequest>,
) -> Result<Json<Vec<UserWithPhone>>, Error> {
    let imported = app_state
        .accounts
        .import_contacts(&caller, &req.contacts)
        .await?;
    Ok(Json(imported))
}

use axum::{Extension, Json, extract::State, http::StatusCode};
use buildtrack_db::queries::UserChanges;
use buildtrack_types::api::{ChangePasswordRequest, UpdateProfileRequest};
use buildtrack_types::models::User;
use tracing::info;

use crate::auth::{hash_password, validate_name, validate_password, verify_password};
use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::state::{AppState, run_db};

/// PATCH /profile. Role, email and builder link are not self-service.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<User>> {
    if let Some(first_name) = &req.first_name {
        validate_name(first_name)?;
    }

    let changes = UserChanges {
        first_name: req.first_name,
        last_name: req.last_name,
        phone: req.phone,
        avatar: req.avatar,
        ..Default::default()
    };
    let id = current.id();
    let user = run_db(&state, move |db| db.update_user(id, &changes))
        .await?
        .ok_or(ApiError::Unauthorized)?
        .into_user()?;
    Ok(Json(user))
}

/// POST /profile/password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<StatusCode> {
    validate_password(&req.new_password)?;

    let id = current.id();
    let row = run_db(&state, move |db| db.get_user_by_id(id))
        .await?
        .ok_or(ApiError::Unauthorized)?;
    if !verify_password(&row.password, &req.current_password) {
        return Err(ApiError::bad_request("Current password is incorrect"));
    }

    let hash = hash_password(&req.new_password)?;
    run_db(&state, move |db| db.set_password(id, &hash)).await?;
    info!("User {} changed their password", id);
    Ok(StatusCode::NO_CONTENT)
}

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use buildtrack_db::ProjectScope;
use buildtrack_db::queries::{NewUser, UserChanges};
use buildtrack_types::api::{CreateUserRequest, UpdateUserRequest};
use buildtrack_types::models::{Role, User};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::{email_conflict, ensure_email_free, hash_password, insert_user, validate_email, validate_name, validate_password};
use crate::email;
use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::state::{AppState, notify, run_db};

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub role: Option<Role>,
}

async fn load_user(state: &AppState, id: Uuid) -> ApiResult<User> {
    let user = run_db(state, move |db| db.get_user_by_id(id))
        .await?
        .ok_or(ApiError::NotFound)?
        .into_user()?;
    Ok(user)
}

async fn ensure_builder(state: &AppState, id: Uuid) -> ApiResult<()> {
    let builder = run_db(state, move |db| db.get_user_by_id(id)).await?;
    match builder {
        Some(row) if row.role == Role::Builder.as_str() => Ok(()),
        _ => Err(ApiError::bad_request(format!("{} is not a builder", id))),
    }
}

/// Admins list everyone; builders list the homeowners linked to them.
pub async fn list_users(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<UserListQuery>,
) -> ApiResult<Json<Vec<User>>> {
    let (role, builder_id) = match current.role() {
        Role::Admin => (query.role, None),
        Role::Builder => (Some(Role::Homeowner), Some(current.id())),
        Role::Homeowner => return Err(ApiError::Forbidden),
    };

    let rows = run_db(&state, move |db| db.list_users(role, builder_id)).await?;
    let users = rows
        .into_iter()
        .map(|row| row.into_user())
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<User>> {
    if id == current.id() {
        return Ok(Json(current.0));
    }
    let user = load_user(&state, id).await?;
    let allowed = match current.role() {
        Role::Admin => true,
        Role::Builder => user.builder_id == Some(current.id()),
        Role::Homeowner => false,
    };
    if !allowed {
        return Err(ApiError::Forbidden);
    }
    Ok(Json(user))
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    let builder_id = match current.role() {
        Role::Admin => {
            if let Some(b) = req.builder_id {
                ensure_builder(&state, b).await?;
            }
            req.builder_id
        }
        // Builders may only add homeowners, always linked to themselves.
        Role::Builder if req.role == Role::Homeowner => Some(current.id()),
        _ => return Err(ApiError::Forbidden),
    };
    if builder_id.is_some() && req.role != Role::Homeowner {
        return Err(ApiError::bad_request("Only homeowners can be linked to a builder"));
    }

    validate_email(&req.email)?;
    validate_password(&req.password)?;
    validate_name(&req.first_name)?;
    ensure_email_free(&state, &req.email).await?;

    let new_user = NewUser {
        id: Uuid::new_v4(),
        email: req.email.trim().to_string(),
        password_hash: hash_password(&req.password)?,
        first_name: req.first_name,
        last_name: req.last_name,
        role: req.role,
        phone: req.phone,
        builder_id,
    };
    let user = insert_user(&state, new_user).await?;
    info!("User {} ({}) created by {}", user.email, user.role, current.0.email);

    notify(&state, email::welcome(&user, &state.app_url));
    Ok((StatusCode::CREATED, Json(user)))
}

/// Admin-only edit of any account, including role changes.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    current.require_role(&[Role::Admin])?;
    let existing = load_user(&state, id).await?;

    if let Some(email) = &req.email {
        validate_email(email)?;
        if !email.trim().eq_ignore_ascii_case(&existing.email) {
            ensure_email_free(&state, email).await?;
        }
    }
    if let Some(first_name) = &req.first_name {
        validate_name(first_name)?;
    }
    if id == current.id() && req.role.is_some_and(|r| r != Role::Admin) {
        return Err(ApiError::bad_request("Admins cannot demote themselves"));
    }
    let new_role = req.role.unwrap_or(existing.role);
    if let Some(b) = req.builder_id {
        if b == id {
            return Err(ApiError::bad_request("An account cannot be linked to itself"));
        }
        ensure_builder(&state, b).await?;
        if new_role != Role::Homeowner {
            return Err(ApiError::bad_request("Only homeowners can be linked to a builder"));
        }
    }
    // Projects always belong to a homeowner, so an owner keeps that role
    // until their projects are reassigned or deleted.
    if existing.role == Role::Homeowner && new_role != Role::Homeowner {
        let owned = run_db(&state, move |db| db.list_projects(ProjectScope::Homeowner(id))).await?;
        if !owned.is_empty() {
            return Err(ApiError::Conflict(format!(
                "User owns {} project(s); reassign or delete them first",
                owned.len()
            )));
        }
    }

    let changes = UserChanges {
        email: req.email.map(|e| e.trim().to_string()),
        first_name: req.first_name,
        last_name: req.last_name,
        role: req.role,
        phone: req.phone,
        builder_id: req.builder_id,
        avatar: req.avatar,
    };
    let user = run_db(&state, move |db| db.update_user(id, &changes))
        .await
        .map_err(email_conflict)?
        .ok_or(ApiError::NotFound)?
        .into_user()?;
    if existing.role != user.role {
        info!("User {} role changed from {} to {} by {}", id, existing.role, user.role, current.0.email);
    }
    Ok(Json(user))
}

/// Deletes the account and every project it owns or is assigned to.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    current.require_role(&[Role::Admin])?;
    if id == current.id() {
        return Err(ApiError::bad_request("Admins cannot delete their own account"));
    }

    let deleted = run_db(&state, move |db| db.delete_user(id))
        .await?
        .ok_or(ApiError::NotFound)?;
    state.media.delete_all(&deleted.image_files).await;

    info!(
        "User {} deleted by {} ({} projects, {} images removed)",
        id,
        current.0.email,
        deleted.project_ids.len(),
        deleted.image_files.len()
    );
    Ok(StatusCode::NO_CONTENT)
}

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use buildtrack_db::ProjectScope;
use buildtrack_db::queries::{NewProject, ProjectChanges};
use buildtrack_types::api::{CreateProjectRequest, UpdateProjectRequest};
use buildtrack_types::models::{MAX_PROGRESS, Project, ProjectStatus, Role};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::state::{AppState, run_db};

#[derive(Debug, Deserialize)]
pub struct ProjectListQuery {
    pub status: Option<ProjectStatus>,
}

/// Projects a user can see: everything for admins, assigned projects for
/// builders, owned projects for homeowners.
pub fn scope_for(user: &CurrentUser) -> ProjectScope {
    match user.role() {
        Role::Admin => ProjectScope::All,
        Role::Builder => ProjectScope::Builder(user.id()),
        Role::Homeowner => ProjectScope::Homeowner(user.id()),
    }
}

pub fn can_view(user: &CurrentUser, project: &Project) -> bool {
    match user.role() {
        Role::Admin => true,
        Role::Builder => project.builder_id == Some(user.id()),
        Role::Homeowner => project.homeowner_id == user.id(),
    }
}

/// Edit details and manage photos.
pub fn can_manage(user: &CurrentUser, project: &Project) -> bool {
    match user.role() {
        Role::Admin => true,
        Role::Builder => project.builder_id == Some(user.id()),
        Role::Homeowner => false,
    }
}

/// Load a project, 404 if missing and 403 if the caller may not see it.
pub(crate) async fn load_visible(state: &AppState, user: &CurrentUser, id: Uuid) -> ApiResult<Project> {
    let project = run_db(state, move |db| db.get_project(id))
        .await?
        .ok_or(ApiError::NotFound)?
        .into_project()?;
    if !can_view(user, &project) {
        return Err(ApiError::Forbidden);
    }
    Ok(project)
}

pub(crate) async fn load_managed(state: &AppState, user: &CurrentUser, id: Uuid) -> ApiResult<Project> {
    let project = load_visible(state, user, id).await?;
    if !can_manage(user, &project) {
        return Err(ApiError::Forbidden);
    }
    Ok(project)
}

fn validate_progress(progress: u8) -> ApiResult<()> {
    if progress > MAX_PROGRESS {
        return Err(ApiError::bad_request(format!(
            "Progress must be between 0 and {}",
            MAX_PROGRESS
        )));
    }
    Ok(())
}

fn validate_title(title: &str) -> ApiResult<()> {
    let len = title.trim().chars().count();
    if len == 0 || len > 200 {
        return Err(ApiError::bad_request("Title must be 1-200 characters"));
    }
    Ok(())
}

/// The referenced account must exist and hold `role`.
async fn ensure_role(state: &AppState, id: Uuid, role: Role, what: &str) -> ApiResult<()> {
    let row = run_db(state, move |db| db.get_user_by_id(id)).await?;
    match row {
        Some(row) if row.role == role.as_str() => Ok(()),
        _ => Err(ApiError::bad_request(format!("{} {} is not a {}", what, id, role))),
    }
}

pub async fn list_projects(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<ProjectListQuery>,
) -> ApiResult<Json<Vec<Project>>> {
    let scope = scope_for(&current);
    let rows = run_db(&state, move |db| db.list_projects(scope)).await?;

    let mut projects = Vec::with_capacity(rows.len());
    for row in rows {
        let project = row.into_project()?;
        if query.status.is_none_or(|s| s == project.status) {
            projects.push(project);
        }
    }
    Ok(Json(projects))
}

pub async fn get_project(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Project>> {
    Ok(Json(load_visible(&state, &current, id).await?))
}

pub async fn create_project(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<impl IntoResponse> {
    current.require_role(&[Role::Admin, Role::Builder])?;
    validate_title(&req.title)?;
    validate_progress(req.progress)?;
    ensure_role(&state, req.homeowner_id, Role::Homeowner, "homeowner").await?;

    let builder_id = match current.role() {
        // Builders can only create projects assigned to themselves.
        Role::Builder => {
            if req.builder_id.is_some_and(|b| b != current.id()) {
                return Err(ApiError::Forbidden);
            }
            Some(current.id())
        }
        _ => {
            if let Some(b) = req.builder_id {
                ensure_role(&state, b, Role::Builder, "builder").await?;
            }
            req.builder_id
        }
    };

    let new_project = NewProject {
        id: Uuid::new_v4(),
        title: req.title,
        description: req.description,
        address: req.address,
        status: req.status,
        homeowner_id: req.homeowner_id,
        builder_id,
        progress: req.progress,
    };
    let id = new_project.id;
    let project = run_db(&state, move |db| {
        db.create_project(&new_project)?;
        db.get_project(id)
    })
    .await?
    .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("project {} vanished after insert", id)))?
    .into_project()?;

    info!("Project {} '{}' created by {}", project.id, project.title, current.0.email);
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn update_project(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    load_managed(&state, &current, id).await?;

    if let Some(title) = &req.title {
        validate_title(title)?;
    }
    if let Some(progress) = req.progress {
        validate_progress(progress)?;
    }
    if let Some(homeowner_id) = req.homeowner_id {
        ensure_role(&state, homeowner_id, Role::Homeowner, "homeowner").await?;
    }
    if let Some(builder_id) = req.builder_id {
        // Reassigning a project to another builder is an admin decision.
        if !current.is_admin() && builder_id != current.id() {
            return Err(ApiError::Forbidden);
        }
        ensure_role(&state, builder_id, Role::Builder, "builder").await?;
    }

    let changes = ProjectChanges {
        title: req.title,
        description: req.description,
        address: req.address,
        status: req.status,
        homeowner_id: req.homeowner_id,
        builder_id: req.builder_id,
        progress: req.progress,
        thumbnail: req.thumbnail,
    };
    let project = run_db(&state, move |db| db.update_project(id, &changes))
        .await?
        .ok_or(ApiError::NotFound)?
        .into_project()?;

    Ok(Json(project))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    current.require_role(&[Role::Admin])?;

    let files = run_db(&state, move |db| db.delete_project(id))
        .await?
        .ok_or(ApiError::NotFound)?;
    state.media.delete_all(&files).await;

    info!("Project {} deleted by {} ({} images removed)", id, current.0.email, files.len());
    Ok(StatusCode::NO_CONTENT)
}

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use buildtrack_types::api::{FavoriteListQuery, FavoriteStatus};
use buildtrack_types::models::Favorite;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::projects::load_visible;
use crate::state::{AppState, run_db};

/// The image must exist and sit in a project the caller can see.
async fn check_image(state: &AppState, current: &CurrentUser, image_id: Uuid) -> ApiResult<()> {
    let image = run_db(state, move |db| db.get_image(image_id))
        .await?
        .ok_or(ApiError::NotFound)?
        .into_image()?;
    load_visible(state, current, image.project_id).await?;
    Ok(())
}

/// PUT /favorites/{image_id}
pub async fn add_favorite(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(image_id): Path<Uuid>,
) -> ApiResult<Json<FavoriteStatus>> {
    check_image(&state, &current, image_id).await?;
    let user_id = current.id();
    run_db(&state, move |db| db.add_favorite(user_id, image_id)).await?;
    Ok(Json(FavoriteStatus {
        image_id,
        favorited: true,
    }))
}

/// DELETE /favorites/{image_id}
pub async fn remove_favorite(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(image_id): Path<Uuid>,
) -> ApiResult<Json<FavoriteStatus>> {
    let user_id = current.id();
    run_db(&state, move |db| db.remove_favorite(user_id, image_id)).await?;
    Ok(Json(FavoriteStatus {
        image_id,
        favorited: false,
    }))
}

/// POST /favorites/{image_id}/toggle
pub async fn toggle_favorite(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(image_id): Path<Uuid>,
) -> ApiResult<Json<FavoriteStatus>> {
    check_image(&state, &current, image_id).await?;
    let user_id = current.id();
    let favorited = run_db(&state, move |db| db.toggle_favorite(user_id, image_id)).await?;
    Ok(Json(FavoriteStatus { image_id, favorited }))
}

/// GET /favorites?project_id=
pub async fn list_favorites(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<FavoriteListQuery>,
) -> ApiResult<Json<Vec<Favorite>>> {
    if let Some(project_id) = query.project_id {
        load_visible(&state, &current, project_id).await?;
    }
    let user_id = current.id();
    let rows = run_db(&state, move |db| db.list_favorites(user_id, query.project_id)).await?;

    let favorites = rows
        .into_iter()
        .map(|row| row.into_favorite())
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(Json(favorites))
}

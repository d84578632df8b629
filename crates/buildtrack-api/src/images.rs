use std::collections::BTreeMap;

use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, Query, State, rejection::BytesRejection},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use buildtrack_db::queries::NewImage;
use buildtrack_types::api::{ImageListQuery, UploadImageQuery};
use buildtrack_types::gallery::{self, PeriodFilter};
use buildtrack_types::models::{Project, ProjectImage};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::email;
use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::projects::{can_manage, load_managed, load_visible};
use crate::state::{AppState, notify, run_db};
use crate::storage::MediaStore;

/// 25 MB upload limit per photo
pub const MAX_IMAGE_SIZE: usize = 25 * 1024 * 1024;

const MAX_CAPTION_LEN: usize = 500;

/// Year and month choices for a project's gallery drop-downs.
#[derive(Debug, Serialize)]
pub struct GalleryPeriods {
    pub years: Vec<i32>,
    pub months: BTreeMap<i32, Vec<u32>>,
}

async fn load_images(state: &AppState, project_id: Uuid) -> ApiResult<Vec<ProjectImage>> {
    let rows = run_db(state, move |db| db.list_images(project_id)).await?;
    let mut images = Vec::with_capacity(rows.len());
    for row in rows {
        images.push(row.into_image()?);
    }
    Ok(images)
}

/// GET /projects/{id}/images?year=&month=&category=, newest first.
pub async fn list_images(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(project_id): Path<Uuid>,
    Query(query): Query<ImageListQuery>,
) -> ApiResult<Json<Vec<ProjectImage>>> {
    let period = PeriodFilter::parse(query.year.as_deref(), query.month.as_deref())?;
    load_visible(&state, &current, project_id).await?;

    let mut images = load_images(&state, project_id).await?;
    if let Some(category) = query.category {
        images.retain(|img| img.category == category);
    }
    let mut images = gallery::filter_images(&images, &period);
    gallery::sort_newest_first(&mut images);

    Ok(Json(images))
}

pub async fn gallery_periods(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<GalleryPeriods>> {
    load_visible(&state, &current, project_id).await?;
    let images = load_images(&state, project_id).await?;

    let years = gallery::available_years(&images);
    let months = years
        .iter()
        .map(|&y| (y, gallery::available_months(&images, y)))
        .collect();
    Ok(Json(GalleryPeriods { years, months }))
}

/// POST /projects/{id}/images. Raw image body, `Content-Type` picks the
/// extension. Caption and category come from the query string.
pub async fn upload_image(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(project_id): Path<Uuid>,
    Query(query): Query<UploadImageQuery>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<impl IntoResponse> {
    let project = load_managed(&state, &current, project_id).await?;
    // The route's body limit surfaces here so oversized uploads still get a
    // JSON error.
    let body = body.map_err(|rejection| match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge,
        _ => ApiError::bad_request(rejection.body_text()),
    })?;

    let extension = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(MediaStore::extension_for)
        .ok_or(ApiError::UnsupportedMediaType)?;
    if body.is_empty() {
        return Err(ApiError::bad_request("Empty upload"));
    }
    if body.len() > MAX_IMAGE_SIZE {
        return Err(ApiError::PayloadTooLarge);
    }
    if query.caption.chars().count() > MAX_CAPTION_LEN {
        return Err(ApiError::bad_request("Caption is too long"));
    }

    let image_id = Uuid::new_v4();
    let stored = state
        .media
        .save(project_id, image_id, extension, &body)
        .await?;

    let new_image = NewImage {
        id: image_id,
        project_id,
        url: stored.url.clone(),
        file_name: stored.file_name.clone(),
        caption: query.caption.trim().to_string(),
        category: query.category,
        created_at: Utc::now(),
    };
    let inserted = run_db(&state, move |db| {
        db.insert_image(&new_image)?;
        db.set_thumbnail_if_empty(new_image.project_id, &new_image.url)?;
        db.get_image(new_image.id)
    })
    .await;

    let row = match inserted {
        Ok(Some(row)) => row,
        Ok(None) => {
            state.media.delete_all(&[stored.file_name]).await;
            return Err(ApiError::Internal(anyhow::anyhow!("image {} vanished after insert", image_id)));
        }
        Err(e) => {
            // Don't leave an orphaned file behind.
            state.media.delete_all(&[stored.file_name]).await;
            return Err(e);
        }
    };
    let image = row.into_image()?;

    info!(
        "Image {} uploaded to project {} by {} ({} bytes)",
        image.id,
        project_id,
        current.0.email,
        body.len()
    );

    notify_homeowner(&state, &project, 1).await;

    Ok((StatusCode::CREATED, Json(image)))
}

async fn notify_homeowner(state: &AppState, project: &Project, count: usize) {
    let homeowner_id = project.homeowner_id;
    match run_db(state, move |db| db.get_user_by_id(homeowner_id)).await {
        Ok(Some(row)) => match row.into_user() {
            Ok(homeowner) => notify(state, email::new_photos(&homeowner, project, count, &state.app_url)),
            Err(e) => warn!("Cannot notify homeowner {}: {:#}", homeowner_id, e),
        },
        Ok(None) => warn!("Project {} has no homeowner row", project.id),
        Err(e) => warn!("Homeowner lookup failed: {}", e),
    }
}

pub async fn delete_image(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(image_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let image = run_db(&state, move |db| db.get_image(image_id))
        .await?
        .ok_or(ApiError::NotFound)?
        .into_image()?;
    let project = load_visible(&state, &current, image.project_id).await?;
    if !can_manage(&current, &project) {
        return Err(ApiError::Forbidden);
    }

    let row = run_db(&state, move |db| db.delete_image(image_id))
        .await?
        .ok_or(ApiError::NotFound)?;
    // The row is gone already; a leftover file is only worth a warning.
    state.media.delete_all(&[row.file_name]).await;

    info!("Image {} deleted from project {} by {}", image_id, project.id, current.0.email);
    Ok(StatusCode::NO_CONTENT)
}

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use buildtrack_db::queries::NewLog;
use buildtrack_types::api::{CreateLogRequest, LogQuery};
use buildtrack_types::models::{LogEntry, Role};

use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::state::{AppState, run_db};

const MAX_LOG_PAGE: u32 = 500;
const MAX_MESSAGE_LEN: usize = 4000;

/// POST /logs. Any signed-in client may record an entry.
pub async fn create_log(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<CreateLogRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.message.trim().is_empty() || req.message.len() > MAX_MESSAGE_LEN {
        return Err(ApiError::bad_request("Log message must be 1-4000 bytes"));
    }
    let log = NewLog {
        level: req.level,
        message: req.message,
        context: req.context,
        user_id: Some(current.id()),
    };
    let id = run_db(&state, move |db| db.insert_log(&log)).await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

pub(crate) async fn fetch_logs(state: &AppState, query: LogQuery) -> ApiResult<Vec<LogEntry>> {
    let limit = query.limit.min(MAX_LOG_PAGE);
    let rows = run_db(state, move |db| db.list_logs(limit, query.level)).await?;
    let entries = rows
        .into_iter()
        .map(|row| row.into_entry())
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(entries)
}

/// GET /logs (admins only)
pub async fn list_logs(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<LogQuery>,
) -> ApiResult<Json<Vec<LogEntry>>> {
    current.require_role(&[Role::Admin])?;
    Ok(Json(fetch_logs(&state, query).await?))
}

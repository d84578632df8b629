//! Development helpers, mounted only when dev endpoints are enabled.

use axum::{
    Json,
    extract::{Query, State},
};
use buildtrack_types::api::{LogQuery, TestEmailRequest, TestEmailResponse};
use buildtrack_types::models::LogEntry;
use tracing::{info, warn};

use crate::auth::validate_email;
use crate::email;
use crate::error::ApiResult;
use crate::logs::fetch_logs;
use crate::state::AppState;

/// POST /api/test-email. Sends synchronously so the outcome can be reported.
pub async fn test_email(
    State(state): State<AppState>,
    Json(req): Json<TestEmailRequest>,
) -> ApiResult<Json<TestEmailResponse>> {
    validate_email(&req.to)?;
    let provider = state.mailer.provider().to_string();

    let response = match state.mailer.send(&email::test_message(&req.to)).await {
        Ok(()) => {
            info!("Test email sent to {} via {}", req.to, provider);
            TestEmailResponse {
                sent: true,
                provider,
                detail: None,
            }
        }
        Err(e) => {
            warn!("Test email to {} failed: {:#}", req.to, e);
            TestEmailResponse {
                sent: false,
                provider,
                detail: Some(format!("{:#}", e)),
            }
        }
    };
    Ok(Json(response))
}

/// GET /api/logs
pub async fn recent_logs(
    State(state): State<AppState>,
    Query(query): Query<LogQuery>,
) -> ApiResult<Json<Vec<LogEntry>>> {
    Ok(Json(fetch_logs(&state, query).await?))
}

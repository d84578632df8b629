use std::sync::Arc;

use buildtrack_db::Database;
use buildtrack_db::queries::NewLog;
use buildtrack_types::models::LogLevel;
use tracing::{error, warn};

use crate::email::{Email, Mailer};
use crate::error::{ApiError, ApiResult};
use crate::storage::MediaStore;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub media: MediaStore,
    pub mailer: Mailer,
    /// Frontend base URL used in links inside emails.
    pub app_url: String,
    pub dev_endpoints: bool,
}

/// Run blocking DB work off the async runtime.
pub async fn run_db<F, T>(state: &AppState, f: F) -> ApiResult<T>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow::anyhow!("blocking task failed"))
        })?
        .map_err(ApiError::from)
}

/// Send an email in the background. Failures are logged and recorded in the
/// logs table but never reach the caller.
pub fn notify(state: &AppState, email: Email) {
    let state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = state.mailer.send(&email).await {
            warn!("Email '{}' to {} failed: {:#}", email.subject, email.to, e);
            let log = NewLog {
                level: LogLevel::Error,
                message: format!("email delivery failed: {}", email.subject),
                context: Some(serde_json::json!({ "to": email.to, "error": format!("{:#}", e) })),
                user_id: None,
            };
            if let Err(e) = run_db(&state, move |db| db.insert_log(&log)).await {
                warn!("Could not record email failure: {}", e);
            }
        }
    });
}

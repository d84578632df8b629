use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use buildtrack_types::models::{Role, User};
use uuid::Uuid;

use crate::auth::decode_token;
use crate::error::{ApiError, ApiResult};
use crate::state::{AppState, run_db};

/// The signed-in user, freshly loaded for this request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> Uuid {
        self.0.id
    }

    pub fn role(&self) -> Role {
        self.0.role
    }

    pub fn is_admin(&self) -> bool {
        self.0.role == Role::Admin
    }

    /// Reject callers whose role is not in `allowed`.
    pub fn require_role(&self, allowed: &[Role]) -> ApiResult<()> {
        if allowed.contains(&self.0.role) {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

/// Validate the bearer token and load the user it names.
///
/// A token for a deleted user is treated like a bad token so the client
/// drops its session.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    let claims = decode_token(&state.jwt_secret, token).map_err(|_| ApiError::Unauthorized)?;

    let user_id = claims.sub;
    let user = run_db(&state, move |db| db.get_user_by_id(user_id))
        .await?
        .ok_or(ApiError::Unauthorized)?
        .into_user()?;

    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}

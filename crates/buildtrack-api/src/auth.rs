use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use buildtrack_db::{Database, is_unique_violation};
use buildtrack_db::queries::NewUser;
use buildtrack_types::api::{
    AuthResponse, Claims, LoginRequest, PasswordResetConfirm, PasswordResetRequest, SignupRequest,
};
use buildtrack_types::models::{Role, User};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use crate::email;
use crate::error::{ApiError, ApiResult};
use crate::middleware::CurrentUser;
use crate::state::{AppState, notify, run_db};

const MIN_PASSWORD_LEN: usize = 8;
const TOKEN_TTL_DAYS: i64 = 30;
const RESET_TTL_MINUTES: i64 = 60;
const EMAIL_TAKEN: &str = "Email is already registered";

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_email(&req.email)?;
    validate_password(&req.password)?;
    validate_name(&req.first_name)?;

    ensure_email_free(&state, &req.email).await?;

    // Public signup only ever creates homeowners.
    let new_user = NewUser {
        id: Uuid::new_v4(),
        email: req.email.trim().to_string(),
        password_hash: hash_password(&req.password)?,
        first_name: req.first_name,
        last_name: req.last_name,
        role: Role::Homeowner,
        phone: req.phone,
        builder_id: None,
    };
    let user = insert_user(&state, new_user).await?;
    info!("New homeowner signed up: {}", user.email);

    notify(&state, email::welcome(&user, &state.app_url));

    let token = create_token(&state.jwt_secret, &user)?;
    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let email = req.email.trim().to_string();
    let row = run_db(&state, move |db| db.get_user_by_email(&email))
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !verify_password(&row.password, &req.password) {
        return Err(ApiError::Unauthorized);
    }

    let user = row.into_user()?;
    let token = create_token(&state.jwt_secret, &user)?;
    Ok(Json(AuthResponse { token, user }))
}

pub async fn me(Extension(current): Extension<CurrentUser>) -> Json<User> {
    Json(current.0)
}

/// Always answers 202 so the endpoint does not reveal which emails exist.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetRequest>,
) -> ApiResult<StatusCode> {
    let email = req.email.trim().to_string();
    let Some(row) = run_db(&state, move |db| db.get_user_by_email(&email)).await? else {
        info!("Password reset requested for unknown email");
        return Ok(StatusCode::ACCEPTED);
    };
    let user = row.into_user()?;

    let token = URL_SAFE_NO_PAD.encode(rand::random::<[u8; 32]>());
    let token_hash = hash_reset_token(&token);
    let expires_at = Utc::now() + chrono::Duration::minutes(RESET_TTL_MINUTES);
    let user_id = user.id;
    run_db(&state, move |db| db.create_password_reset(&token_hash, user_id, expires_at)).await?;

    let link = format!("{}/reset-password?token={}", state.app_url, token);
    notify(&state, email::password_reset(&user, &link));
    info!("Password reset issued for user {}", user.id);

    Ok(StatusCode::ACCEPTED)
}

pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetConfirm>,
) -> ApiResult<StatusCode> {
    validate_password(&req.new_password)?;

    let token_hash = hash_reset_token(&req.token);
    let user_id = run_db(&state, move |db| db.consume_password_reset(&token_hash, Utc::now()))
        .await?
        .ok_or_else(|| ApiError::bad_request("Invalid or expired reset token"))?;

    let password_hash = hash_password(&req.new_password)?;
    run_db(&state, move |db| db.set_password(user_id, &password_hash)).await?;
    info!("Password reset completed for user {}", user_id);

    Ok(StatusCode::NO_CONTENT)
}

/// Create the bootstrap admin if no account uses `email` yet.
/// Returns true when an account was created.
pub fn bootstrap_admin(db: &Database, email: &str, password: &str) -> anyhow::Result<bool> {
    if db.get_user_by_email(email)?.is_some() {
        return Ok(false);
    }
    if password.len() < MIN_PASSWORD_LEN {
        anyhow::bail!("Bootstrap admin password must be at least {} characters", MIN_PASSWORD_LEN);
    }
    db.create_user(&NewUser {
        id: Uuid::new_v4(),
        email: email.to_string(),
        password_hash: hash_password(password).map_err(|_| anyhow::anyhow!("Failed to hash password"))?,
        first_name: "Admin".into(),
        last_name: String::new(),
        role: Role::Admin,
        phone: None,
        builder_id: None,
    })?;
    info!("Created bootstrap admin {}", email);
    Ok(true)
}

// -- Shared helpers --

pub(crate) async fn ensure_email_free(state: &AppState, email: &str) -> ApiResult<()> {
    let email = email.trim().to_string();
    if run_db(state, move |db| db.get_user_by_email(&email)).await?.is_some() {
        return Err(ApiError::Conflict(EMAIL_TAKEN.into()));
    }
    Ok(())
}

/// Concurrent requests can both pass `ensure_email_free`; the unique index
/// on `users.email` decides, and the loser gets a 409.
pub(crate) fn email_conflict(err: ApiError) -> ApiError {
    match err {
        ApiError::Internal(e) if is_unique_violation(&e) => ApiError::Conflict(EMAIL_TAKEN.into()),
        other => other,
    }
}

pub(crate) async fn insert_user(state: &AppState, new_user: NewUser) -> ApiResult<User> {
    let id = new_user.id;
    let row = run_db(state, move |db| {
        db.create_user(&new_user)?;
        db.get_user_by_id(id)
    })
    .await
    .map_err(email_conflict)?
    .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("user {} vanished after insert", id)))?;
    Ok(row.into_user()?)
}

pub(crate) fn validate_email(email: &str) -> ApiResult<()> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };
    if !valid || email.len() > 254 {
        return Err(ApiError::bad_request("Invalid email address"));
    }
    Ok(())
}

pub(crate) fn validate_password(password: &str) -> ApiResult<()> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub(crate) fn validate_name(first_name: &str) -> ApiResult<()> {
    let len = first_name.trim().chars().count();
    if len == 0 || len > 100 {
        return Err(ApiError::bad_request("First name is required"));
    }
    Ok(())
}

/// Hash a password with Argon2id.
pub(crate) fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("password hashing failed: {}", e)))?
        .to_string();
    Ok(hash)
}

pub(crate) fn verify_password(stored_hash: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Only the digest of a reset token is stored.
fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

pub fn create_token(secret: &str, user: &User) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role,
        exp: (Utc::now() + chrono::Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn decode_token(secret: &str, token: &str) -> anyhow::Result<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

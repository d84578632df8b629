use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ImageCategory, LogLevel, ProjectStatus, Role, User};

// -- JWT Claims --

/// JWT claims issued at login. The role is informational; the auth middleware
/// reloads the user row on every request so role changes apply immediately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PasswordResetConfirm {
    pub token: String,
    pub new_password: String,
}

// -- Profile --

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// -- Users --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub role: Role,
    pub phone: Option<String>,
    pub builder_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<Role>,
    pub phone: Option<String>,
    pub builder_id: Option<Uuid>,
    pub avatar: Option<String>,
}

// -- Projects --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateProjectRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub status: ProjectStatus,
    pub homeowner_id: Uuid,
    pub builder_id: Option<Uuid>,
    #[serde(default)]
    pub progress: u8,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub status: Option<ProjectStatus>,
    pub homeowner_id: Option<Uuid>,
    pub builder_id: Option<Uuid>,
    pub progress: Option<u8>,
    pub thumbnail: Option<String>,
}

// -- Images --

#[derive(Debug, Default, Deserialize)]
pub struct UploadImageQuery {
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub category: ImageCategory,
}

#[derive(Debug, Default, Deserialize)]
pub struct ImageListQuery {
    pub year: Option<String>,
    pub month: Option<String>,
    pub category: Option<ImageCategory>,
}

// -- Favorites --

#[derive(Debug, Serialize, Deserialize)]
pub struct FavoriteStatus {
    pub image_id: Uuid,
    pub favorited: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct FavoriteListQuery {
    pub project_id: Option<Uuid>,
}

// -- Logs --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateLogRequest {
    pub level: LogLevel,
    pub message: String,
    pub context: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct LogQuery {
    #[serde(default = "default_log_limit")]
    pub limit: u32,
    pub level: Option<LogLevel>,
}

fn default_log_limit() -> u32 {
    100
}

// -- Dev --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestEmailRequest {
    pub to: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TestEmailResponse {
    pub sent: bool,
    pub provider: String,
    pub detail: Option<String>,
}

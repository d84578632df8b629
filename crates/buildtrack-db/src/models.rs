//! Database row types. These map directly to SQLite rows and are kept apart
//! from the buildtrack-types API models so the DB layer stays independent.
//! The `into_*` conversions are where stored text is validated.

use anyhow::{Context, Result};
use buildtrack_types::models::{
    Favorite, LogEntry, Project, ProjectImage, User, display_name,
};
use uuid::Uuid;

use crate::parse_timestamp;

fn parse_id(raw: &str, what: &str) -> Result<Uuid> {
    raw.parse()
        .with_context(|| format!("Corrupt {} '{}'", what, raw))
}

fn parse_opt_id(raw: Option<&str>, what: &str) -> Result<Option<Uuid>> {
    raw.map(|r| parse_id(r, what)).transpose()
}

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub phone: Option<String>,
    pub builder_id: Option<String>,
    pub avatar: Option<String>,
    pub created_at: String,
}

impl UserRow {
    pub fn into_user(self) -> Result<User> {
        Ok(User {
            id: parse_id(&self.id, "user id")?,
            name: display_name(&self.first_name, &self.last_name),
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            role: self.role.parse()?,
            phone: self.phone,
            builder_id: parse_opt_id(self.builder_id.as_deref(), "builder id")?,
            avatar: self.avatar,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ProjectRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub address: String,
    pub status: String,
    pub homeowner_id: String,
    /// Joined from users; empty if the homeowner row is gone.
    pub homeowner_name: String,
    pub builder_id: Option<String>,
    pub progress: i64,
    pub thumbnail: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl ProjectRow {
    pub fn into_project(self) -> Result<Project> {
        Ok(Project {
            id: parse_id(&self.id, "project id")?,
            title: self.title,
            description: self.description,
            address: self.address,
            status: self.status.parse()?,
            homeowner_id: parse_id(&self.homeowner_id, "homeowner id")?,
            homeowner_name: self.homeowner_name,
            builder_id: parse_opt_id(self.builder_id.as_deref(), "builder id")?,
            progress: u8::try_from(self.progress)
                .with_context(|| format!("Corrupt progress {}", self.progress))?,
            thumbnail: self.thumbnail,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ImageRow {
    pub id: String,
    pub project_id: String,
    pub url: String,
    /// Path of the stored object relative to the media root.
    pub file_name: String,
    pub caption: String,
    pub category: String,
    pub created_at: String,
}

impl ImageRow {
    pub fn into_image(self) -> Result<ProjectImage> {
        Ok(ProjectImage {
            id: parse_id(&self.id, "image id")?,
            project_id: parse_id(&self.project_id, "project id")?,
            url: self.url,
            caption: self.caption,
            category: self.category.parse()?,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct FavoriteRow {
    pub user_id: String,
    pub image_id: String,
    pub project_id: String,
    pub created_at: String,
}

impl FavoriteRow {
    pub fn into_favorite(self) -> Result<Favorite> {
        Ok(Favorite {
            user_id: parse_id(&self.user_id, "user id")?,
            image_id: parse_id(&self.image_id, "image id")?,
            project_id: parse_id(&self.project_id, "project id")?,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct LogRow {
    pub id: String,
    pub level: String,
    pub message: String,
    pub context: Option<String>,
    pub user_id: Option<String>,
    pub created_at: String,
}

impl LogRow {
    pub fn into_entry(self) -> Result<LogEntry> {
        let context = self
            .context
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .context("Corrupt log context")?;
        Ok(LogEntry {
            id: parse_id(&self.id, "log id")?,
            level: self.level.parse()?,
            message: self.message,
            context,
            user_id: parse_opt_id(self.user_id.as_deref(), "user id")?,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

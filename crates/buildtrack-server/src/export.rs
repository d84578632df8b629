//! Whole-database snapshot used by the `buildtrack-export` binary.

use std::path::Path;

use anyhow::{Result, bail};
use buildtrack_db::{Database, ProjectScope};
use buildtrack_types::models::{Favorite, Project, ProjectImage, User};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Open an existing database. Unlike `Database::open`, a missing file is an
/// error instead of a fresh empty database.
pub fn open_existing(path: &Path) -> Result<Database> {
    if !path.is_file() {
        bail!("Database {} does not exist", path.display());
    }
    Database::open(path)
}

#[derive(Debug, Serialize)]
pub struct Snapshot {
    pub exported_at: DateTime<Utc>,
    pub users: Vec<User>,
    pub projects: Vec<Project>,
    pub images: Vec<ProjectImage>,
    pub favorites: Vec<Favorite>,
}

impl Snapshot {
    /// Password hashes never leave the database: users go through the
    /// public `User` model.
    pub fn collect(db: &Database) -> Result<Self> {
        let users = db
            .list_users(None, None)?
            .into_iter()
            .map(|row| row.into_user())
            .collect::<Result<Vec<_>>>()?;
        let projects = db
            .list_projects(ProjectScope::All)?
            .into_iter()
            .map(|row| row.into_project())
            .collect::<Result<Vec<_>>>()?;
        let images = db
            .list_all_images()?
            .into_iter()
            .map(|row| row.into_image())
            .collect::<Result<Vec<_>>>()?;
        let favorites = db
            .list_all_favorites()?
            .into_iter()
            .map(|row| row.into_favorite())
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            exported_at: Utc::now(),
            users,
            projects,
            images,
            favorites,
        })
    }
}

use anyhow::Result;
use buildtrack_types::models::{ImageCategory, LogLevel, ProjectStatus, Role};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use uuid::Uuid;

use crate::models::{FavoriteRow, ImageRow, LogRow, ProjectRow, UserRow};
use crate::{Database, format_timestamp, parse_timestamp};

const USER_COLUMNS: &str =
    "id, email, password, first_name, last_name, role, phone, builder_id, avatar, created_at";

const PROJECT_SELECT: &str = "SELECT p.id, p.title, p.description, p.address, p.status, p.homeowner_id,
            u.first_name, u.last_name, p.builder_id, p.progress, p.thumbnail, p.created_at, p.updated_at
     FROM projects p
     LEFT JOIN users u ON p.homeowner_id = u.id";

const IMAGE_COLUMNS: &str = "id, project_id, url, file_name, caption, category, created_at";

/// Which projects a caller may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectScope {
    All,
    Builder(Uuid),
    Homeowner(Uuid),
}

pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub phone: Option<String>,
    pub builder_id: Option<Uuid>,
}

/// Fields left as `None` keep their stored value.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<Role>,
    pub phone: Option<String>,
    pub builder_id: Option<Uuid>,
    pub avatar: Option<String>,
}

/// What a user deletion took with it.
#[derive(Debug, Default)]
pub struct DeletedUser {
    pub project_ids: Vec<String>,
    /// Stored media of the removed projects, relative to the media root.
    pub image_files: Vec<String>,
}

pub struct NewProject {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub address: String,
    pub status: ProjectStatus,
    pub homeowner_id: Uuid,
    pub builder_id: Option<Uuid>,
    pub progress: u8,
}

#[derive(Debug, Default)]
pub struct ProjectChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub status: Option<ProjectStatus>,
    pub homeowner_id: Option<Uuid>,
    pub builder_id: Option<Uuid>,
    pub progress: Option<u8>,
    pub thumbnail: Option<String>,
}

pub struct NewImage {
    pub id: Uuid,
    pub project_id: Uuid,
    pub url: String,
    pub file_name: String,
    pub caption: String,
    pub category: ImageCategory,
    pub created_at: DateTime<Utc>,
}

pub struct NewLog {
    pub level: LogLevel,
    pub message: String,
    pub context: Option<serde_json::Value>,
    pub user_id: Option<Uuid>,
}

impl Database {
    // -- Users --

    pub fn create_user(&self, user: &NewUser) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, email, password, first_name, last_name, role, phone, builder_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    user.id.to_string(),
                    user.email.trim(),
                    user.password_hash,
                    user.first_name.trim(),
                    user.last_name.trim(),
                    user.role.as_str(),
                    user.phone,
                    user.builder_id.map(|id| id.to_string()),
                    format_timestamp(Utc::now()),
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_id(&self, id: Uuid) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", &id.to_string()))
    }

    /// Emails compare case-insensitively.
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email.trim()))
    }

    pub fn list_users(&self, role: Option<Role>, builder_id: Option<Uuid>) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {USER_COLUMNS} FROM users
                 WHERE (?1 IS NULL OR role = ?1) AND (?2 IS NULL OR builder_id = ?2)
                 ORDER BY created_at DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(
                    params![role.map(|r| r.as_str()), builder_id.map(|id| id.to_string())],
                    map_user,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Read-modify-write in one transaction. Returns `None` if the user does
    /// not exist.
    ///
    /// Only homeowners keep a builder link. When an account stops being a
    /// builder it is unassigned from its projects and its homeowners are
    /// unlinked.
    pub fn update_user(&self, id: Uuid, changes: &UserChanges) -> Result<Option<UserRow>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let Some(mut row) = query_user(&tx, "id", &id.to_string())? else {
                return Ok(None);
            };
            let was_builder = row.role == Role::Builder.as_str();

            if let Some(email) = &changes.email {
                row.email = email.trim().to_string();
            }
            if let Some(first_name) = &changes.first_name {
                row.first_name = first_name.trim().to_string();
            }
            if let Some(last_name) = &changes.last_name {
                row.last_name = last_name.trim().to_string();
            }
            if let Some(role) = changes.role {
                row.role = role.as_str().to_string();
            }
            if let Some(phone) = &changes.phone {
                row.phone = non_empty(phone);
            }
            if let Some(builder_id) = changes.builder_id {
                row.builder_id = Some(builder_id.to_string());
            }
            if let Some(avatar) = &changes.avatar {
                row.avatar = non_empty(avatar);
            }
            if row.role != Role::Homeowner.as_str() {
                row.builder_id = None;
            }

            if was_builder && row.role != Role::Builder.as_str() {
                tx.execute(
                    "UPDATE projects SET builder_id = NULL, updated_at = ?2 WHERE builder_id = ?1",
                    params![row.id, format_timestamp(Utc::now())],
                )?;
                tx.execute("UPDATE users SET builder_id = NULL WHERE builder_id = ?1", [&row.id])?;
            }

            tx.execute(
                "UPDATE users SET email = ?2, first_name = ?3, last_name = ?4, role = ?5,
                     phone = ?6, builder_id = ?7, avatar = ?8
                 WHERE id = ?1",
                params![
                    row.id,
                    row.email,
                    row.first_name,
                    row.last_name,
                    row.role,
                    row.phone,
                    row.builder_id,
                    row.avatar,
                ],
            )?;
            tx.commit()?;
            Ok(Some(row))
        })
    }

    pub fn set_password(&self, id: Uuid, password_hash: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE users SET password = ?2 WHERE id = ?1",
                params![id.to_string(), password_hash],
            )?;
            Ok(n > 0)
        })
    }

    /// Delete a user along with every project they own or are assigned to.
    /// Images and favorites of those projects go with them via cascade.
    pub fn delete_user(&self, id: Uuid) -> Result<Option<DeletedUser>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let uid = id.to_string();

            let exists = tx
                .query_row("SELECT 1 FROM users WHERE id = ?1", [&uid], |_| Ok(()))
                .optional()?
                .is_some();
            if !exists {
                return Ok(None);
            }

            let project_ids: Vec<String> = {
                let mut stmt = tx.prepare(
                    "SELECT id FROM projects WHERE homeowner_id = ?1 OR builder_id = ?1",
                )?;
                stmt.query_map([&uid], |row| row.get(0))?
                    .collect::<std::result::Result<Vec<_>, _>>()?
            };

            let image_files: Vec<String> = {
                let mut stmt = tx.prepare(
                    "SELECT i.file_name FROM project_images i
                     JOIN projects p ON i.project_id = p.id
                     WHERE p.homeowner_id = ?1 OR p.builder_id = ?1",
                )?;
                stmt.query_map([&uid], |row| row.get(0))?
                    .collect::<std::result::Result<Vec<_>, _>>()?
            };

            tx.execute(
                "DELETE FROM projects WHERE homeowner_id = ?1 OR builder_id = ?1",
                [&uid],
            )?;
            tx.execute("DELETE FROM users WHERE id = ?1", [&uid])?;
            tx.commit()?;

            Ok(Some(DeletedUser {
                project_ids,
                image_files,
            }))
        })
    }

    // -- Projects --

    pub fn create_project(&self, project: &NewProject) -> Result<()> {
        self.with_conn(|conn| {
            let now = format_timestamp(Utc::now());
            conn.execute(
                "INSERT INTO projects (id, title, description, address, status, homeowner_id, builder_id, progress, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
                params![
                    project.id.to_string(),
                    project.title.trim(),
                    project.description,
                    project.address,
                    project.status.as_str(),
                    project.homeowner_id.to_string(),
                    project.builder_id.map(|id| id.to_string()),
                    project.progress,
                    now,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_project(&self, id: Uuid) -> Result<Option<ProjectRow>> {
        self.with_conn(|conn| query_project(conn, &id.to_string()))
    }

    pub fn list_projects(&self, scope: ProjectScope) -> Result<Vec<ProjectRow>> {
        self.with_conn(|conn| {
            let (filter, owner) = match scope {
                ProjectScope::All => ("", None),
                ProjectScope::Builder(id) => ("WHERE p.builder_id = ?1", Some(id.to_string())),
                ProjectScope::Homeowner(id) => ("WHERE p.homeowner_id = ?1", Some(id.to_string())),
            };
            let sql = format!("{PROJECT_SELECT} {filter} ORDER BY p.updated_at DESC");
            let mut stmt = conn.prepare(&sql)?;
            let rows = match owner {
                Some(owner) => stmt.query_map([owner], map_project)?,
                None => stmt.query_map([], map_project)?,
            }
            .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Read-modify-write, bumping `updated_at`. Last write wins.
    pub fn update_project(&self, id: Uuid, changes: &ProjectChanges) -> Result<Option<ProjectRow>> {
        self.with_conn(|conn| {
            let pid = id.to_string();
            let Some(mut row) = query_project(conn, &pid)? else {
                return Ok(None);
            };

            if let Some(title) = &changes.title {
                row.title = title.trim().to_string();
            }
            if let Some(description) = &changes.description {
                row.description = description.clone();
            }
            if let Some(address) = &changes.address {
                row.address = address.clone();
            }
            if let Some(status) = changes.status {
                row.status = status.as_str().to_string();
            }
            if let Some(homeowner_id) = changes.homeowner_id {
                row.homeowner_id = homeowner_id.to_string();
            }
            if let Some(builder_id) = changes.builder_id {
                row.builder_id = Some(builder_id.to_string());
            }
            if let Some(progress) = changes.progress {
                row.progress = i64::from(progress);
            }
            if let Some(thumbnail) = &changes.thumbnail {
                row.thumbnail = non_empty(thumbnail);
            }

            conn.execute(
                "UPDATE projects SET title = ?2, description = ?3, address = ?4, status = ?5,
                     homeowner_id = ?6, builder_id = ?7, progress = ?8, thumbnail = ?9, updated_at = ?10
                 WHERE id = ?1",
                params![
                    pid,
                    row.title,
                    row.description,
                    row.address,
                    row.status,
                    row.homeowner_id,
                    row.builder_id,
                    row.progress,
                    row.thumbnail,
                    format_timestamp(Utc::now()),
                ],
            )?;

            // Re-read so the joined homeowner name follows a reassignment.
            query_project(conn, &pid)
        })
    }

    /// Returns the stored media of the deleted project, or `None` if there
    /// was no such project.
    pub fn delete_project(&self, id: Uuid) -> Result<Option<Vec<String>>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let pid = id.to_string();
            let files: Vec<String> = {
                let mut stmt = tx.prepare("SELECT file_name FROM project_images WHERE project_id = ?1")?;
                stmt.query_map([&pid], |row| row.get(0))?
                    .collect::<std::result::Result<Vec<_>, _>>()?
            };
            let n = tx.execute("DELETE FROM projects WHERE id = ?1", [&pid])?;
            tx.commit()?;
            Ok((n > 0).then_some(files))
        })
    }

    pub fn set_thumbnail_if_empty(&self, id: Uuid, url: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE projects SET thumbnail = ?2 WHERE id = ?1 AND (thumbnail IS NULL OR thumbnail = '')",
                params![id.to_string(), url],
            )?;
            Ok(n > 0)
        })
    }

    // -- Images --

    pub fn insert_image(&self, image: &NewImage) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO project_images (id, project_id, url, file_name, caption, category, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    image.id.to_string(),
                    image.project_id.to_string(),
                    image.url,
                    image.file_name,
                    image.caption,
                    image.category.as_str(),
                    format_timestamp(image.created_at),
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_image(&self, id: Uuid) -> Result<Option<ImageRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {IMAGE_COLUMNS} FROM project_images WHERE id = ?1");
            let row = conn.query_row(&sql, [id.to_string()], map_image).optional()?;
            Ok(row)
        })
    }

    /// Newest first.
    pub fn list_images(&self, project_id: Uuid) -> Result<Vec<ImageRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {IMAGE_COLUMNS} FROM project_images WHERE project_id = ?1 ORDER BY created_at DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([project_id.to_string()], map_image)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_all_images(&self) -> Result<Vec<ImageRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {IMAGE_COLUMNS} FROM project_images ORDER BY created_at");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], map_image)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Removes the image row and clears it as thumbnail if it was one.
    pub fn delete_image(&self, id: Uuid) -> Result<Option<ImageRow>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let sql = format!("SELECT {IMAGE_COLUMNS} FROM project_images WHERE id = ?1");
            let Some(row) = tx.query_row(&sql, [id.to_string()], map_image).optional()? else {
                return Ok(None);
            };
            tx.execute("DELETE FROM project_images WHERE id = ?1", [&row.id])?;
            tx.execute(
                "UPDATE projects SET thumbnail = NULL WHERE id = ?1 AND thumbnail = ?2",
                params![row.project_id, row.url],
            )?;
            tx.commit()?;
            Ok(Some(row))
        })
    }

    // -- Favorites --

    /// Idempotent. Returns true if a row was inserted.
    pub fn add_favorite(&self, user_id: Uuid, image_id: Uuid) -> Result<bool> {
        self.with_conn(|conn| insert_favorite(conn, &user_id.to_string(), &image_id.to_string()))
    }

    /// Idempotent. Returns true if a row was removed.
    pub fn remove_favorite(&self, user_id: Uuid, image_id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "DELETE FROM favorites WHERE user_id = ?1 AND image_id = ?2",
                params![user_id.to_string(), image_id.to_string()],
            )?;
            Ok(n > 0)
        })
    }

    /// Toggle a favorite: removes if it exists, inserts if not.
    /// Returns the membership after the toggle.
    pub fn toggle_favorite(&self, user_id: Uuid, image_id: Uuid) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let (uid, iid) = (user_id.to_string(), image_id.to_string());

            let removed = tx.execute(
                "DELETE FROM favorites WHERE user_id = ?1 AND image_id = ?2",
                params![uid, iid],
            )?;
            let favorited = if removed > 0 {
                false
            } else {
                insert_favorite(&tx, &uid, &iid)?
            };

            tx.commit()?;
            Ok(favorited)
        })
    }

    pub fn is_favorite(&self, user_id: Uuid, image_id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row(
                    "SELECT 1 FROM favorites WHERE user_id = ?1 AND image_id = ?2",
                    params![user_id.to_string(), image_id.to_string()],
                    |_| Ok(()),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    pub fn list_favorites(&self, user_id: Uuid, project_id: Option<Uuid>) -> Result<Vec<FavoriteRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, image_id, project_id, created_at FROM favorites
                 WHERE user_id = ?1 AND (?2 IS NULL OR project_id = ?2)
                 ORDER BY created_at DESC",
            )?;
            let rows = stmt
                .query_map(
                    params![user_id.to_string(), project_id.map(|id| id.to_string())],
                    map_favorite,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_all_favorites(&self) -> Result<Vec<FavoriteRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, image_id, project_id, created_at FROM favorites ORDER BY created_at",
            )?;
            let rows = stmt
                .query_map([], map_favorite)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Logs --

    pub fn insert_log(&self, log: &NewLog) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let context = log.context.as_ref().map(serde_json::to_string).transpose()?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO logs (id, level, message, context, user_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id.to_string(),
                    log.level.as_str(),
                    log.message,
                    context,
                    log.user_id.map(|u| u.to_string()),
                    format_timestamp(Utc::now()),
                ],
            )?;
            Ok(())
        })?;
        Ok(id)
    }

    /// Newest first.
    pub fn list_logs(&self, limit: u32, level: Option<LogLevel>) -> Result<Vec<LogRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, level, message, context, user_id, created_at FROM logs
                 WHERE (?1 IS NULL OR level = ?1)
                 ORDER BY created_at DESC
                 LIMIT ?2",
            )?;
            let rows = stmt
                .query_map(params![level.map(|l| l.as_str()), limit], |row| {
                    Ok(LogRow {
                        id: row.get(0)?,
                        level: row.get(1)?,
                        message: row.get(2)?,
                        context: row.get(3)?,
                        user_id: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Password resets --

    pub fn create_password_reset(
        &self,
        token_hash: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let uid = user_id.to_string();
            // Spent and expired tokens for this user are of no further use.
            tx.execute(
                "DELETE FROM password_resets WHERE user_id = ?1 AND (used = 1 OR expires_at <= ?2)",
                params![uid, format_timestamp(Utc::now())],
            )?;
            tx.execute(
                "INSERT INTO password_resets (token_hash, user_id, expires_at) VALUES (?1, ?2, ?3)",
                params![token_hash, uid, format_timestamp(expires_at)],
            )?;
            tx.commit()?;
            Ok(())
        })
    }

    /// Mark a reset token used and return its user, if it is unused and not
    /// expired at `now`.
    pub fn consume_password_reset(&self, token_hash: &str, now: DateTime<Utc>) -> Result<Option<Uuid>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let found: Option<(String, String, bool)> = tx
                .query_row(
                    "SELECT user_id, expires_at, used FROM password_resets WHERE token_hash = ?1",
                    [token_hash],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                )
                .optional()?;

            let Some((user_id, expires_at, used)) = found else {
                return Ok(None);
            };
            if used || parse_timestamp(&expires_at)? <= now {
                return Ok(None);
            }

            tx.execute("UPDATE password_resets SET used = 1 WHERE token_hash = ?1", [token_hash])?;
            tx.commit()?;
            Ok(Some(user_id.parse()?))
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1");
    let row = conn.query_row(&sql, [value], map_user).optional()?;
    Ok(row)
}

fn query_project(conn: &Connection, id: &str) -> Result<Option<ProjectRow>> {
    let sql = format!("{PROJECT_SELECT} WHERE p.id = ?1");
    let row = conn.query_row(&sql, [id], map_project).optional()?;
    Ok(row)
}

fn insert_favorite(conn: &Connection, user_id: &str, image_id: &str) -> Result<bool> {
    let n = conn.execute(
        "INSERT OR IGNORE INTO favorites (user_id, image_id, project_id, created_at)
         SELECT ?1, id, project_id, ?3 FROM project_images WHERE id = ?2",
        params![user_id, image_id, format_timestamp(Utc::now())],
    )?;
    Ok(n > 0)
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        password: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        role: row.get(5)?,
        phone: row.get(6)?,
        builder_id: row.get(7)?,
        avatar: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn map_project(row: &Row<'_>) -> rusqlite::Result<ProjectRow> {
    let first: Option<String> = row.get(6)?;
    let last: Option<String> = row.get(7)?;
    Ok(ProjectRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        address: row.get(3)?,
        status: row.get(4)?,
        homeowner_id: row.get(5)?,
        homeowner_name: buildtrack_types::models::display_name(
            first.as_deref().unwrap_or_default(),
            last.as_deref().unwrap_or_default(),
        ),
        builder_id: row.get(8)?,
        progress: row.get(9)?,
        thumbnail: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

fn map_image(row: &Row<'_>) -> rusqlite::Result<ImageRow> {
    Ok(ImageRow {
        id: row.get(0)?,
        project_id: row.get(1)?,
        url: row.get(2)?,
        file_name: row.get(3)?,
        caption: row.get(4)?,
        category: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn map_favorite(row: &Row<'_>) -> rusqlite::Result<FavoriteRow> {
    Ok(FavoriteRow {
        user_id: row.get(0)?,
        image_id: row.get(1)?,
        project_id: row.get(2)?,
        created_at: row.get(3)?,
    })
}

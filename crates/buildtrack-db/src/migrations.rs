use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

/// Versioned schema steps. Each entry runs once, in order, and bumps
/// `schema_version` to its index + 1.
const MIGRATIONS: &[(&str, &str)] = &[
    (
        "initial schema",
        "
        CREATE TABLE users (
            id          TEXT PRIMARY KEY,
            email       TEXT NOT NULL UNIQUE COLLATE NOCASE,
            password    TEXT NOT NULL,
            first_name  TEXT NOT NULL,
            last_name   TEXT NOT NULL DEFAULT '',
            role        TEXT NOT NULL CHECK (role IN ('admin', 'builder', 'homeowner')),
            phone       TEXT,
            builder_id  TEXT REFERENCES users(id) ON DELETE SET NULL,
            avatar      TEXT,
            created_at  TEXT NOT NULL
        );

        CREATE INDEX idx_users_builder ON users(builder_id);

        CREATE TABLE projects (
            id            TEXT PRIMARY KEY,
            title         TEXT NOT NULL,
            description   TEXT NOT NULL DEFAULT '',
            address       TEXT NOT NULL DEFAULT '',
            status        TEXT NOT NULL DEFAULT 'planning',
            homeowner_id  TEXT NOT NULL REFERENCES users(id),
            builder_id    TEXT REFERENCES users(id),
            progress      INTEGER NOT NULL DEFAULT 0 CHECK (progress BETWEEN 0 AND 100),
            thumbnail     TEXT,
            created_at    TEXT NOT NULL,
            updated_at    TEXT NOT NULL
        );

        CREATE INDEX idx_projects_homeowner ON projects(homeowner_id);
        CREATE INDEX idx_projects_builder ON projects(builder_id);

        CREATE TABLE project_images (
            id          TEXT PRIMARY KEY,
            project_id  TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            url         TEXT NOT NULL,
            file_name   TEXT NOT NULL,
            caption     TEXT NOT NULL DEFAULT '',
            category    TEXT NOT NULL DEFAULT 'general',
            created_at  TEXT NOT NULL
        );

        CREATE INDEX idx_images_project ON project_images(project_id, created_at);

        CREATE TABLE favorites (
            user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            image_id    TEXT NOT NULL REFERENCES project_images(id) ON DELETE CASCADE,
            project_id  TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            created_at  TEXT NOT NULL,
            PRIMARY KEY (user_id, image_id)
        );
        ",
    ),
    (
        "logs table",
        "
        CREATE TABLE logs (
            id          TEXT PRIMARY KEY,
            level       TEXT NOT NULL,
            message     TEXT NOT NULL,
            context     TEXT,
            user_id     TEXT,
            created_at  TEXT NOT NULL
        );

        CREATE INDEX idx_logs_created ON logs(created_at);
        ",
    ),
    (
        "password resets",
        "
        CREATE TABLE password_resets (
            token_hash  TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            expires_at  TEXT NOT NULL,
            used        INTEGER NOT NULL DEFAULT 0
        );
        ",
    ),
];

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    for (idx, (name, sql)) in MIGRATIONS.iter().enumerate() {
        let target = idx as i64 + 1;
        if version >= target {
            continue;
        }
        info!("Running migration v{} ({})", target, name);
        conn.execute_batch(&format!(
            "BEGIN;\n{sql}\nINSERT INTO schema_version (version) VALUES ({target});\nCOMMIT;"
        ))?;
    }

    info!("Database migrations complete");
    Ok(())
}

/// Highest migration the binary knows about.
pub fn latest_version() -> i64 {
    MIGRATIONS.len() as i64
}

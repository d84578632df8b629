//! Dump every user, project, image and favorite as JSON.
//!
//! Usage: `buildtrack-export [OUTPUT]`. Writes to stdout without an argument.

use std::path::PathBuf;

use anyhow::Context;
use buildtrack_server::export::{Snapshot, open_existing};

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "buildtrack_server=info".into()),
        )
        .init();

    let db_path: PathBuf = std::env::var("BUILDTRACK_DB_PATH")
        .unwrap_or_else(|_| "buildtrack.db".into())
        .into();
    let db = open_existing(&db_path)?;
    let snapshot = Snapshot::collect(&db)?;
    let json = serde_json::to_string_pretty(&snapshot)?;

    match std::env::args().nth(1) {
        Some(out) => {
            std::fs::write(&out, json).with_context(|| format!("Failed to write {}", out))?;
            tracing::info!(
                users = snapshot.users.len(),
                projects = snapshot.projects.len(),
                images = snapshot.images.len(),
                favorites = snapshot.favorites.len(),
                "Exported snapshot to {}",
                out
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}

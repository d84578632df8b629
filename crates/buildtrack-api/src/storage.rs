use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use uuid::Uuid;

/// On-disk media storage for project photos.
///
/// Each image is stored at `{dir}/{project_id}/{image_id}.{ext}` and served
/// read-only under `/media`, so its public URL mirrors the relative path.
pub struct MediaStore {
    dir: PathBuf,
    public_url: String,
}

/// Where an upload landed.
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// Path relative to the media root.
    pub file_name: String,
    pub url: String,
}

impl MediaStore {
    pub async fn new(dir: PathBuf, public_url: &str) -> Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!("Media storage directory: {}", dir.display());
        Ok(Self {
            dir,
            public_url: public_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File extension for an accepted image content type.
    pub fn extension_for(content_type: &str) -> Option<&'static str> {
        let essence = content_type.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some("jpg"),
            "image/png" => Some("png"),
            "image/webp" => Some("webp"),
            "image/gif" => Some("gif"),
            "image/heic" => Some("heic"),
            _ => None,
        }
    }

    pub fn public_url(&self, file_name: &str) -> String {
        format!("{}/media/{}", self.public_url, file_name)
    }

    pub async fn save(
        &self,
        project_id: Uuid,
        image_id: Uuid,
        extension: &str,
        data: &[u8],
    ) -> Result<StoredObject> {
        let file_name = format!("{}/{}.{}", project_id, image_id, extension);
        let path = self.dir.join(&file_name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&path).await?;
        file.write_all(data).await?;
        file.flush().await?;

        Ok(StoredObject {
            url: self.public_url(&file_name),
            file_name,
        })
    }

    /// Delete a stored object. A file that is already gone is not an error.
    pub async fn delete(&self, file_name: &str) -> Result<()> {
        let path = self.dir.join(file_name);
        match fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted media {}", file_name);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Media {} already gone", file_name);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Best-effort removal of several objects; failures are logged.
    pub async fn delete_all(&self, file_names: &[String]) {
        for name in file_names {
            if let Err(e) = self.delete(name).await {
                warn!("Failed to delete media {}: {}", name, e);
            }
        }
    }
}

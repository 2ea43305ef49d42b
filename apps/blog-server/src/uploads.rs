//! Featured-image uploads written under the public uploads directory.

use std::path::{Path, PathBuf};

use actix_multipart::Field;
use futures::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Image types accepted for upload.
pub const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/gif"];

/// URL prefix the upload directory is served under.
pub const PUBLIC_PREFIX: &str = "/uploads";

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Only JPEG, PNG and GIF images are allowed (got {0})")]
    UnsupportedType(String),

    #[error("File exceeds the {0} byte limit")]
    TooLarge(usize),

    #[error("Upload failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed upload: {0}")]
    Multipart(String),
}

/// Stores uploaded images on disk.
pub struct UploadStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    /// Stream a multipart file field to disk.
    ///
    /// Returns the public path (`/uploads/<name>`), or `None` when the field
    /// carried no file. A rejected upload leaves nothing behind.
    pub async fn save(&self, field: &mut Field) -> Result<Option<String>, UploadError> {
        let field_name = field.name().unwrap_or("file").to_string();
        let original = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);

        let Some(original) = original.filter(|name| !name.is_empty()) else {
            drain(field).await?;
            return Ok(None);
        };

        let content_type = field
            .content_type()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_default();
        check_type(&content_type)?;

        fs::create_dir_all(&self.dir).await?;
        let file_name = stored_file_name(&field_name, &original);
        let path = self.dir.join(&file_name);

        let written = self.write_field(field, &path).await;
        match written {
            Ok(0) => {
                let _ = fs::remove_file(&path).await;
                Ok(None)
            }
            Ok(bytes) => {
                tracing::info!(file = %file_name, bytes, "Image uploaded");
                Ok(Some(format!("{PUBLIC_PREFIX}/{file_name}")))
            }
            Err(e) => {
                if let Err(cleanup) = fs::remove_file(&path).await {
                    tracing::warn!(file = %path.display(), error = %cleanup, "Failed to remove partial upload");
                }
                Err(e)
            }
        }
    }

    /// Remove a previously stored upload by its public path.
    ///
    /// Paths outside the upload prefix are ignored.
    pub async fn discard(&self, public_path: &str) {
        let Some(file_name) = stored_name(public_path) else {
            tracing::debug!(path = public_path, "Not an upload path, nothing to discard");
            return;
        };

        match fs::remove_file(self.dir.join(file_name)).await {
            Ok(()) => tracing::info!(file = file_name, "Discarded upload"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(file = file_name, error = %e, "Failed to discard upload"),
        }
    }

    async fn write_field(&self, field: &mut Field, path: &Path) -> Result<usize, UploadError> {
        let mut file = fs::File::create(path).await?;
        let mut total = 0usize;

        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| UploadError::Multipart(e.to_string()))?;
            total += chunk.len();
            if total > self.max_bytes {
                return Err(UploadError::TooLarge(self.max_bytes));
            }
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        Ok(total)
    }
}

/// Reject anything that is not a JPEG, PNG or GIF.
pub fn check_type(content_type: &str) -> Result<(), UploadError> {
    if ALLOWED_IMAGE_TYPES.contains(&content_type) {
        Ok(())
    } else {
        Err(UploadError::UnsupportedType(if content_type.is_empty() {
            "unknown".to_string()
        } else {
            content_type.to_string()
        }))
    }
}

/// `<field>-<unix millis>-<random><.ext>`, keeping the original extension.
pub fn stored_file_name(field_name: &str, original: &str) -> String {
    let ext = Path::new(original)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();

    format!(
        "{}-{}-{}{}",
        field_name,
        chrono::Utc::now().timestamp_millis(),
        uuid::Uuid::new_v4().simple(),
        ext
    )
}

/// File name behind `/uploads/<name>`; `None` for anything that could escape the directory.
fn stored_name(public_path: &str) -> Option<&str> {
    let name = public_path.strip_prefix(PUBLIC_PREFIX)?.strip_prefix('/')?;
    let plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\']);
    plain.then_some(name)
}

async fn drain(field: &mut Field) -> Result<(), UploadError> {
    while let Some(chunk) = field.next().await {
        chunk.map_err(|e| UploadError::Multipart(e.to_string()))?;
    }
    Ok(())
}

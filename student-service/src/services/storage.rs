//! Local storage for student photos.

use std::path::{Path, PathBuf};

use anyhow::anyhow;
use service_core::error::AppError;
use tokio::fs;
use uuid::Uuid;

pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// One file lifted out of a multipart request.
#[derive(Debug, Clone)]
pub struct UploadedPhoto {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    pub async fn new(base_path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).await?;
        }
        Ok(Self { base_path })
    }

    /// Validate and persist a student photo; returns the stored file name
    /// (`{student_id}_{uuid}{ext}`).
    pub async fn store_photo(
        &self,
        photo: &UploadedPhoto,
        student_id: &str,
    ) -> Result<String, AppError> {
        if photo.data.is_empty() {
            return Err(AppError::BadRequest(anyhow!("Cannot upload empty file")));
        }
        if !photo.content_type.starts_with("image/") {
            return Err(AppError::BadRequest(anyhow!("Only image files are allowed")));
        }
        if photo.data.len() > MAX_PHOTO_BYTES {
            return Err(AppError::BadRequest(anyhow!(
                "File size exceeds maximum limit of 5MB"
            )));
        }

        let extension = Path::new(&photo.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();
        let filename = format!("{}_{}{}", student_id, Uuid::new_v4(), extension);

        fs::write(self.base_path.join(&filename), &photo.data).await?;

        tracing::info!(student_id, filename = %filename, "Photo stored");
        Ok(filename)
    }

    pub async fn read(&self, filename: &str) -> Result<Vec<u8>, AppError> {
        match fs::read(self.base_path.join(filename)).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::NotFound(
                anyhow!("Stored file not found: {}", filename),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Best-effort delete; failures are logged, never surfaced.
    pub async fn delete(&self, filename: &str) {
        if filename.is_empty() {
            return;
        }
        if let Err(e) = fs::remove_file(self.base_path.join(filename)).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(filename, error = %e, "Failed to delete stored photo");
            }
        }
    }
}

// src/services/image_storage.rs
// DOCUMENTATION: Recipe image validation and file storage
// PURPOSE: Decode uploads to prove they are images, then store them under
// MEDIA_ROOT/uploads/recipe/<uuid>.<ext>

use crate::errors::ApiError;
use image::ImageFormat;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const RECIPE_UPLOAD_DIR: &str = "uploads/recipe";

const ALLOWED_FORMATS: [ImageFormat; 5] = [
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
    ImageFormat::Bmp,
];

/// File system backed media storage
#[derive(Debug, Clone)]
pub struct ImageStorage {
    root: PathBuf,
    url_prefix: String,
    max_bytes: usize,
}

impl ImageStorage {
    pub fn new(root: impl Into<PathBuf>, url_prefix: &str, max_bytes: usize) -> Self {
        let mut url_prefix = url_prefix.to_string();
        if !url_prefix.ends_with('/') {
            url_prefix.push('/');
        }

        Self {
            root: root.into(),
            url_prefix,
            max_bytes,
        }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Public URL for a stored relative path
    pub fn url(&self, relative: &str) -> String {
        format!("{}{}", self.url_prefix, relative)
    }

    /// Absolute location of a stored relative path
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Validate and persist an uploaded recipe image
    /// DOCUMENTATION: Returns the path relative to the media root
    pub async fn save_recipe_image(
        &self,
        filename: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<String, ApiError> {
        if bytes.len() > self.max_bytes {
            return Err(ApiError::PayloadTooLarge(self.max_bytes));
        }

        let (format, bytes) = tokio::task::spawn_blocking(move || {
            detect_image(&bytes).map(|format| (format, bytes))
        })
        .await
        .map_err(|e| {
            log::error!("Image decoding task failed: {}", e);
            ApiError::InternalError
        })??;

        let relative = format!(
            "{}/{}.{}",
            RECIPE_UPLOAD_DIR,
            Uuid::new_v4(),
            extension_for(filename, format)
        );
        let target = self.path(&relative);

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                log::error!("Failed to create {}: {}", parent.display(), e);
                ApiError::StorageError(e.to_string())
            })?;
        }

        tokio::fs::write(&target, &bytes).await.map_err(|e| {
            log::error!("Failed to write {}: {}", target.display(), e);
            ApiError::StorageError(e.to_string())
        })?;

        log::info!("Stored recipe image {}", relative);
        Ok(relative)
    }

    /// Remove a stored file; a missing file is not an error
    pub async fn remove(&self, relative: &str) {
        if !is_managed_path(relative) {
            log::warn!("Refusing to remove unmanaged media path {}", relative);
            return;
        }

        match tokio::fs::remove_file(self.path(relative)).await {
            Ok(()) => log::debug!("Removed media file {}", relative),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to remove media file {}: {}", relative, e),
        }
    }
}

/// Identify and fully decode the bytes as one of the accepted formats
fn detect_image(bytes: &[u8]) -> Result<ImageFormat, ApiError> {
    let invalid = || {
        ApiError::ValidationError(
            "Upload a valid image. The file you uploaded was either not an image or a \
             corrupted image."
                .to_string(),
        )
    };

    let format = image::guess_format(bytes).map_err(|_| invalid())?;
    if !ALLOWED_FORMATS.contains(&format) {
        return Err(invalid());
    }

    image::load_from_memory_with_format(bytes, format).map_err(|e| {
        log::debug!("Rejected upload that failed to decode: {}", e);
        invalid()
    })?;

    Ok(format)
}

/// Keep the uploaded file's extension when it names an image type
fn extension_for(filename: Option<&str>, format: ImageFormat) -> String {
    filename
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .filter(|ext| ImageFormat::from_extension(ext).is_some())
        .unwrap_or_else(|| {
            format
                .extensions_str()
                .first()
                .copied()
                .unwrap_or("img")
                .to_string()
        })
}

fn is_managed_path(relative: &str) -> bool {
    relative.starts_with(RECIPE_UPLOAD_DIR) && !relative.split('/').any(|part| part == "..")
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use std::io::Cursor;

    fn sample_image(format: ImageFormat) -> Vec<u8> {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::new(10, 10);
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, format).unwrap();
        buffer.into_inner()
    }

    #[tokio::test]
    async fn test_save_valid_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ImageStorage::new(dir.path(), "/static/media", 1024 * 1024);

        let relative = storage
            .save_recipe_image(Some("photo.JPG"), sample_image(ImageFormat::Jpeg))
            .await
            .unwrap();

        assert!(relative.starts_with("uploads/recipe/"));
        assert!(relative.ends_with(".jpg"));
        assert!(storage.path(&relative).exists());
        assert_eq!(
            storage.url(&relative),
            format!("/static/media/{}", relative)
        );
    }

    #[tokio::test]
    async fn test_extension_from_format_when_name_is_unhelpful() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ImageStorage::new(dir.path(), "/static/media/", 1024 * 1024);

        let relative = storage
            .save_recipe_image(Some("upload.bin"), sample_image(ImageFormat::Png))
            .await
            .unwrap();

        assert!(relative.ends_with(".png"));
    }

    #[tokio::test]
    async fn test_reject_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ImageStorage::new(dir.path(), "/static/media/", 1024);

        let result = storage
            .save_recipe_image(Some("image.jpg"), b"notanimage".to_vec())
            .await;

        assert!(matches!(result, Err(ApiError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_reject_oversized_upload() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ImageStorage::new(dir.path(), "/static/media/", 16);

        let result = storage
            .save_recipe_image(Some("image.png"), sample_image(ImageFormat::Png))
            .await;

        assert!(matches!(result, Err(ApiError::PayloadTooLarge(16))));
    }

    #[tokio::test]
    async fn test_remove_deletes_file_and_ignores_missing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ImageStorage::new(dir.path(), "/static/media/", 1024 * 1024);

        let relative = storage
            .save_recipe_image(None, sample_image(ImageFormat::Jpeg))
            .await
            .unwrap();
        storage.remove(&relative).await;
        assert!(!storage.path(&relative).exists());

        storage.remove(&relative).await;
    }

    #[test]
    fn test_managed_paths() {
        assert!(is_managed_path("uploads/recipe/a.jpg"));
        assert!(!is_managed_path("../etc/passwd"));
        assert!(!is_managed_path("uploads/recipe/../../secret"));
    }
}

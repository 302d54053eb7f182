use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use crate::data::image_storage::{ImageStorage, object_path};
use crate::domain::draft::ImageUpload;
use crate::domain::error::DomainError;

/// Хранилище изображений в локальном каталоге, раздаваемом по `public_base_url`.
#[derive(Debug, Clone)]
pub struct LocalImageStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalImageStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }
}

#[async_trait]
impl ImageStorage for LocalImageStorage {
    async fn upload(&self, image: &ImageUpload) -> Result<String, DomainError> {
        if image.bytes.is_empty() {
            return Err(DomainError::Validation {
                field: "image",
                message: "must not be empty",
            });
        }
        if !image.content_type.starts_with("image/") {
            return Err(DomainError::Validation {
                field: "image",
                message: "content type must be image/*",
            });
        }

        let path = object_path(Utc::now());
        let target = self.root.join(&path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| DomainError::Upload(err.to_string()))?;
        }
        tokio::fs::write(&target, &image.bytes)
            .await
            .map_err(|err| DomainError::Upload(err.to_string()))?;

        let url = format!("{}/{}", self.public_base_url.trim_end_matches('/'), path);
        info!(path = %path, bytes = image.bytes.len(), "image uploaded");
        Ok(url)
    }
}

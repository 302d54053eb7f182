use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::draft::ImageUpload;
use crate::domain::error::DomainError;

/// Объектное хранилище изображений.
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Загружает изображение и возвращает его публичный URL.
    /// Ошибка возвращается как `DomainError::Upload`.
    async fn upload(&self, image: &ImageUpload) -> Result<String, DomainError>;
}

/// Путь объекта, привязанный ко времени загрузки: `posts/<millis>`.
pub fn object_path(uploaded_at: DateTime<Utc>) -> String {
    format!("posts/{}", uploaded_at.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::object_path;

    #[test]
    fn object_path_uses_upload_millis() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(object_path(at), "posts/1700000000123");
    }
}

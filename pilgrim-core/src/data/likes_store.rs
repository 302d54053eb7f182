use async_trait::async_trait;
use thiserror::Error;

use crate::domain::error::DomainError;
use crate::domain::post::PostId;

#[derive(Debug, Error)]
pub enum LikesStoreError {
    #[error("likes storage io failed for '{key}'")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("stored likes for '{key}' are not a JSON list of ids")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("likes for '{key}' could not be encoded")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid likes key '{0}'")]
    InvalidKey(String),

    #[error("likes storage lock poisoned")]
    Poisoned,
}

impl From<LikesStoreError> for DomainError {
    fn from(err: LikesStoreError) -> Self {
        DomainError::LocalState(err.to_string())
    }
}

/// Локальное хранилище списка лайкнутых постов.
///
/// Значение под ключом — упорядоченный JSON-массив id постов.
#[async_trait]
pub trait LikesStore: Send + Sync {
    /// Отсутствующий ключ означает пустой список.
    async fn load(&self, key: &str) -> Result<Vec<PostId>, LikesStoreError>;
    async fn save(&self, key: &str, ids: &[PostId]) -> Result<(), LikesStoreError>;
}

/// Разбирает сохранённое значение списка лайков.
pub(crate) fn decode_likes(key: &str, raw: &str) -> Result<Vec<PostId>, LikesStoreError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str::<Vec<PostId>>(raw).map_err(|source| LikesStoreError::Corrupt {
        key: key.to_string(),
        source,
    })
}

pub(crate) fn encode_likes(key: &str, ids: &[PostId]) -> Result<String, LikesStoreError> {
    serde_json::to_string(ids).map_err(|source| LikesStoreError::Encode {
        key: key.to_string(),
        source,
    })
}

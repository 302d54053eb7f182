use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::data::likes_store::{LikesStore, LikesStoreError, decode_likes, encode_likes};
use crate::domain::post::PostId;

/// Списки лайков в виде JSON-файлов: `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileLikesStore {
    dir: PathBuf,
}

impl JsonFileLikesStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, LikesStoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(LikesStoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl LikesStore for JsonFileLikesStore {
    async fn load(&self, key: &str) -> Result<Vec<PostId>, LikesStoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => decode_likes(key, &raw),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(LikesStoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    async fn save(&self, key: &str, ids: &[PostId]) -> Result<(), LikesStoreError> {
        let path = self.path_for(key)?;
        let raw = encode_likes(key, ids)?;
        let io_err = |source| LikesStoreError::Io {
            key: key.to_string(),
            source,
        };

        tokio::fs::create_dir_all(&self.dir).await.map_err(io_err)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, raw).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &path).await.map_err(io_err)?;

        debug!(key, count = ids.len(), "likes list saved");
        Ok(())
    }
}

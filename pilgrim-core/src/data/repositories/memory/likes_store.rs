use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::data::likes_store::{LikesStore, LikesStoreError, decode_likes, encode_likes};
use crate::domain::post::PostId;

/// Хранилище лайков в памяти. Значения держатся в сериализованном виде,
/// как в браузерном key-value хранилище.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLikesStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryLikesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Записывает сырое значение под ключом.
    pub fn put_raw(&self, key: &str, raw: &str) -> Result<(), LikesStoreError> {
        self.lock()?.insert(key.to_string(), raw.to_string());
        Ok(())
    }

    pub fn raw(&self, key: &str) -> Result<Option<String>, LikesStoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, LikesStoreError> {
        self.entries.lock().map_err(|_| LikesStoreError::Poisoned)
    }
}

#[async_trait]
impl LikesStore for InMemoryLikesStore {
    async fn load(&self, key: &str) -> Result<Vec<PostId>, LikesStoreError> {
        match self.raw(key)? {
            Some(raw) => decode_likes(key, &raw),
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, key: &str, ids: &[PostId]) -> Result<(), LikesStoreError> {
        let raw = encode_likes(key, ids)?;
        self.put_raw(key, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::InMemoryLikesStore;
    use crate::data::likes_store::{LikesStore, LikesStoreError};
    use crate::domain::post::PostId;

    #[tokio::test]
    async fn missing_key_loads_as_empty_list() {
        let store = InMemoryLikesStore::new();
        let ids = store.load("guest_likes").await.expect("load must succeed");
        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn save_then_load_keeps_order_per_key() {
        let store = InMemoryLikesStore::new();
        let ids = vec![PostId::new("b"), PostId::new("a")];
        store.save("likes_u1", &ids).await.expect("save must succeed");

        assert_eq!(store.load("likes_u1").await.expect("load"), ids);
        assert!(store.load("guest_likes").await.expect("load").is_empty());
    }

    #[tokio::test]
    async fn corrupt_value_is_reported() {
        let store = InMemoryLikesStore::new();
        store
            .put_raw("guest_likes", "not json")
            .expect("put must succeed");
        let err = store.load("guest_likes").await.expect_err("must fail");
        assert!(matches!(err, LikesStoreError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn poisoned_lock_is_reported_instead_of_dropping_writes() {
        let store = InMemoryLikesStore::new();
        let shared = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = shared.entries.lock().expect("lock must succeed");
            panic!("poison the likes mutex");
        })
        .join();

        let err = store
            .save("guest_likes", &[PostId::new("a")])
            .await
            .expect_err("save must fail on a poisoned lock");
        assert!(matches!(err, LikesStoreError::Poisoned));

        let err = store.load("guest_likes").await.expect_err("load must fail");
        assert!(matches!(err, LikesStoreError::Poisoned));
    }
}

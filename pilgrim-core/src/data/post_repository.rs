use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::error::DomainError;
use crate::domain::post::{
    GeoPoint, Post, PostId, normalize_image_url, normalize_text, validate_locations,
};

/// Данные нового поста. `id`, `created_at` и `likes = 0` назначает хранилище.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub text: String,
    pub image_url: Option<String>,
    pub locations: Vec<GeoPoint>,
    pub location_names: Vec<String>,
}

impl NewPost {
    /// Те же правила, что применяются к документу при чтении, чтобы в
    /// хранилище не попадала запись, которую потом нельзя прочитать.
    pub fn validate(self) -> Result<Self, DomainError> {
        let text = normalize_text(&self.text)?;
        let image_url = normalize_image_url(self.image_url)?;
        validate_locations(&self.locations, &self.location_names)?;

        Ok(Self {
            text,
            image_url,
            locations: self.locations,
            location_names: self.location_names,
        })
    }
}

/// Позиция последней записи страницы в порядке хранилища
/// `(deleted asc, created_at desc, id desc)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    deleted: bool,
    created_at: DateTime<Utc>,
    id: PostId,
}

impl PageCursor {
    pub fn after(post: &Post) -> Self {
        Self {
            deleted: post.is_deleted(),
            created_at: post.created_at,
            id: post.id.clone(),
        }
    }

    pub(crate) fn deleted(&self) -> bool {
        self.deleted
    }

    pub(crate) fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub(crate) fn id(&self) -> &PostId {
        &self.id
    }

    /// `true`, если `post` в порядке хранилища стоит строго после курсора.
    pub(crate) fn is_before(&self, post: &Post) -> bool {
        let key = (self.deleted, self.created_at, &self.id);
        store_order_key(key, (post.is_deleted(), post.created_at, &post.id)) == Ordering::Less
    }
}

/// Сравнение постов в порядке выдачи ранжирующего запроса.
pub(crate) fn store_order(a: &Post, b: &Post) -> Ordering {
    store_order_key(
        (a.is_deleted(), a.created_at, &a.id),
        (b.is_deleted(), b.created_at, &b.id),
    )
}

fn store_order_key(
    a: (bool, DateTime<Utc>, &PostId),
    b: (bool, DateTime<Utc>, &PostId),
) -> Ordering {
    a.0.cmp(&b.0)
        .then_with(|| b.1.cmp(&a.1))
        .then_with(|| b.2.cmp(a.2))
}

/// Запрос одной страницы ранжирования:
/// `created_at >= since AND deleted != true`, строго после `after`.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingQuery {
    pub since: DateTime<Utc>,
    pub after: Option<PageCursor>,
    pub limit: u32,
}

#[async_trait]
pub trait PostsRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn get_post(&self, id: &PostId) -> Result<Option<Post>, DomainError>;
    /// Одна страница в порядке хранилища, без пересортировки по лайкам.
    async fn ranking_page(&self, query: RankingQuery) -> Result<Vec<Post>, DomainError>;
    /// Последние неудалённые посты, новые первыми.
    async fn list_recent(&self, limit: u32) -> Result<Vec<Post>, DomainError>;
    /// Неудалённые посты с указанными id, новые первыми.
    async fn list_by_ids(&self, ids: &[PostId]) -> Result<Vec<Post>, DomainError>;
    /// Атомарно меняет счётчик лайков на `delta`, не опуская его ниже нуля.
    async fn increment_likes(&self, id: &PostId, delta: i64) -> Result<Post, DomainError>;
    async fn mark_deleted(&self, id: &PostId) -> Result<bool, DomainError>;
}

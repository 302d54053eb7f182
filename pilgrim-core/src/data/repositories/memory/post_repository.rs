use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::data::post_repository::{NewPost, PostsRepository, RankingQuery, store_order};
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostId};

#[derive(Debug, Default)]
struct MemoryState {
    posts: Vec<Post>,
    next_id: u64,
}

/// Хранилище постов в памяти процесса с той же семантикой запросов,
/// что и у PostgreSQL-реализации.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPostsRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryPostsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_posts(posts: impl IntoIterator<Item = Post>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                posts: posts.into_iter().collect(),
                next_id: 0,
            })),
        }
    }

    /// Кладёт готовый пост как есть, включая его `created_at`.
    pub fn insert(&self, post: Post) -> Result<(), DomainError> {
        self.lock()?.posts.push(post);
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, DomainError> {
        self.state
            .lock()
            .map_err(|_| DomainError::Unexpected("in-memory store mutex poisoned".to_string()))
    }

    fn visible_sorted(state: &MemoryState) -> Vec<Post> {
        let mut posts: Vec<Post> = state
            .posts
            .iter()
            .filter(|post| !post.is_deleted())
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        posts
    }
}

#[async_trait]
impl PostsRepository for InMemoryPostsRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let input = input.validate()?;
        let mut state = self.lock()?;
        state.next_id += 1;
        let post = Post {
            id: PostId::new(format!("mem-{}", state.next_id)),
            text: input.text,
            image_url: input.image_url,
            locations: input.locations,
            location_names: input.location_names,
            created_at: Utc::now(),
            likes: 0,
            deleted: None,
        };
        state.posts.push(post.clone());
        Ok(post)
    }

    async fn get_post(&self, id: &PostId) -> Result<Option<Post>, DomainError> {
        let state = self.lock()?;
        Ok(state.posts.iter().find(|post| &post.id == id).cloned())
    }

    async fn ranking_page(&self, query: RankingQuery) -> Result<Vec<Post>, DomainError> {
        let state = self.lock()?;
        let mut page: Vec<Post> = state
            .posts
            .iter()
            .filter(|post| post.created_at >= query.since && !post.is_deleted())
            .filter(|post| query.after.as_ref().is_none_or(|cursor| cursor.is_before(post)))
            .cloned()
            .collect();
        page.sort_by(store_order);
        page.truncate(query.limit as usize);
        Ok(page)
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<Post>, DomainError> {
        let state = self.lock()?;
        let mut posts = Self::visible_sorted(&state);
        posts.truncate(limit as usize);
        Ok(posts)
    }

    async fn list_by_ids(&self, ids: &[PostId]) -> Result<Vec<Post>, DomainError> {
        let state = self.lock()?;
        Ok(Self::visible_sorted(&state)
            .into_iter()
            .filter(|post| ids.contains(&post.id))
            .collect())
    }

    async fn increment_likes(&self, id: &PostId, delta: i64) -> Result<Post, DomainError> {
        let mut state = self.lock()?;
        let post = state
            .posts
            .iter_mut()
            .find(|post| &post.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("post id: {id}")))?;
        post.likes = post.likes.saturating_add_signed(delta);
        Ok(post.clone())
    }

    async fn mark_deleted(&self, id: &PostId) -> Result<bool, DomainError> {
        let mut state = self.lock()?;
        match state.posts.iter_mut().find(|post| &post.id == id) {
            Some(post) => {
                post.deleted = Some(true);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

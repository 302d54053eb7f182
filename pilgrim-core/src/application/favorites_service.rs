use tracing::debug;

use crate::data::likes_store::LikesStore;
use crate::data::post_repository::PostsRepository;
use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::domain::viewer::Viewer;

/// Избранное: посты, которые зритель лайкнул, новые первыми.
pub struct FavoritesService<R: PostsRepository, L: LikesStore> {
    repo: R,
    likes: L,
}

impl<R: PostsRepository, L: LikesStore> FavoritesService<R, L> {
    pub fn new(repo: R, likes: L) -> Self {
        Self { repo, likes }
    }

    pub async fn list(&self, viewer: &Viewer) -> Result<Vec<Post>, DomainError> {
        let ids = self.likes.load(&viewer.likes_key()).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let posts = self.repo.list_by_ids(&ids).await?;
        debug!(saved = ids.len(), found = posts.len(), "favorites loaded");
        Ok(posts)
    }
}

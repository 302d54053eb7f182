use tracing::{debug, warn};

use crate::data::likes_store::LikesStore;
use crate::data::post_repository::PostsRepository;
use crate::domain::error::DomainError;
use crate::domain::post::PostId;
use crate::domain::viewer::Viewer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeToggle {
    pub post_id: PostId,
    pub liked: bool,
    pub likes: u64,
}

pub struct LikeService<R: PostsRepository, L: LikesStore> {
    repo: R,
    likes: L,
}

impl<R: PostsRepository, L: LikesStore> LikeService<R, L> {
    pub fn new(repo: R, likes: L) -> Self {
        Self { repo, likes }
    }

    pub async fn liked_ids(&self, viewer: &Viewer) -> Result<Vec<PostId>, DomainError> {
        Ok(self.likes.load(&viewer.likes_key()).await?)
    }

    /// Ставит или снимает лайк. Локальный список сохраняется только после
    /// успешного изменения счётчика в хранилище.
    pub async fn toggle_like(
        &self,
        viewer: &Viewer,
        post_id: &PostId,
    ) -> Result<LikeToggle, DomainError> {
        let key = viewer.likes_key();
        let mut liked = self.likes.load(&key).await?;
        let was_liked = liked.contains(post_id);
        let delta = if was_liked { -1 } else { 1 };

        let post = self.repo.increment_likes(post_id, delta).await?;

        if was_liked {
            liked.retain(|id| id != post_id);
        } else {
            liked.push(post_id.clone());
        }
        if let Err(err) = self.likes.save(&key, &liked).await {
            warn!(
                key = %key,
                post_id = %post_id,
                error = %err,
                "likes counter changed but local list was not saved"
            );
            return Err(err.into());
        }

        debug!(
            key = %key,
            post_id = %post_id,
            liked = !was_liked,
            likes = post.likes,
            "like toggled"
        );
        Ok(LikeToggle {
            post_id: post_id.clone(),
            liked: !was_liked,
            likes: post.likes,
        })
    }
}

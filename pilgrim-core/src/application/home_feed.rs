use chrono::{DateTime, Utc};
use tracing::debug;

use crate::data::likes_store::LikesStore;
use crate::data::post_repository::PostsRepository;
use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::domain::ranking::{RankingWindow, sort_by_likes_desc};
use crate::domain::viewer::Viewer;

/// Сколько последних постов показывает главная лента.
pub const RECENT_LIMIT: u32 = 100;
/// Размер превью рейтинга на главной.
pub const TOP_PREVIEW_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    pub post: Post,
    pub liked: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HomeFeed {
    pub window: RankingWindow,
    pub items: Vec<FeedItem>,
    /// Лучшие посты окна среди загруженных, по лайкам.
    pub top: Vec<Post>,
}

pub struct HomeFeedService<R: PostsRepository, L: LikesStore> {
    repo: R,
    likes: L,
}

impl<R: PostsRepository, L: LikesStore> HomeFeedService<R, L> {
    pub fn new(repo: R, likes: L) -> Self {
        Self { repo, likes }
    }

    pub async fn load(
        &self,
        viewer: &Viewer,
        window: RankingWindow,
    ) -> Result<HomeFeed, DomainError> {
        self.load_at(viewer, window, Utc::now()).await
    }

    pub async fn load_at(
        &self,
        viewer: &Viewer,
        window: RankingWindow,
        now: DateTime<Utc>,
    ) -> Result<HomeFeed, DomainError> {
        let liked = self.likes.load(&viewer.likes_key()).await?;
        let posts = self.repo.list_recent(RECENT_LIMIT).await?;
        let top = top_in_window(&posts, window, now);

        let items = posts
            .into_iter()
            .map(|post| FeedItem {
                liked: liked.contains(&post.id),
                post,
            })
            .collect::<Vec<_>>();

        debug!(%window, items = items.len(), top = top.len(), "home feed loaded");
        Ok(HomeFeed { window, items, top })
    }
}

/// Посты строго новее начала окна, по лайкам по убыванию, не больше пяти.
pub fn top_in_window(posts: &[Post], window: RankingWindow, now: DateTime<Utc>) -> Vec<Post> {
    let start = window.start_from(now);
    let mut recent: Vec<Post> = posts
        .iter()
        .filter(|post| post.created_at > start)
        .cloned()
        .collect();
    sort_by_likes_desc(&mut recent);
    recent.truncate(TOP_PREVIEW_LIMIT);
    recent
}

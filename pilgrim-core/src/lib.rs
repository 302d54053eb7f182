//! Лента маршрутов паломничества: рейтинг за окно времени с догрузкой,
//! лайки, избранное и публикация постов с точками на карте.
//!
//! Хранилище постов, локальный список лайков, загрузка изображений и
//! обратное геокодирование подключаются через трейты из [`data`], поэтому
//! сервисы из [`application`] одинаково работают с PostgreSQL и с
//! реализациями в памяти.

pub mod application;
pub mod data;
pub mod domain;
pub mod infrastructure;

pub use application::favorites_service::FavoritesService;
pub use application::home_feed::{FeedItem, HomeFeed, HomeFeedService};
pub use application::like_service::{LikeService, LikeToggle};
pub use application::post_composer::{FALLBACK_PLACE_NAME, PostComposer};
pub use application::ranked_feed::{
    FeedSnapshot, FetchMode, FetchOutcome, PAGE_SIZE, RankedFeedController,
};
pub use domain::draft::{ImageUpload, PostDraft, Waypoint};
pub use domain::error::DomainError;
pub use domain::post::{GeoPoint, Post, PostId};
pub use domain::ranking::RankingWindow;
pub use domain::viewer::Viewer;

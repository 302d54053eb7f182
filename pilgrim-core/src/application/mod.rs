pub mod favorites_service;
pub mod home_feed;
pub mod like_service;
pub mod post_composer;
pub mod ranked_feed;

pub mod likes_store;
pub mod post_repository;

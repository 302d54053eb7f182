pub mod geocoder;
pub mod image_storage;
pub mod likes_store;
pub mod post_repository;
pub mod repositories;

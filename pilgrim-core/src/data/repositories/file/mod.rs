pub mod likes_store;

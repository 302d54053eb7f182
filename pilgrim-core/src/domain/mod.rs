pub mod draft;
pub mod error;
pub mod post;
pub mod ranking;
pub mod viewer;

pub mod database;
pub mod local_image_storage;
pub mod logging;
pub mod nominatim;
pub mod settings;

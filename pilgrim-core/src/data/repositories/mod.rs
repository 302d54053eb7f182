pub mod file;
pub mod memory;
pub mod postgres;

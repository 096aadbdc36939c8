pub mod app;
pub mod import;
pub mod library;

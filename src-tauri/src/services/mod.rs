pub mod app;
pub mod config;
pub mod import;
pub mod metadata;

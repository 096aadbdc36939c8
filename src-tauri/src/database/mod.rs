pub mod library_repo;
pub mod models;
pub mod settings_repo;

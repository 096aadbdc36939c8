pub mod app_service;
pub mod log_service;

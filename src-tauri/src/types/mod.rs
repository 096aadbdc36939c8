pub mod errors;
pub mod import;

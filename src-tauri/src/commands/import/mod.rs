pub mod import_cmds;
pub mod session;

pub use session::ImportSession;

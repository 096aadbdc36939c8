pub mod app_cmds;
pub mod settings_cmds;

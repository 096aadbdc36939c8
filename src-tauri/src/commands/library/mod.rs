pub mod library_cmds;

pub mod commands;
pub mod loader;
pub mod trace_init;

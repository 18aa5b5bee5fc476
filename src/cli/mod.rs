pub mod completions;
pub mod config_path;
pub mod serve;

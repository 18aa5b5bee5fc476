pub mod config;
pub mod network;
pub mod paths;
pub mod tracing;

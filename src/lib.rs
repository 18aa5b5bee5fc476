pub mod application;
pub mod daemon;
pub mod domain;
pub mod infrastructure;

mod download;
pub mod embedded_assets;
pub mod error;
mod files_api;
pub mod media;
pub mod router;
pub mod server;
mod static_files;
pub mod transfer;
mod upload;

pub use router::{AppState, create_router};
pub use server::Server;

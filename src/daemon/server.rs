use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::router::{AppState, create_router};
use crate::infrastructure::config::ServerSettings;
use crate::infrastructure::network::get_lan_ip;
use crate::infrastructure::paths::ServerPaths;

pub struct Server {
    state: Arc<AppState>,
    addr: SocketAddr,
}

impl Server {
    pub fn new(settings: ServerSettings, paths: ServerPaths) -> Self {
        Self {
            state: Arc::new(AppState::new(paths, settings.max_upload_bytes)),
            addr: settings.addr,
        }
    }

    /// Address a browser on the LAN should use.
    fn public_url(&self) -> String {
        let host = match self.addr.ip() {
            ip if ip.is_unspecified() => IpAddr::V4(get_lan_ip()),
            ip => ip,
        };
        format!("http://{}", SocketAddr::new(host, self.addr.port()))
    }

    /// Serve until Ctrl+C.
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(self.addr).await.with_context(|| {
            format!(
                "Failed to bind to {}. Is another service using port {}?",
                self.addr,
                self.addr.port()
            )
        })?;

        let url = self.public_url();
        info!(
            addr = %self.addr,
            root = %self.state.root.path().display(),
            uploads = %self.state.upload_dir.display(),
            "Server listening"
        );
        println!("Serving {}", self.state.root.path().display());
        println!("Open {url} on any device in your network");
        println!("Press Ctrl+C to stop");

        let router = create_router(self.state);
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server error")?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(err) => warn!(error = %err, "Failed to listen for Ctrl+C"),
    }
}

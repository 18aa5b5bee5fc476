use anyhow::{Context, Result};
use std::net::IpAddr;
use std::path::PathBuf;

use lanshelf::daemon::Server;
use lanshelf::infrastructure::config::{ConfigStore, Overrides};
use lanshelf::infrastructure::paths::executable_dir;
use lanshelf::infrastructure::tracing::{LogTarget, init_tracing};

pub struct ServeArgs {
    pub root: Option<PathBuf>,
    pub port: Option<u16>,
    pub bind: Option<IpAddr>,
    pub upload_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub verbose: bool,
    pub log_file: Option<PathBuf>,
}

pub fn execute(args: ServeArgs) -> Result<()> {
    let output = match args.log_file {
        Some(path) => LogTarget::File(path),
        None => LogTarget::Stdout,
    };
    init_tracing(args.verbose, output)?;

    let config_path = match args.config {
        Some(path) => path,
        None => ConfigStore::default_path()?,
    };
    let store = ConfigStore::new(config_path);
    let config = store
        .load()
        .with_context(|| format!("Invalid config at {}", store.path().display()))?
        .apply(Overrides {
            bind: args.bind,
            port: args.port,
            root: args.root,
            upload_dir: args.upload_dir,
        });

    let default_root = executable_dir().context("Failed to locate the executable directory")?;
    let (settings, paths) = config.resolve(&default_root)?;

    run_server(Server::new(settings, paths))
}

#[tokio::main]
async fn run_server(server: Server) -> Result<()> {
    server.run().await
}

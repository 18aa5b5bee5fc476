use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::net::IpAddr;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "lanshelf")]
#[command(about = "Browse, stream, download and upload files across your local network")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve a directory to the local network
    Serve {
        /// Directory to serve (defaults to the executable's directory)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Port to listen on
        #[arg(long, short)]
        port: Option<u16>,

        /// Address to bind to
        #[arg(long)]
        bind: Option<IpAddr>,

        /// Where uploads are stored, relative to the root unless absolute
        #[arg(long)]
        upload_dir: Option<PathBuf>,

        /// Config file to read instead of lanshelf.toml next to the executable
        #[arg(long)]
        config: Option<PathBuf>,

        /// Enable debug logging
        #[arg(long, short)]
        verbose: bool,

        /// Write logs to this file instead of stdout
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show which config file would be used
    ConfigPath {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            root,
            port,
            bind,
            upload_dir,
            config,
            verbose,
            log_file,
        } => cli::serve::execute(cli::serve::ServeArgs {
            root,
            port,
            bind,
            upload_dir,
            config,
            verbose,
            log_file,
        }),
        Commands::Completions { shell } => cli::completions::execute(shell),
        Commands::ConfigPath { config } => cli::config_path::execute(config),
    }
}

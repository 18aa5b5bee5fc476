use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable holding a full `EnvFilter` directive.
pub const LOG_ENV: &str = "LANSHELF_LOG";

/// Where log lines go.
pub enum LogTarget {
    Stdout,
    /// Appended to, created along with its directory if missing.
    File(PathBuf),
}

/// Directives used when `LANSHELF_LOG` is unset. Request spans come from
/// `tower_http`, so it follows the same level.
fn default_directives(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!("lanshelf={level},tower_http={level}")
}

fn open_append(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_tracing(verbose: bool, target: LogTarget) -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    let (writer, ansi) = match target {
        LogTarget::Stdout => (BoxMakeWriter::new(io::stdout), true),
        LogTarget::File(path) => (BoxMakeWriter::new(Arc::new(open_append(&path)?)), false),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(ansi)
                .with_writer(writer),
        )
        .try_init()
        .context("Failed to install tracing subscriber")
}

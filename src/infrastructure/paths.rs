use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::domain::ServerRoot;

/// Directory of the client assets, relative to the root.
pub const ASSETS_DIR_NAME: &str = "assets";

/// Default upload directory, relative to the root.
pub const UPLOADS_DIR_NAME: &str = "uploads";

/// All resolved paths the server works with.
/// Built once at startup, then passed to components via `AppState`.
#[derive(Debug, Clone)]
pub struct ServerPaths {
    pub root: ServerRoot,
    pub upload_dir: PathBuf,
    pub assets_dir: PathBuf,
}

impl ServerPaths {
    /// Resolve the root and make sure the upload directory exists.
    ///
    /// A relative `upload_dir` is taken relative to the root.
    pub fn new(root: impl AsRef<Path>, upload_dir: Option<PathBuf>) -> io::Result<Self> {
        let root = ServerRoot::new(root)?;

        let upload_dir = match upload_dir {
            Some(dir) if dir.is_absolute() => dir,
            Some(dir) => root.path().join(dir),
            None => root.path().join(UPLOADS_DIR_NAME),
        };
        fs::create_dir_all(&upload_dir)?;

        let assets_dir = root.path().join(ASSETS_DIR_NAME);

        Ok(Self {
            root,
            upload_dir,
            assets_dir,
        })
    }
}

/// Directory containing the running executable.
/// Default root and default config location.
pub fn executable_dir() -> io::Result<PathBuf> {
    let exe = env::current_exe()?;
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} has no parent directory", exe.display()),
        )
    })
}

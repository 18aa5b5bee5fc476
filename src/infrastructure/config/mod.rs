use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::paths::{ServerPaths, executable_dir};

pub const DEFAULT_PORT: u16 = 1313;
pub const CONFIG_FILE_NAME: &str = "lanshelf.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Cannot serve {path}: {source}")]
    InvalidRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to locate the executable directory: {0}")]
    LocateError(#[source] std::io::Error),

    #[error("Port must be between 1 and 65535, got: {0}")]
    InvalidPort(u16),
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: IpAddr,
    pub port: u16,
    /// Directory to expose; defaults to the directory of the executable.
    pub root: Option<PathBuf>,
    /// Upload target, relative to `root` unless absolute.
    pub upload_dir: Option<PathBuf>,
    /// Largest accepted upload body in bytes; `0` means unlimited.
    pub max_upload_bytes: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            root: None,
            upload_dir: None,
            max_upload_bytes: 0,
        }
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub bind: Option<IpAddr>,
    pub port: Option<u16>,
    pub root: Option<PathBuf>,
    pub upload_dir: Option<PathBuf>,
}

/// Network settings derived from the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub max_upload_bytes: Option<usize>,
}

impl Config {
    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(bind) = overrides.bind {
            self.server.bind = bind;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if overrides.root.is_some() {
            self.server.root = overrides.root;
        }
        if overrides.upload_dir.is_some() {
            self.server.upload_dir = overrides.upload_dir;
        }
        self
    }

    /// Validate the config and turn it into settings and paths.
    ///
    /// `default_root` is used when no root is configured.
    pub fn resolve(&self, default_root: &Path) -> Result<(ServerSettings, ServerPaths), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidPort(self.server.port));
        }

        let root = self
            .server
            .root
            .clone()
            .unwrap_or_else(|| default_root.to_path_buf());
        let paths = ServerPaths::new(&root, self.server.upload_dir.clone())
            .map_err(|source| ConfigError::InvalidRoot { path: root, source })?;

        let max_upload_bytes = match self.server.max_upload_bytes {
            0 => None,
            limit => Some(usize::try_from(limit).unwrap_or(usize::MAX)),
        };

        let settings = ServerSettings {
            addr: SocketAddr::new(self.server.bind, self.server.port),
            max_upload_bytes,
        };

        Ok((settings, paths))
    }
}

pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `lanshelf.toml` next to the executable.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dir = executable_dir().map_err(ConfigError::LocateError)?;
        Ok(dir.join(CONFIG_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config file; a missing file yields the defaults.
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&self.path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(tmp.path().join(CONFIG_FILE_NAME));

        let config = store.load().unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.server.bind, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }

    #[test]
    fn test_load_partial_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[server]\nport = 8080\nupload_dir = \"inbox\"\n").unwrap();

        let config = ConfigStore::new(path).load().unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.upload_dir, Some(PathBuf::from("inbox")));
        assert_eq!(config.server.root, None);
        assert_eq!(config.server.max_upload_bytes, 0);
    }

    #[test]
    fn test_invalid_toml() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[server\nport = ").unwrap();

        assert!(matches!(
            ConfigStore::new(path).load(),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let config = Config::default().apply(Overrides {
            port: Some(9000),
            root: Some(PathBuf::from("/srv/share")),
            ..Overrides::default()
        });

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.root, Some(PathBuf::from("/srv/share")));
        assert_eq!(config.server.bind, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }

    #[test]
    fn test_resolve() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.server.max_upload_bytes = 1024;

        let (settings, paths) = config.resolve(tmp.path()).unwrap();

        assert_eq!(settings.addr.port(), DEFAULT_PORT);
        assert_eq!(settings.max_upload_bytes, Some(1024));
        assert!(paths.upload_dir.is_dir());
    }

    #[test]
    fn test_resolve_rejects_port_zero() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::default().apply(Overrides {
            port: Some(0),
            ..Overrides::default()
        });

        assert!(matches!(
            config.resolve(tmp.path()),
            Err(ConfigError::InvalidPort(0))
        ));
    }

    #[test]
    fn test_resolve_rejects_missing_root() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::default().apply(Overrides {
            root: Some(tmp.path().join("missing")),
            ..Overrides::default()
        });

        assert!(matches!(
            config.resolve(tmp.path()),
            Err(ConfigError::InvalidRoot { .. })
        ));
    }
}

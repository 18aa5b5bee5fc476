use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::domain::encoding::percent_decode;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("Path escapes the server root: {0}")]
    Forbidden(String),

    #[error("Path not found: {0}")]
    NotFound(String),
}

/// The directory tree exposed by the server.
///
/// Holds the canonical form of the directory, so containment checks can
/// compare against canonicalized request paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerRoot(PathBuf);

impl ServerRoot {
    pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
        let canonical = path.as_ref().canonicalize()?;
        if !canonical.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("{} is not a directory", canonical.display()),
            ));
        }
        Ok(Self(canonical))
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Resolve an untrusted, possibly percent-encoded path against the root.
    ///
    /// Relative input is joined to the root, absolute input is taken as-is.
    /// `.` and `..` are collapsed lexically before the containment check, so
    /// the target does not need to exist. When it does exist, symlinks are
    /// resolved and the canonical target must still be inside the root.
    pub fn resolve(&self, raw: &str) -> Result<ResolvedPath, PathError> {
        let decoded = percent_decode(raw);
        let candidate = Path::new(&decoded);
        let joined = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.0.join(candidate)
        };

        let absolute = normalize(&joined);
        let relative = absolute
            .strip_prefix(&self.0)
            .map_err(|_| PathError::Forbidden(raw.to_string()))?
            .to_path_buf();

        if let Ok(canonical) = absolute.canonicalize()
            && !canonical.starts_with(&self.0)
        {
            return Err(PathError::Forbidden(raw.to_string()));
        }

        Ok(ResolvedPath { absolute, relative })
    }
}

impl fmt::Display for ServerRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// A path that is known to be the server root or one of its descendants.
///
/// Only [`ServerRoot::resolve`] creates these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    absolute: PathBuf,
    relative: PathBuf,
}

impl ResolvedPath {
    pub fn as_path(&self) -> &Path {
        &self.absolute
    }

    pub fn relative(&self) -> &Path {
        &self.relative
    }

    pub fn is_root(&self) -> bool {
        self.relative.as_os_str().is_empty()
    }

    /// Root-relative form with `/` separators; empty for the root itself.
    pub fn relative_slash(&self) -> String {
        to_slash(&self.relative)
    }

    /// Root-relative, `/`-separated path of a direct child.
    pub fn child_relative(&self, name: &str) -> String {
        if self.is_root() {
            name.to_string()
        } else {
            format!("{}/{}", self.relative_slash(), name)
        }
    }

    /// Last path segment, `None` for the root.
    pub fn file_name(&self) -> Option<String> {
        self.relative
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, ".")
        } else {
            write!(f, "{}", self.relative_slash())
        }
    }
}

/// Join the normal components of `path` with `/`.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn root() -> (tempfile::TempDir, ServerRoot) {
        let tmp = tempfile::tempdir().unwrap();
        let root = ServerRoot::new(tmp.path()).unwrap();
        (tmp, root)
    }

    #[test]
    fn test_resolve_root() {
        let (_tmp, root) = root();

        for raw in ["", ".", "./", "docs/.."] {
            let resolved = root.resolve(raw).unwrap();
            assert!(resolved.is_root(), "{raw:?} should resolve to the root");
            assert_eq!(resolved.as_path(), root.path());
        }
    }

    #[test]
    fn test_resolve_subdir() {
        let (_tmp, root) = root();
        fs::create_dir(root.path().join("docs")).unwrap();

        let resolved = root.resolve("docs").unwrap();
        assert_eq!(resolved.as_path(), root.path().join("docs"));
        assert_eq!(resolved.relative_slash(), "docs");
        assert_eq!(resolved.child_relative("a.txt"), "docs/a.txt");
        assert_eq!(resolved.file_name().as_deref(), Some("docs"));
    }

    #[test]
    fn test_resolve_does_not_require_existence() {
        let (_tmp, root) = root();

        let resolved = root.resolve("missing/file.txt").unwrap();
        assert_eq!(resolved.relative_slash(), "missing/file.txt");
        assert!(!resolved.as_path().exists());
    }

    #[test]
    fn test_resolve_traversal_blocked() {
        let (_tmp, root) = root();

        for raw in [
            "..",
            "../",
            "../../../etc/passwd",
            "docs/../../secret",
            "%2e%2e/%2e%2e/etc/passwd",
            "./../sibling",
        ] {
            assert!(
                matches!(root.resolve(raw), Err(PathError::Forbidden(_))),
                "{raw:?} must be rejected"
            );
        }
    }

    #[test]
    fn test_resolve_absolute_outside_root_blocked() {
        let (_tmp, root) = root();

        assert!(matches!(
            root.resolve("/etc/passwd"),
            Err(PathError::Forbidden(_))
        ));
    }

    #[test]
    fn test_resolve_absolute_inside_root_allowed() {
        let (_tmp, root) = root();
        fs::write(root.path().join("a.txt"), "hello").unwrap();

        let absolute = root.path().join("a.txt");
        let resolved = root.resolve(&absolute.to_string_lossy()).unwrap();
        assert_eq!(resolved.relative_slash(), "a.txt");
    }

    #[test]
    fn test_resolve_sibling_with_common_prefix_blocked() {
        let parent = tempfile::tempdir().unwrap();
        let share = parent.path().join("share");
        let sibling = parent.path().join("share-private");
        fs::create_dir(&share).unwrap();
        fs::create_dir(&sibling).unwrap();
        let root = ServerRoot::new(&share).unwrap();

        let outside = sibling.canonicalize().unwrap();
        assert!(matches!(
            root.resolve(&outside.to_string_lossy()),
            Err(PathError::Forbidden(_))
        ));
    }

    #[test]
    fn test_resolve_percent_encoded() {
        let (_tmp, root) = root();
        fs::create_dir(root.path().join("my dir")).unwrap();

        let resolved = root.resolve("my%20dir").unwrap();
        assert_eq!(resolved.as_path(), root.path().join("my dir"));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_symlink_escaping_root_blocked() {
        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("secret.txt"), "secret").unwrap();
        let (_tmp, root) = root();
        std::os::unix::fs::symlink(outside.path(), root.path().join("escape")).unwrap();

        assert!(matches!(
            root.resolve("escape/secret.txt"),
            Err(PathError::Forbidden(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_symlink_inside_root_allowed() {
        let (_tmp, root) = root();
        fs::create_dir(root.path().join("real")).unwrap();
        fs::write(root.path().join("real/a.txt"), "a").unwrap();
        std::os::unix::fs::symlink(root.path().join("real"), root.path().join("link")).unwrap();

        let resolved = root.resolve("link/a.txt").unwrap();
        assert_eq!(resolved.relative_slash(), "link/a.txt");
    }

    #[test]
    fn test_server_root_rejects_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("file.txt");
        fs::write(&file, "x").unwrap();

        assert!(ServerRoot::new(&file).is_err());
    }

    #[test]
    fn test_display() {
        let (_tmp, root) = root();
        assert_eq!(root.resolve("").unwrap().to_string(), ".");
        assert_eq!(root.resolve("a/b").unwrap().to_string(), "a/b");
    }
}

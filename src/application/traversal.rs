use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::domain::is_visible;

/// Every visible regular file below `dir`.
///
/// Hidden and reserved directories are pruned at any depth; `dir` itself is
/// never filtered. Symlinks are not followed. Entries that fail to read are
/// skipped.
pub(crate) fn visible_files(dir: &Path) -> impl Iterator<Item = walkdir::DirEntry> {
    WalkDir::new(dir)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || is_visible(entry.path()))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                debug!(error = %err, "Skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
}

use std::path::Path;

use super::traversal::visible_files;

/// Total size in bytes of the visible files below `dir`.
///
/// Best effort: unreadable subtrees and files count as zero.
pub fn folder_size(dir: &Path) -> u64 {
    visible_files(dir)
        .filter_map(|entry| entry.metadata().ok())
        .map(|metadata| metadata.len())
        .sum()
}

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use thiserror::Error;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::traversal::visible_files;
use crate::domain::ResolvedPath;
use crate::domain::value_objects::to_slash;

/// Archive name used when the server root itself is zipped.
pub const ROOT_ARCHIVE_NAME: &str = "folder";

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Failed to write archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Failed to write archive: {0}")]
    Io(#[from] std::io::Error),
}

/// Deflate-compressed ZIP of the visible files below `dir`.
///
/// Entry names are relative to `dir`. Files that cannot be read are left
/// out of the archive.
pub fn build_zip(dir: &Path) -> Result<Vec<u8>, ArchiveError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let base_options =
        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut added = 0usize;
    for entry in visible_files(dir) {
        let Ok(within) = entry.path().strip_prefix(dir) else {
            continue;
        };
        let name = to_slash(within);

        let data = match fs::read(entry.path()) {
            Ok(data) => data,
            Err(err) => {
                debug!(entry = %name, error = %err, "Skipping unreadable file");
                continue;
            }
        };

        let options = base_options.large_file(data.len() as u64 >= u64::from(u32::MAX));
        zip.start_file(name, options)?;
        zip.write_all(&data)?;
        added += 1;
    }

    debug!(folder = %dir.display(), files = added, "Archive built");
    Ok(zip.finish()?.into_inner())
}

/// Download filename for the archive of `dir`.
pub fn archive_file_name(dir: &ResolvedPath) -> String {
    let base = dir
        .file_name()
        .unwrap_or_else(|| ROOT_ARCHIVE_NAME.to_string());
    format!("{base}.zip")
}

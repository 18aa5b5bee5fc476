pub mod build_archive;
pub mod folder_size;
pub mod ingest_upload;
pub mod list_directory;
mod traversal;

pub use build_archive::{ArchiveError, archive_file_name, build_zip};
pub use folder_size::folder_size;
pub use ingest_upload::{UploadError, UploadIngestor};
pub use list_directory::{list_all_recursive, list_children};

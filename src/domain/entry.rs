use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Folder,
    File,
}

/// One immediate child of a listed folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirEntry {
    /// Root-relative path with `/` separators.
    pub path: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// File length, or the recursive size of a folder's visible files.
    pub size: u64,
}

impl DirEntry {
    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }
}

/// One file of the flat, whole-tree listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatEntry {
    pub path: String,
    pub name: String,
    pub size: u64,
    /// Containing directory, written as `.` or `./sub/dir`.
    pub directory: String,
}

/// Folders first, then case-insensitive name order.
pub fn sort_entries(entries: &mut [DirEntry]) {
    entries.sort_by(|a, b| {
        b.is_folder()
            .cmp(&a.is_folder())
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
}

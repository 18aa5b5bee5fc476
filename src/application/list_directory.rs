use std::fs;

use tracing::debug;

use super::folder_size::folder_size;
use super::traversal::visible_files;
use crate::domain::value_objects::to_slash;
use crate::domain::{
    DirEntry, EntryKind, FlatEntry, PathError, ResolvedPath, is_visible, sort_entries,
};

/// Immediate visible children of `dir`, folders first, then by name.
///
/// Folders report the recursive size of their visible files. Entries that
/// cannot be inspected are left out of the listing.
pub fn list_children(dir: &ResolvedPath) -> Result<Vec<DirEntry>, PathError> {
    if !dir.as_path().is_dir() {
        return Err(PathError::NotFound(dir.to_string()));
    }

    let read_dir = match fs::read_dir(dir.as_path()) {
        Ok(read_dir) => read_dir,
        Err(err) => {
            debug!(folder = %dir, error = %err, "Folder is not readable");
            return Ok(Vec::new());
        }
    };

    let mut entries: Vec<DirEntry> = read_dir
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let path = entry.path();
            if !is_visible(&path) {
                return None;
            }

            let file_type = entry.file_type().ok()?;
            let name = entry.file_name().to_string_lossy().to_string();
            let relative = dir.child_relative(&name);

            if file_type.is_dir() {
                Some(DirEntry {
                    path: relative,
                    name,
                    kind: EntryKind::Folder,
                    size: folder_size(&path),
                })
            } else if file_type.is_file() {
                let size = match entry.metadata() {
                    Ok(metadata) => metadata.len(),
                    Err(err) => {
                        debug!(path = %relative, error = %err, "Skipping file without metadata");
                        return None;
                    }
                };
                Some(DirEntry {
                    path: relative,
                    name,
                    kind: EntryKind::File,
                    size,
                })
            } else {
                None
            }
        })
        .collect();

    sort_entries(&mut entries);
    Ok(entries)
}

/// Every visible file below `root` as one flat list, in walk order.
pub fn list_all_recursive(root: &ResolvedPath) -> Result<Vec<FlatEntry>, PathError> {
    if !root.as_path().is_dir() {
        return Err(PathError::NotFound(root.to_string()));
    }

    let files = visible_files(root.as_path())
        .filter_map(|entry| {
            let size = entry.metadata().ok()?.len();
            let within = entry.path().strip_prefix(root.as_path()).ok()?;
            let path = root.child_relative(&to_slash(within));
            let name = entry.file_name().to_string_lossy().to_string();

            let parent = path.rsplit_once('/').map(|(parent, _)| parent);
            let directory = match parent {
                Some(parent) => format!("./{parent}"),
                None => ".".to_string(),
            };

            Some(FlatEntry {
                path,
                name,
                size,
                directory,
            })
        })
        .collect();

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ServerRoot;

    fn fixture() -> (tempfile::TempDir, ServerRoot) {
        let tmp = tempfile::tempdir().unwrap();
        let root = ServerRoot::new(tmp.path()).unwrap();
        let base = root.path();
        fs::create_dir_all(base.join("docs/uploads")).unwrap();
        fs::write(base.join("docs/a.txt"), vec![b'a'; 10]).unwrap();
        fs::write(base.join("docs/.hidden"), vec![b'h'; 5]).unwrap();
        fs::write(base.join("docs/uploads/x.bin"), vec![b'x'; 100]).unwrap();
        (tmp, root)
    }

    #[test]
    fn test_list_children_folder_size_excludes_hidden_and_reserved() {
        let (_tmp, root) = fixture();

        let entries = list_children(&root.resolve("").unwrap()).unwrap();

        assert_eq!(
            entries,
            vec![DirEntry {
                path: "docs".to_string(),
                name: "docs".to_string(),
                kind: EntryKind::Folder,
                size: 10,
            }]
        );
    }

    #[test]
    fn test_list_children_of_subfolder() {
        let (_tmp, root) = fixture();

        let entries = list_children(&root.resolve("docs").unwrap()).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "docs/a.txt");
        assert_eq!(entries[0].name, "a.txt");
        assert_eq!(entries[0].kind, EntryKind::File);
        assert_eq!(entries[0].size, 10);
    }

    #[test]
    fn test_list_children_sorts_folders_first() {
        let tmp = tempfile::tempdir().unwrap();
        let root = ServerRoot::new(tmp.path()).unwrap();
        fs::write(root.path().join("b_file.txt"), "hello").unwrap();
        fs::create_dir(root.path().join("Z_dir")).unwrap();
        fs::create_dir(root.path().join("a_dir")).unwrap();
        fs::write(root.path().join("A_file.txt"), "world").unwrap();

        let entries = list_children(&root.resolve("").unwrap()).unwrap();

        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a_dir", "Z_dir", "A_file.txt", "b_file.txt"]);
    }

    #[test]
    fn test_list_children_never_exposes_hidden_names() {
        let tmp = tempfile::tempdir().unwrap();
        let root = ServerRoot::new(tmp.path()).unwrap();
        for dir in [".git", "uploads", "assets", "visible"] {
            fs::create_dir(root.path().join(dir)).unwrap();
        }
        fs::write(root.path().join(".env"), "SECRET=1").unwrap();

        let entries = list_children(&root.resolve("").unwrap()).unwrap();

        assert!(entries.iter().all(|e| {
            !e.name.starts_with('.') && e.name != "uploads" && e.name != "assets"
        }));
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_folder_size_matches_calculator() {
        let (_tmp, root) = fixture();
        fs::create_dir_all(root.path().join("docs/nested")).unwrap();
        fs::write(root.path().join("docs/nested/b.txt"), vec![0u8; 32]).unwrap();

        let entries = list_children(&root.resolve("").unwrap()).unwrap();

        assert_eq!(entries[0].size, folder_size(&root.path().join("docs")));
        assert_eq!(entries[0].size, 42);
    }

    #[test]
    fn test_list_children_missing_folder() {
        let (_tmp, root) = fixture();

        let result = list_children(&root.resolve("nope").unwrap());
        assert!(matches!(result, Err(PathError::NotFound(_))));
    }

    #[test]
    fn test_list_children_of_file_is_not_found() {
        let (_tmp, root) = fixture();

        let result = list_children(&root.resolve("docs/a.txt").unwrap());
        assert!(matches!(result, Err(PathError::NotFound(_))));
    }

    #[test]
    fn test_list_all_recursive() {
        let (_tmp, root) = fixture();
        fs::write(root.path().join("top.txt"), "top").unwrap();

        let mut files = list_all_recursive(&root.resolve("").unwrap()).unwrap();
        files.sort_by(|a, b| a.path.cmp(&b.path));

        assert_eq!(
            files,
            vec![
                FlatEntry {
                    path: "docs/a.txt".to_string(),
                    name: "a.txt".to_string(),
                    size: 10,
                    directory: "./docs".to_string(),
                },
                FlatEntry {
                    path: "top.txt".to_string(),
                    name: "top.txt".to_string(),
                    size: 3,
                    directory: ".".to_string(),
                },
            ]
        );
    }
}

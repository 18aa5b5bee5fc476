use std::path::Path;

/// Directory names that are never exposed, at any depth.
pub const RESERVED_NAMES: [&str; 2] = ["uploads", "assets"];

/// Whether a directory entry may appear in listings, folder sizes and archives.
///
/// An entry is hidden when its name starts with `.`, when it is one of
/// [`RESERVED_NAMES`], or when the platform marks it hidden.
pub fn is_visible(path: &Path) -> bool {
    let Some(name) = path.file_name() else {
        return true;
    };

    if !is_visible_name(&name.to_string_lossy()) {
        return false;
    }

    !has_hidden_attribute(path)
}

/// Name-only part of [`is_visible`].
pub fn is_visible_name(name: &str) -> bool {
    !name.starts_with('.') && !RESERVED_NAMES.contains(&name)
}

#[cfg(windows)]
fn has_hidden_attribute(path: &Path) -> bool {
    use std::os::windows::fs::MetadataExt;

    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;

    std::fs::symlink_metadata(path)
        .map(|metadata| metadata.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0)
        .unwrap_or(false)
}

#[cfg(not(windows))]
fn has_hidden_attribute(_path: &Path) -> bool {
    false
}

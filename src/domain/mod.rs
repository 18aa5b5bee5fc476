pub mod encoding;
mod entry;
pub mod value_objects;
pub mod visibility;

pub use entry::{DirEntry, EntryKind, FlatEntry, sort_entries};
pub use value_objects::{ByteRange, PathError, RangeError, ResolvedPath, ServerRoot};
pub use visibility::is_visible;

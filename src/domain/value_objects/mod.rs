mod byte_range;
mod server_root;

pub use byte_range::{ByteRange, RangeError};
pub use server_root::{PathError, ResolvedPath, ServerRoot, to_slash};

//! Path types that make unsafe destinations unrepresentable.

mod dest_dir;
mod safe_path;

pub use dest_dir::DestDir;
pub use safe_path::SafePath;

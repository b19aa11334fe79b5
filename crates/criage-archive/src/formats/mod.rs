//! Archive format registry, detection and codec plumbing.

pub mod compression;
pub mod detect;
pub mod registry;

pub use detect::Detection;
pub use detect::detect_format;
pub use detect::detect_format_with_source;
pub use detect::format_from_extension;
pub use registry::ArchiveFormat;
pub use registry::Codec;
pub use registry::FormatSpec;

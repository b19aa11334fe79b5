//! Archive manager configuration.

use std::path::PathBuf;

use crate::ArchiveError;
use crate::ArchiveFormat;
use crate::Result;

/// Named points on the 1-9 compression scale.
#[derive(Debug, Clone, Copy)]
pub struct CompressionLevel;

impl CompressionLevel {
    /// Fastest compression.
    pub const FAST: u8 = 1;
    /// Balanced default.
    pub const NORMAL: u8 = 5;
    /// Smallest output.
    pub const BEST: u8 = 9;
}

/// Settings an [`ArchiveManager`](crate::ArchiveManager) is constructed with.
///
/// The manager does no configuration parsing of its own; callers fill this
/// in from whatever source they use.
///
/// # Examples
///
/// ```
/// use criage_archive::ArchiveFormat;
/// use criage_archive::CompressionLevel;
/// use criage_archive::ManagerConfig;
///
/// let config = ManagerConfig::new("1.4.0")
///     .with_compression_level(CompressionLevel::BEST)
///     .with_preferred_format(ArchiveFormat::TarXz);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Compression level on the 1-9 scale.
    ///
    /// Default: [`CompressionLevel::NORMAL`].
    pub compression_level: u8,

    /// Format used when a caller does not name one.
    ///
    /// Default: `tar.zst`.
    pub preferred_format: ArchiveFormat,

    /// Value recorded as `createdBy` in metadata.
    ///
    /// Default: `"criage"`.
    pub creator: String,

    /// Tool version recorded in metadata.
    ///
    /// Default: this crate's version.
    pub version: String,

    /// Parent directory for metadata scratch space.
    ///
    /// Default: `None` (system temporary directory).
    pub scratch_dir: Option<PathBuf>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            compression_level: CompressionLevel::NORMAL,
            preferred_format: ArchiveFormat::default(),
            creator: "criage".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            scratch_dir: None,
        }
    }
}

impl ManagerConfig {
    /// Creates a configuration recording `version` as the tool version.
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Self::default()
        }
    }

    /// Sets the compression level. Checked by [`validate`](Self::validate).
    #[must_use]
    pub fn with_compression_level(mut self, level: u8) -> Self {
        self.compression_level = level;
        self
    }

    /// Sets the preferred format.
    #[must_use]
    pub fn with_preferred_format(mut self, format: ArchiveFormat) -> Self {
        self.preferred_format = format;
        self
    }

    /// Sets the preferred format from a label such as `"tar.gz"`.
    pub fn with_preferred_format_label(mut self, label: &str) -> Result<Self> {
        self.preferred_format = label.parse()?;
        Ok(self)
    }

    /// Sets the creator recorded in metadata.
    #[must_use]
    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = creator.into();
        self
    }

    /// Sets the scratch directory parent.
    #[must_use]
    pub fn with_scratch_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.scratch_dir = dir;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::InvalidCompressionLevel`] if the level is not
    /// in 1-9.
    pub fn validate(&self) -> Result<()> {
        if !(CompressionLevel::FAST..=CompressionLevel::BEST).contains(&self.compression_level) {
            return Err(ArchiveError::InvalidCompressionLevel {
                level: self.compression_level,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_manager_config_default() {
        let config = ManagerConfig::default();
        assert_eq!(config.compression_level, 5);
        assert_eq!(config.preferred_format, ArchiveFormat::TarZst);
        assert_eq!(config.creator, "criage");
        assert_eq!(config.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(config.scratch_dir, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_manager_config_builder() {
        let config = ManagerConfig::new("2.0.0")
            .with_compression_level(CompressionLevel::FAST)
            .with_preferred_format(ArchiveFormat::Zip)
            .with_creator("ci-bot")
            .with_scratch_dir(Some(PathBuf::from("/var/tmp")));

        assert_eq!(config.version, "2.0.0");
        assert_eq!(config.compression_level, 1);
        assert_eq!(config.preferred_format, ArchiveFormat::Zip);
        assert_eq!(config.creator, "ci-bot");
        assert_eq!(config.scratch_dir, Some(PathBuf::from("/var/tmp")));
    }

    #[test]
    fn test_preferred_format_label() {
        let config = ManagerConfig::default()
            .with_preferred_format_label("tar.lz4")
            .unwrap();
        assert_eq!(config.preferred_format, ArchiveFormat::TarLz4);

        assert!(matches!(
            ManagerConfig::default().with_preferred_format_label("7z"),
            Err(ArchiveError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_validate_level_bounds() {
        for level in [0u8, 10, 255] {
            let err = ManagerConfig::default()
                .with_compression_level(level)
                .validate()
                .unwrap_err();
            assert!(matches!(
                err,
                ArchiveError::InvalidCompressionLevel { level: l } if l == level
            ));
        }
        for level in 1..=9 {
            assert!(
                ManagerConfig::default()
                    .with_compression_level(level)
                    .validate()
                    .is_ok()
            );
        }
    }
}

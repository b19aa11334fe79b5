//! Package metadata document embedded in every archive.
//!
//! The document is stored as pretty-printed JSON under
//! [`METADATA_ENTRY_NAME`] at the archive root. Field names are camelCase on
//! the wire; empty optional collections are omitted.

use std::collections::BTreeMap;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Reserved archive entry holding the metadata document.
pub const METADATA_ENTRY_NAME: &str = ".criage-metadata.json";

/// Human-authored manifest used when the reserved entry is missing.
pub const MANIFEST_FILE_NAME: &str = "criage.yaml";

/// Metadata record written into and read back from an archive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PackageMetadata {
    /// Package manifest, when the archive was built from one.
    #[serde(rename = "package", skip_serializing_if = "Option::is_none")]
    pub package: Option<PackageManifest>,
    /// Build manifest, when the archive came out of a build.
    #[serde(rename = "build", skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildManifest>,
    /// Format label of the archive (`tar.zst`, `zip`, ...).
    pub compression_type: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Tool that created the archive.
    pub created_by: String,
    /// Version of the creating tool.
    pub version: String,
}

impl PackageMetadata {
    /// Parses a metadata document.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Serializes the document the way it is stored in archives.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }
}

/// Package description as authored by the package maintainer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)]
pub struct PackageManifest {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
    pub license: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub dev_dependencies: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub scripts: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub arch: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub os: Vec<String>,
    /// Minimum package manager version able to install the package.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hooks: Option<PackageHooks>,
    /// Free-form extra fields.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// Lifecycle hook commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)]
pub struct PackageHooks {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pre_install: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub post_install: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pre_remove: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub post_remove: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pre_update: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub post_update: Vec<String>,
}

/// How the package payload was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)]
pub struct BuildManifest {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_script: Option<String>,
    pub output_dir: String,
    pub include_files: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude_files: Vec<String>,
    pub compression: CompressionSettings,
    pub targets: Vec<BuildTarget>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
}

/// Compression settings recorded by a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CompressionSettings {
    /// Format label.
    pub format: String,
    /// Level on the 1-9 scale.
    pub level: u8,
}

/// A platform a build targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
#[allow(missing_docs)]
pub struct BuildTarget {
    pub os: String,
    pub arch: String,
}

//! Output formatter trait for CLI results.

use anyhow::Result;
use criage_archive::ArchiveFormat;
use criage_archive::CreationReport;
use criage_archive::Detection;
use criage_archive::ExtractionReport;
use criage_archive::PackageMetadata;
use serde::Serialize;
use std::path::Path;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format pack result
    fn format_pack_result(&self, output: &Path, report: &CreationReport) -> Result<()>;

    /// Format unpack result
    fn format_unpack_result(&self, dest: &Path, report: &ExtractionReport) -> Result<()>;

    /// Format the metadata read from an archive
    fn format_metadata(&self, archive: &Path, metadata: &PackageMetadata) -> Result<()>;

    /// Format a format detection
    fn format_detection(
        &self,
        archive: &Path,
        format: ArchiveFormat,
        detection: Detection,
    ) -> Result<()>;

    /// Format error message
    fn format_error(&self, error: &anyhow::Error);

    /// Format warning message
    fn format_warning(&self, message: &str);
}

/// Short name of how a format was determined
pub const fn detection_label(detection: Detection) -> &'static str {
    match detection {
        Detection::Extension => "extension",
        Detection::Signature => "signature",
        Detection::Fallback => "fallback",
    }
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }
}

impl JsonOutput<()> {
    pub fn error(operation: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_json_output_shape() {
        let ok = serde_json::to_value(JsonOutput::success("detect", 1)).unwrap();
        assert_eq!(ok["status"], "success");
        assert_eq!(ok["data"], 1);
        assert!(ok.get("error").is_none());

        let err = serde_json::to_value(JsonOutput::error("pack", "boom")).unwrap();
        assert_eq!(err["status"], "error");
        assert_eq!(err["error"], "boom");
        assert!(err.get("data").is_none());
    }

    #[test]
    fn test_detection_label() {
        assert_eq!(detection_label(Detection::Signature), "signature");
    }
}

//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use super::formatter::detection_label;
use anyhow::Result;
use criage_archive::ArchiveFormat;
use criage_archive::CreationReport;
use criage_archive::Detection;
use criage_archive::ExtractionReport;
use criage_archive::PackageMetadata;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_pack_result(&self, output: &Path, report: &CreationReport) -> Result<()> {
        #[derive(Serialize)]
        struct PackOutput {
            output_path: String,
            format: String,
            files_added: usize,
            directories_added: usize,
            entries_excluded: usize,
            entries_skipped: usize,
            bytes_read: u64,
            archive_size: u64,
            compression_ratio: f64,
            duration_ms: u128,
            warnings: Vec<String>,
        }

        let data = PackOutput {
            output_path: output.display().to_string(),
            format: report.format.to_string(),
            files_added: report.files_added,
            directories_added: report.directories_added,
            entries_excluded: report.entries_excluded,
            entries_skipped: report.entries_skipped,
            bytes_read: report.bytes_read,
            archive_size: report.archive_size,
            compression_ratio: report.compression_ratio(),
            duration_ms: report.duration.as_millis(),
            warnings: report.warnings.clone(),
        };

        Self::output(&JsonOutput::success("pack", data))
    }

    fn format_unpack_result(&self, dest: &Path, report: &ExtractionReport) -> Result<()> {
        #[derive(Serialize)]
        struct UnpackOutput {
            destination: String,
            files_extracted: usize,
            directories_created: usize,
            entries_skipped: usize,
            bytes_written: u64,
            duration_ms: u128,
        }

        let data = UnpackOutput {
            destination: dest.display().to_string(),
            files_extracted: report.files_extracted,
            directories_created: report.directories_created,
            entries_skipped: report.entries_skipped,
            bytes_written: report.bytes_written,
            duration_ms: report.duration.as_millis(),
        };

        Self::output(&JsonOutput::success("unpack", data))
    }

    fn format_metadata(&self, _archive: &Path, metadata: &PackageMetadata) -> Result<()> {
        Self::output(&JsonOutput::success("metadata", metadata))
    }

    fn format_detection(
        &self,
        archive: &Path,
        format: ArchiveFormat,
        detection: Detection,
    ) -> Result<()> {
        #[derive(Serialize)]
        struct DetectOutput {
            archive: String,
            format: &'static str,
            detected_by: &'static str,
        }

        let data = DetectOutput {
            archive: archive.display().to_string(),
            format: format.label(),
            detected_by: detection_label(detection),
        };

        Self::output(&JsonOutput::success("detect", data))
    }

    fn format_error(&self, error: &anyhow::Error) {
        let output = JsonOutput::error("error", format!("{error:#}"));
        let _ = Self::output(&output);
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData {
            message: String,
        }

        let output = JsonOutput::success(
            "warning",
            WarningData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }
}

//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use super::formatter::detection_label;
use anyhow::Result;
use console::Term;
use console::style;
use criage_archive::ArchiveFormat;
use criage_archive::CreationReport;
use criage_archive::Detection;
use criage_archive::ExtractionReport;
use criage_archive::PackageMetadata;
use std::path::Path;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        for (i, c) in s.chars().rev().enumerate() {
            if i > 0 && i % 3 == 0 {
                result.push(',');
            }
            result.push(c);
        }
        result.chars().rev().collect()
    }

    fn headline(&self, text: &str) {
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {text}", style("✓").green().bold()));
        } else {
            let _ = self.term.write_line(text);
        }
    }

    fn field(&self, label: &str, value: impl std::fmt::Display) {
        let _ = self.term.write_line(&format!("  {label:<17} {value}"));
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_pack_result(&self, output: &Path, report: &CreationReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.headline(&format!("Archive created: {}", output.display()));
        let _ = self.term.write_line("");
        self.field("Format:", report.format);
        self.field("Files added:", Self::format_number(report.files_added));
        self.field("Directories:", Self::format_number(report.directories_added));
        self.field("Content size:", Self::format_size(report.bytes_read));
        self.field("Archive size:", Self::format_size(report.archive_size));

        if report.entries_excluded > 0 {
            self.field("Excluded:", report.entries_excluded);
        }
        if report.entries_skipped > 0 {
            self.field("Skipped:", report.entries_skipped);
        }
        if self.verbose {
            self.field("Ratio:", format!("{:.2}", report.compression_ratio()));
            self.field("Duration:", format!("{:?}", report.duration));
        }

        if !report.warnings.is_empty() {
            let _ = self.term.write_line("");
            if self.use_colors {
                let _ = self
                    .term
                    .write_line(&format!("{}", style("Warnings:").yellow().bold()));
            } else {
                let _ = self.term.write_line("Warnings:");
            }
            for warning in &report.warnings {
                let _ = self.term.write_line(&format!("  - {warning}"));
            }
        }

        Ok(())
    }

    fn format_unpack_result(&self, dest: &Path, report: &ExtractionReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.headline(&format!("Unpacked into {}", dest.display()));
        self.field("Files extracted:", Self::format_number(report.files_extracted));
        self.field("Directories:", Self::format_number(report.directories_created));
        self.field("Total size:", Self::format_size(report.bytes_written));

        if self.verbose {
            self.field("Skipped:", report.entries_skipped);
            self.field("Duration:", format!("{:?}", report.duration));
        }

        Ok(())
    }

    fn format_metadata(&self, archive: &Path, metadata: &PackageMetadata) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let _ = self.term.write_line(&format!("{}", archive.display()));
        if let Some(package) = &metadata.package {
            self.field("Package:", format!("{} {}", package.name, package.version));
            if !package.description.is_empty() {
                self.field("Description:", &package.description);
            }
            if !package.dependencies.is_empty() {
                self.field("Dependencies:", package.dependencies.len());
            }
        }
        if !metadata.compression_type.is_empty() {
            self.field("Compression:", &metadata.compression_type);
        }
        self.field("Created by:", format!("{} {}", metadata.created_by, metadata.version));
        if self.verbose {
            self.field("Created at:", metadata.created_at.to_rfc3339());
        }

        Ok(())
    }

    fn format_detection(
        &self,
        archive: &Path,
        format: ArchiveFormat,
        detection: Detection,
    ) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let _ = self.term.write_line(&format!(
            "{}: {format} (by {})",
            archive.display(),
            detection_label(detection)
        ));
        Ok(())
    }

    fn format_error(&self, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        let term = Term::stderr();
        if console::colors_enabled_stderr() {
            let _ = term.write_line(&format!(
                "{} {error:?}",
                style("ERROR:").for_stderr().red().bold()
            ));
        } else {
            let _ = term.write_line(&format!("ERROR: {error:?}"));
        }
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = self.term.write_line(&format!("WARNING: {message}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(HumanFormatter::format_size(0), "0 B");
        assert_eq!(HumanFormatter::format_size(1023), "1023 B");
        assert_eq!(HumanFormatter::format_size(1536), "1.5 KB");
        assert_eq!(HumanFormatter::format_size(2 * 1024 * 1024), "2.0 MB");
        assert_eq!(HumanFormatter::format_size(1536 * 1024 * 1024), "1.5 GB");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(HumanFormatter::format_number(0), "0");
        assert_eq!(HumanFormatter::format_number(999), "999");
        assert_eq!(HumanFormatter::format_number(1000), "1,000");
        assert_eq!(HumanFormatter::format_number(1_234_567), "1,234,567");
    }
}

//! Detect command implementation.

use crate::cli::DetectArgs;
use crate::output::OutputFormatter;
use anyhow::Result;
use criage_archive::formats::detect_format_with_source;

pub fn execute(args: &DetectArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let (format, detection) = detect_format_with_source(&args.archive);
    formatter.format_detection(&args.archive, format, detection)
}

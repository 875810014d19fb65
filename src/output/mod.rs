//! User-facing output for the command-line tool.
//!
//! Diagnostics go through `tracing`; this module prints the status lines and
//! reports a person running `pdfmerge` expects to see.

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};

use crate::config::Config;
use crate::io::WriteStatistics;
use crate::merge::MergeStatistics;
use crate::utils::format_file_size;
use crate::validation::ValidationSummary;

/// Create an output formatter from configuration.
pub fn create_formatter(config: &Config) -> OutputFormatter {
    OutputFormatter::from_config(config)
}

/// Display the dry-run report.
pub fn display_validation_summary(formatter: &OutputFormatter, summary: &ValidationSummary) {
    formatter.section("Inputs");
    for (index, result) in summary.results.iter().enumerate() {
        let dimensions = result
            .page_dimensions
            .map(|(w, h)| format!(", {w:.0}x{h:.0} pt"))
            .unwrap_or_default();
        formatter.list_item(
            index + 1,
            &format!(
                "{} ({} page(s), PDF {}, {}{dimensions})",
                result.path.display(),
                result.page_count,
                result.version,
                format_file_size(result.file_size),
            ),
        );
        formatter.detail("Objects", &result.object_count.to_string());
    }

    formatter.blank_line();
    formatter.info(&format!(
        "Validated {} file(s): {} pages, {}",
        summary.files_validated,
        summary.total_pages,
        summary.format_total_size()
    ));
    if let Some(output) = &summary.output {
        formatter.info(&format!("Output would be: {}", output.display()));
    }
}

/// Display merge and write statistics after a successful run.
pub fn display_merge_statistics(
    formatter: &OutputFormatter,
    merge: &MergeStatistics,
    write: &WriteStatistics,
) {
    formatter.success(&format!(
        "Merged {} file(s), {} page(s) into {} ({})",
        merge.files_merged,
        merge.total_pages,
        write.output_path.display(),
        write.format_file_size()
    ));

    formatter.detail("Input size", &merge.format_input_size());
    formatter.detail("Objects copied", &merge.objects_copied.to_string());
    formatter.detail("Compression", &format!("{:?}", merge.compression));
    formatter.detail(
        "Parse time",
        &format!("{:.2}s", merge.parse_time.as_secs_f64()),
    );
    formatter.detail(
        "Copy time",
        &format!("{:.2}s", merge.copy_time.as_secs_f64()),
    );
    formatter.detail(
        "Write time",
        &format!("{:.2}s", write.write_time.as_secs_f64()),
    );
}

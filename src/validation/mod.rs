//! Dry-run inspection of inputs and output.
//!
//! Validation runs the same parser the merge uses, so a file that passes
//! here will not be rejected later for being unreadable. It performs:
//! - File existence and accessibility checks
//! - PDF header, structure and encryption checks
//! - Page count and first page size extraction
//! - Output path checks against the overwrite mode
//!
//! # Examples
//!
//! ```no_run
//! use pdfmerge::validation::Validator;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let validator = Validator::new();
//! let result = validator.validate_file(0, &PathBuf::from("test.pdf")).await?;
//! println!("PDF has {} pages", result.page_count);
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::OverwriteMode;
use crate::error::{Error, InputLabel, MergeError, Result};
use crate::io::{PdfReader, PdfWriter};
use crate::merge::SourceDocument;
use crate::utils::{display_name, format_file_size};

/// Result of validating a single PDF file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// Path to the validated file.
    pub path: PathBuf,

    /// Number of pages in the PDF.
    pub page_count: usize,

    /// PDF version from the header, e.g. `"1.7"`.
    pub version: String,

    /// Size of the file in bytes.
    pub file_size: u64,

    /// Number of indirect objects in the PDF.
    pub object_count: usize,

    /// First page dimensions (width, height) in points, if available.
    pub page_dimensions: Option<(f32, f32)>,
}

impl ValidationResult {
    /// Describe a parsed source document.
    pub fn from_source(path: PathBuf, file_size: u64, source: &SourceDocument) -> Self {
        let page_dimensions = source
            .media_box(0)
            .map(|[x1, y1, x2, y2]| ((x2 - x1).abs(), (y2 - y1).abs()));

        Self {
            path,
            page_count: source.page_count(),
            version: source.version().to_string(),
            file_size,
            object_count: source.object_count(),
            page_dimensions,
        }
    }
}

/// Summary of validation results for multiple files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    /// Individual validation results for each file.
    pub results: Vec<ValidationResult>,

    /// Total number of pages across all files.
    pub total_pages: usize,

    /// Total file size in bytes.
    pub total_size: u64,

    /// Number of files that passed validation.
    pub files_validated: usize,

    /// Output path the merge would write to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl ValidationSummary {
    /// Create a summary from validation results.
    pub fn from_results(results: Vec<ValidationResult>) -> Self {
        let total_pages = results.iter().map(|r| r.page_count).sum();
        let total_size = results.iter().map(|r| r.file_size).sum();
        let files_validated = results.len();

        Self {
            results,
            total_pages,
            total_size,
            files_validated,
            output: None,
        }
    }

    /// Format the total file size as a human-readable string.
    pub fn format_total_size(&self) -> String {
        format_file_size(self.total_size)
    }

    /// Render the summary as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::other(format!("Failed to encode report: {e}")))
    }
}

/// Validator for input files and the output path.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    reader: PdfReader,
    writer: PdfWriter,
}

impl Validator {
    /// Create a new validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the input at position `index` of the merge.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File does not exist or is not a regular file
    /// - File is not accessible
    /// - File is not a PDF, is encrypted, or its structure is corrupt
    pub async fn validate_file(&self, index: usize, path: &Path) -> Result<ValidationResult> {
        let loaded = self.reader.load(path).await?;
        let file_size = loaded.file_size();
        let bytes = loaded.bytes;

        let source = tokio::task::spawn_blocking(move || SourceDocument::parse(&bytes))
            .await
            .map_err(|e| Error::other(format!("Validation task failed: {e}")))?
            .map_err(|source| {
                Error::Merge(MergeError::Parse {
                    input: InputLabel::new(index, Some(display_name(path))),
                    source,
                })
            })?;

        Ok(ValidationResult::from_source(
            path.to_path_buf(),
            file_size,
            &source,
        ))
    }

    /// Validate every input in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// [`MergeError::NothingToMerge`] for an empty list, otherwise the error
    /// of the first file that fails.
    pub async fn validate_files(&self, paths: &[PathBuf]) -> Result<ValidationSummary> {
        if paths.is_empty() {
            return Err(MergeError::NothingToMerge.into());
        }

        let mut results = Vec::with_capacity(paths.len());
        for (index, path) in paths.iter().enumerate() {
            results.push(self.validate_file(index, path).await?);
        }

        Ok(ValidationSummary::from_results(results))
    }

    /// Validate the output path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Output file exists and `mode` is [`OverwriteMode::NoClobber`]
    /// - Output parent is not a writable directory
    pub async fn validate_output(&self, output: &Path, mode: OverwriteMode) -> Result<()> {
        if mode == OverwriteMode::NoClobber && self.writer.exists(output).await {
            return Err(Error::output_exists(output.to_path_buf()));
        }

        self.writer.can_write(output).await
    }
}

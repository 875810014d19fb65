//! Configuration module for pdfmerge.
//!
//! This module turns CLI arguments into a validated, normalized configuration
//! and derives the library-level [`MergeOptions`] that drive the merge engine.
//! It handles:
//! - Validation of argument combinations
//! - Application of defaults
//! - Output naming

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Compression level for the output PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// Streams are written exactly as they were copied.
    None,
    /// Flate-compress streams that carry no filter yet.
    #[default]
    Standard,
    /// Standard compression plus removal of objects not reachable from the trailer.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = Error;

    /// Parse compression level from "none", "standard" or "maximum".
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(Error::invalid_config(format!(
                "Invalid compression level: {s}. Must be one of: none, standard, maximum"
            ))),
        }
    }
}

/// Document information to set on the output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Document title.
    pub title: Option<String>,
    /// Document author.
    pub author: Option<String>,
    /// Document subject.
    pub subject: Option<String>,
    /// Document keywords (comma-separated).
    pub keywords: Option<String>,
}

impl Metadata {
    /// Check if any metadata fields are set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.subject.is_none()
            && self.keywords.is_none()
    }

    /// Create metadata from optional strings, trimming whitespace.
    pub fn new(
        title: Option<String>,
        author: Option<String>,
        subject: Option<String>,
        keywords: Option<String>,
    ) -> Self {
        let to_string_opt = |opt: Option<String>| {
            opt.filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().to_string())
        };

        Self {
            title: to_string_opt(title),
            author: to_string_opt(author),
            subject: to_string_opt(subject),
            keywords: to_string_opt(keywords),
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// Options consumed by the merge engine itself.
///
/// Unlike [`Config`], nothing here refers to the file system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOptions {
    /// Compression applied when serializing the output.
    pub compression: CompressionLevel,
    /// Document information written to the output.
    pub metadata: Metadata,
    /// Maximum number of inputs parsed concurrently.
    pub jobs: usize,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            compression: CompressionLevel::Standard,
            metadata: Metadata::default(),
            jobs: 1,
        }
    }
}

/// Complete configuration for a merge run of the command-line tool.
#[derive(Debug, Clone)]
pub struct Config {
    /// Input PDF file paths (in merge order).
    pub inputs: Vec<PathBuf>,

    /// Output PDF file path. `None` means "derive a name from the inputs".
    pub output: Option<PathBuf>,

    /// Dry run mode - validate without creating output.
    pub dry_run: bool,

    /// Print the dry-run report as JSON.
    pub json: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Compression level for output.
    pub compression: CompressionLevel,

    /// Metadata to set on output document.
    pub metadata: Metadata,

    /// Number of parallel parse jobs (None = auto-detect).
    pub jobs: Option<usize>,

    /// Ask the naming assistant for an output name when none is given.
    pub suggest_name: bool,
}

impl Config {
    /// Returns a reference to inputs.
    pub fn inputs(&self) -> &[PathBuf] {
        self.inputs.as_ref()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No input files are specified
    /// - Verbose and quiet modes are both enabled
    /// - Jobs count is zero
    /// - The output path is also an input
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(Error::invalid_config("No input files specified"));
        }

        if self.verbose && self.quiet {
            return Err(Error::invalid_config(
                "Cannot use both --verbose and --quiet",
            ));
        }

        if let Some(jobs) = self.jobs
            && jobs == 0
        {
            return Err(Error::invalid_config("Number of jobs must be at least 1"));
        }

        if let Some(output) = &self.output
            && self.inputs.iter().any(|input| input == output)
        {
            return Err(Error::invalid_config(format!(
                "Output file cannot be the same as an input file: {}",
                output.display()
            )));
        }

        Ok(())
    }

    /// Get the effective number of parallel parse jobs.
    ///
    /// Returns the configured job count, or the number of CPU cores if auto-detect.
    pub fn effective_jobs(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    /// Check if output should be displayed.
    ///
    /// Returns false if in quiet mode and not doing a dry run.
    pub fn should_print(&self) -> bool {
        !self.quiet || self.dry_run
    }

    /// Options for the merge engine.
    pub fn merge_options(&self) -> MergeOptions {
        MergeOptions {
            compression: self.compression,
            metadata: self.metadata.clone(),
            jobs: self.effective_jobs(),
        }
    }
}

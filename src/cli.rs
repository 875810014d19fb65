//! CLI argument parsing for pdfmerge.
//!
//! This module defines the command-line interface structure using `clap`.
//! It handles argument parsing, input resolution and conversion into a
//! validated [`Config`].

use clap::Parser;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use pdfmerge::config::{CompressionLevel, Config, Metadata, OverwriteMode};
use pdfmerge::error::{Error, MergeError, Result};
use pdfmerge::utils::{collect_paths_for_patterns, ensure_pdf_extension};

/// Merge PDF files into a single document.
///
/// pdfmerge copies every page of every input, in order, into one new PDF.
/// Page content, resources, annotations and inherited page attributes are
/// preserved; nothing is rasterized.
#[derive(Parser, Debug)]
#[command(name = "pdfmerge")]
#[command(version)]
#[command(about = "Merge PDF files into a single document", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Input PDF files or glob patterns, merged in the order given
    ///
    /// Examples:
    ///   pdfmerge a.pdf b.pdf -o out.pdf
    ///   pdfmerge 'chapter*.pdf' -o book.pdf
    #[arg(value_name = "FILE", required_unless_present = "input_list")]
    pub inputs: Vec<String>,

    /// Output PDF file path
    ///
    /// `.pdf` is appended when missing. Without this option the output is
    /// named `merged-document.pdf`, or after the inputs with --suggest-name.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Read additional input paths from a file (one path per line)
    ///
    /// Lines starting with '#' are comments. Use '-' to read from stdin.
    /// Paths from the list are merged after the direct inputs.
    #[arg(long, value_name = "FILE")]
    pub input_list: Option<PathBuf>,

    /// Dry run - validate inputs and report without creating output
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Print the dry-run report as JSON
    #[arg(long, requires = "dry_run")]
    pub json: bool,

    /// Verbose output - show statistics and per-file details
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Overwrite an existing output file without asking
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite an existing output file
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Compression level for the output PDF
    ///
    /// - none: streams are written as copied
    /// - standard: compress uncompressed streams (default)
    /// - maximum: standard plus removal of unreachable objects
    #[arg(short, long, value_name = "LEVEL", default_value = "standard")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,

    /// Set title metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Set author metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub author: Option<String>,

    /// Set subject metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub subject: Option<String>,

    /// Set keywords metadata for output PDF (comma-separated)
    #[arg(long, value_name = "TEXT")]
    pub keywords: Option<String>,

    /// Number of inputs parsed in parallel (default: number of CPU cores)
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Name the output after the inputs when --output is not given
    #[arg(long)]
    pub suggest_name: bool,
}

impl Cli {
    /// Convert CLI arguments and the resolved input paths into a validated
    /// [`Config`].
    ///
    /// # Errors
    ///
    /// Returns an error if the compression level is invalid or the resulting
    /// configuration fails [`Config::validate`].
    pub fn to_config(&self, inputs: Vec<PathBuf>) -> Result<Config> {
        let compression = CompressionLevel::from_str(&self.compression)?;

        let overwrite_mode = if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        };

        let metadata = Metadata::new(
            self.title.clone(),
            self.author.clone(),
            self.subject.clone(),
            self.keywords.clone(),
        );

        let output = self
            .output
            .as_ref()
            .map(|path| PathBuf::from(ensure_pdf_extension(&path.to_string_lossy())));

        let config = Config {
            inputs,
            output,
            dry_run: self.dry_run,
            json: self.json,
            verbose: self.verbose,
            quiet: self.quiet,
            overwrite_mode,
            compression,
            metadata,
            jobs: self.jobs,
            suggest_name: self.suggest_name,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate CLI arguments before touching the file system.
    ///
    /// # Errors
    ///
    /// Returns an error if no inputs or input list are given, the job count
    /// is zero or the compression level is unknown.
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() && self.input_list.is_none() {
            return Err(Error::invalid_config("No input files specified"));
        }

        if let Some(jobs) = self.jobs
            && jobs == 0
        {
            return Err(Error::invalid_config("Number of jobs must be at least 1"));
        }

        if let Some(output) = &self.output
            && output.as_os_str().is_empty()
        {
            return Err(Error::invalid_config("Output path cannot be empty"));
        }

        CompressionLevel::from_str(&self.compression)?;

        Ok(())
    }

    /// Resolve every input path in merge order.
    ///
    /// Glob patterns are expanded first, then the entries of `--input-list`
    /// are appended.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern is invalid, the input list cannot be
    /// read, or nothing is left to merge.
    pub async fn resolve_inputs(&self) -> Result<Vec<PathBuf>> {
        let mut all_inputs = collect_paths_for_patterns(&self.inputs)?;

        if let Some(input_list) = &self.input_list {
            all_inputs.extend(read_input_list(input_list).await?);
        }

        if all_inputs.is_empty() {
            return Err(MergeError::NothingToMerge.into());
        }

        Ok(all_inputs)
    }
}

/// Read input paths from a list file, or from stdin when `path` is `-`.
async fn read_input_list(path: &Path) -> Result<Vec<PathBuf>> {
    if path.as_os_str() == "-" {
        return parse_input_list(BufReader::new(tokio::io::stdin()), path).await;
    }

    let file = tokio::fs::File::open(path)
        .await
        .map_err(|source| Error::FailedToReadInputList {
            path: path.to_path_buf(),
            source,
        })?;

    parse_input_list(BufReader::new(file), path).await
}

/// Parse one path per line. Blank lines and `#` comments are skipped.
async fn parse_input_list<R>(reader: R, path: &Path) -> Result<Vec<PathBuf>>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut paths = Vec::new();
    let mut line_number = 0;

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|source| Error::FailedToReadInputList {
            path: path.to_path_buf(),
            source,
        })?
    {
        line_number += 1;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.contains('\0') {
            return Err(Error::InvalidInputList {
                path: path.to_path_buf(),
                line_number,
                details: "Path contains a NUL byte".to_string(),
            });
        }

        paths.push(PathBuf::from(line));
    }

    Ok(paths)
}

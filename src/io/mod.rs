//! File I/O around the merge engine.
//!
//! This module handles all file I/O operations including:
//! - Reading input files into memory
//! - Writing the merged PDF to disk atomically
//! - Parallel input loading that preserves order
//!
//! # Examples
//!
//! ```no_run
//! use pdfmerge::io::{PdfReader, PdfWriter};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let input = reader.load(&PathBuf::from("input.pdf")).await?;
//!
//! let writer = PdfWriter::new();
//! writer.save(input.bytes, &PathBuf::from("copy.pdf")).await?;
//! # Ok(())
//! # }
//! ```

pub mod reader;
pub mod writer;

pub use reader::{LoadResult, LoadStatistics, LoadedInput, PdfReader};
pub use writer::{PdfWriter, WriteOptions, WriteStatistics};

use crate::error::Result;
use crate::merge::SourceInput;
use std::path::PathBuf;
use tracing::debug;

/// Read every path, in order, into merge inputs.
///
/// Fails on the first path that cannot be read.
pub async fn load_inputs(paths: &[PathBuf], jobs: usize) -> Result<Vec<SourceInput>> {
    let reader = PdfReader::new();
    let (results, stats) = reader.load_all(paths, jobs).await;
    debug!(
        loaded = stats.success_count,
        failed = stats.failure_count,
        size = %stats.format_total_size(),
        elapsed = ?stats.total_time,
        "read input files"
    );

    results
        .into_iter()
        .map(|result| result.map(LoadedInput::into_source_input))
        .collect()
}

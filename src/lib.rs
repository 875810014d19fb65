//! pdfmerge - Merge PDF documents into a single file, entirely in memory.
//!
//! The library is built around a merge engine that takes raw PDF byte
//! buffers and returns one PDF byte buffer. Pages keep their content,
//! resources, annotations and inherited attributes; objects shared between
//! pages of one input are copied once. Around the engine sit the pieces the
//! `pdfmerge` command-line tool needs:
//!
//! - Parallel input parsing with caller-order output
//! - File loading and atomic output writing
//! - Dry-run validation with a JSON report
//! - Output file name suggestions
//!
//! # Examples
//!
//! ## Merging buffers
//!
//! ```no_run
//! use pdfmerge::config::MergeOptions;
//! use pdfmerge::merge_bytes;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let a = std::fs::read("a.pdf")?;
//! let b = std::fs::read("b.pdf")?;
//!
//! let merged = merge_bytes(&[a, b], &MergeOptions::default())?;
//! std::fs::write("merged.pdf", merged)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Using Individual Components
//!
//! ```no_run
//! use pdfmerge::config::MergeOptions;
//! use pdfmerge::io::{PdfWriter, load_inputs};
//! use pdfmerge::merge::Merger;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let paths = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
//! let inputs = load_inputs(&paths, 2).await?;
//!
//! let result = Merger::new(MergeOptions::default()).merge(inputs).await?;
//! println!("Created {} page document", result.statistics.total_pages);
//!
//! PdfWriter::new()
//!     .save(result.bytes, &PathBuf::from("merged.pdf"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod io;
pub mod merge;
pub mod naming;
pub mod output;
pub mod utils;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::{Config, MergeOptions};
pub use error::{Error, MergeError, Result};
pub use merge::{MergeResult, Merger, SourceInput, merge_bytes};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

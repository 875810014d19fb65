//! The in-memory merge engine.
//!
//! This module turns an ordered list of PDF byte buffers into one PDF:
//! - [`parser`]: buffer to [`SourceDocument`] (header, xref, page tree)
//! - [`copier`]: deep copy of pages into a [`TargetDocument`]
//! - [`serializer`]: page tree, catalog, Info and xref for the target
//! - [`merger`]: the pipeline, async ([`Merger`]) and sync ([`merge_bytes`])
//!
//! Nothing here touches the file system.
//!
//! # Examples
//!
//! ```no_run
//! use pdfmerge::config::MergeOptions;
//! use pdfmerge::merge::merge_bytes;
//!
//! # fn example(a: Vec<u8>, b: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let merged = merge_bytes(&[a, b], &MergeOptions::default())?;
//! std::fs::write("merged.pdf", merged)?;
//! # Ok(())
//! # }
//! ```

pub mod copier;
pub mod merger;
pub mod parser;
pub mod serializer;
pub mod target;

pub use copier::{CopySummary, DEFAULT_MEDIA_BOX, PageCopier};
pub use merger::{MergeResult, MergeStatistics, Merger, SourceInput, merge_bytes};
pub use parser::{INHERITABLE_KEYS, SourceDocument, SourcePage, has_pdf_header, parse_document};
pub use serializer::{PRODUCER, SerializeOptions, read_metadata, serialize};
pub use target::TargetDocument;

//! Merge orchestration.
//!
//! Ties the pipeline together: parse every input, copy the pages of each
//! source into one target in caller order, serialize once. The first failing
//! input aborts the whole merge; there is no partial output.

use futures::stream::{self, StreamExt};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::{CompressionLevel, MergeOptions};
use crate::error::{InputLabel, MergeError, ParseError};
use crate::merge::parser::{SourceDocument, parse_document};
use crate::merge::serializer::{SerializeOptions, serialize};
use crate::merge::target::TargetDocument;
use crate::utils::format_file_size;

/// One raw input buffer, optionally named for error reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInput {
    /// Display name, usually the file name.
    pub name: Option<String>,
    /// Raw PDF bytes.
    pub bytes: Vec<u8>,
}

impl SourceInput {
    /// An anonymous input.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { name: None, bytes }
    }

    /// A named input.
    pub fn named(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: Some(name.into()),
            bytes,
        }
    }
}

impl From<Vec<u8>> for SourceInput {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

/// Statistics about a merge operation.
#[derive(Debug, Clone, Default)]
pub struct MergeStatistics {
    /// Number of inputs merged.
    pub files_merged: usize,

    /// Total number of pages in the merged document.
    pub total_pages: usize,

    /// Indirect objects copied into the output (pages included).
    pub objects_copied: usize,

    /// Total size of the inputs in bytes.
    pub input_size: u64,

    /// Size of the merged document in bytes.
    pub output_size: u64,

    /// Time spent parsing inputs.
    pub parse_time: Duration,

    /// Time spent copying pages and serializing.
    pub copy_time: Duration,

    /// Wall time of the whole merge.
    pub total_time: Duration,

    /// Compression applied to the output.
    pub compression: CompressionLevel,
}

impl MergeStatistics {
    /// Format input size as human-readable string.
    pub fn format_input_size(&self) -> String {
        format_file_size(self.input_size)
    }

    /// Format output size as human-readable string.
    pub fn format_output_size(&self) -> String {
        format_file_size(self.output_size)
    }
}

/// Result of a merge operation.
#[derive(Debug, Clone)]
pub struct MergeResult {
    /// The merged PDF.
    pub bytes: Vec<u8>,

    /// Statistics about the merge.
    pub statistics: MergeStatistics,
}

/// PDF merger that combines multiple documents.
///
/// A `Merger` holds only its options. Every call builds its own target
/// document, so one merger can serve overlapping calls.
#[derive(Debug, Clone, Default)]
pub struct Merger {
    options: MergeOptions,
}

impl Merger {
    /// Create a merger with the given options.
    pub fn new(options: MergeOptions) -> Self {
        Self { options }
    }

    /// Options this merger applies.
    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Merge `inputs`, in order, into one PDF.
    ///
    /// Inputs are parsed on the blocking thread pool, up to
    /// [`MergeOptions::jobs`] at a time. Pages are always copied in input
    /// order.
    ///
    /// # Errors
    ///
    /// - [`MergeError::NothingToMerge`] when `inputs` is empty
    /// - [`MergeError::Parse`] or [`MergeError::Copy`] for the first input
    ///   that cannot be used
    /// - [`MergeError::Serialization`] when the output cannot be written
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfmerge::merge::{Merger, SourceInput};
    /// # use pdfmerge::config::MergeOptions;
    /// # async fn example(a: Vec<u8>, b: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
    /// let merger = Merger::new(MergeOptions::default());
    /// let result = merger
    ///     .merge(vec![SourceInput::named("a.pdf", a), SourceInput::named("b.pdf", b)])
    ///     .await?;
    /// println!("Merged {} pages", result.statistics.total_pages);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn merge(&self, inputs: Vec<SourceInput>) -> Result<MergeResult, MergeError> {
        if inputs.is_empty() {
            return Err(MergeError::NothingToMerge);
        }

        let merge_start = Instant::now();
        let input_size = inputs.iter().map(|input| input.bytes.len() as u64).sum();
        let jobs = self.options.jobs.max(1);

        let parse_start = Instant::now();
        let parsed: Vec<(InputLabel, Result<SourceDocument, ParseError>)> =
            stream::iter(inputs.into_iter().enumerate())
                .map(|(index, input)| async move {
                    let label = InputLabel::new(index, input.name);
                    let bytes = input.bytes;
                    let result = tokio::task::spawn_blocking(move || parse_document(&bytes))
                        .await
                        .unwrap_or_else(|err| {
                            Err(ParseError::corrupt(format!("parser task failed: {err}")))
                        });
                    (label, result)
                })
                .buffered(jobs)
                .collect()
                .await;
        let parse_time = parse_start.elapsed();

        let mut sources = Vec::with_capacity(parsed.len());
        for (input, result) in parsed {
            match result {
                Ok(source) => sources.push((input, source)),
                Err(source) => {
                    warn!(input = %input, reason = %source.reason, "input rejected");
                    return Err(MergeError::Parse { input, source });
                }
            }
        }

        let mut result = assemble(sources, &self.options)?;
        result.statistics.input_size = input_size;
        result.statistics.parse_time = parse_time;
        result.statistics.total_time = merge_start.elapsed();

        info!(
            files = result.statistics.files_merged,
            pages = result.statistics.total_pages,
            output_bytes = result.statistics.output_size,
            "merge complete"
        );
        Ok(result)
    }
}

/// Merge raw buffers synchronously, without an async runtime.
///
/// Same semantics as [`Merger::merge`], with inputs parsed one after another.
pub fn merge_bytes<B: AsRef<[u8]>>(
    inputs: &[B],
    options: &MergeOptions,
) -> Result<Vec<u8>, MergeError> {
    if inputs.is_empty() {
        return Err(MergeError::NothingToMerge);
    }

    let mut sources = Vec::with_capacity(inputs.len());
    for (index, bytes) in inputs.iter().enumerate() {
        let input = InputLabel::new(index, None);
        match parse_document(bytes.as_ref()) {
            Ok(source) => sources.push((input, source)),
            Err(source) => return Err(MergeError::Parse { input, source }),
        }
    }

    Ok(assemble(sources, options)?.bytes)
}

/// Copy every source into a fresh target and serialize it.
fn assemble(
    sources: Vec<(InputLabel, SourceDocument)>,
    options: &MergeOptions,
) -> Result<MergeResult, MergeError> {
    let copy_start = Instant::now();
    let mut target = TargetDocument::new();
    let mut objects_copied = 0;

    for (input, source) in &sources {
        let summary = target
            .append_document(source)
            .map_err(|source| MergeError::Copy {
                input: input.clone(),
                source,
            })?;
        debug!(
            input = %input,
            pages = summary.pages_copied,
            objects = summary.objects_copied,
            "appended source"
        );
        objects_copied += summary.pages_copied + summary.objects_copied;
    }
    let total_pages = target.page_count();

    let bytes = serialize(
        target,
        &SerializeOptions {
            compression: options.compression,
            metadata: options.metadata.clone(),
        },
    )?;

    let statistics = MergeStatistics {
        files_merged: sources.len(),
        total_pages,
        objects_copied,
        output_size: bytes.len() as u64,
        copy_time: copy_start.elapsed(),
        compression: options.compression,
        ..MergeStatistics::default()
    };

    Ok(MergeResult { bytes, statistics })
}

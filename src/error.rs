//! Error types for pdfmerge.
//!
//! Two layers live here:
//!
//! - **Merge errors** ([`MergeError`] and the per-stage [`ParseError`],
//!   [`CopyError`] and [`SerializationError`]) describe why the in-memory merge
//!   engine refused to produce a document. A merge either returns every page of
//!   every input or exactly one of these.
//! - **Application errors** ([`Error`]) wrap merge errors together with the
//!   file-system, configuration and output failures of the surrounding tool,
//!   and map each of them to a process exit code.

use lopdf::ObjectId;
use serde::Serialize;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Result type alias for pdfmerge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Why an input buffer could not be read as a PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParseReason {
    /// The buffer carries no PDF signature.
    NotAPdf,
    /// Cross-reference table, trailer, catalog or page tree cannot be resolved.
    CorruptStructure,
    /// The document is encrypted.
    Encrypted,
}

impl ParseReason {
    /// Stable machine-readable name of the reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotAPdf => "not-a-pdf",
            Self::CorruptStructure => "corrupt-structure",
            Self::Encrypted => "encrypted",
        }
    }
}

impl fmt::Display for ParseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An input buffer is not a readable PDF.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}: {details}")]
pub struct ParseError {
    /// Classification of the failure.
    pub reason: ParseReason,
    /// Human-readable detail.
    pub details: String,
}

impl ParseError {
    /// The buffer does not start with a PDF header.
    pub fn not_a_pdf(details: impl Into<String>) -> Self {
        Self {
            reason: ParseReason::NotAPdf,
            details: details.into(),
        }
    }

    /// The document structure cannot be resolved.
    pub fn corrupt(details: impl Into<String>) -> Self {
        Self {
            reason: ParseReason::CorruptStructure,
            details: details.into(),
        }
    }

    /// The document is encrypted.
    pub fn encrypted() -> Self {
        Self {
            reason: ParseReason::Encrypted,
            details: "encrypted documents are not supported, decrypt the file first".into(),
        }
    }
}

/// A page could not be transplanted into the target document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CopyError {
    /// An indirect reference inside the page's object closure is unresolvable.
    #[error("page {} references missing object {} {} R", .page + 1, .missing.0, .missing.1)]
    MissingObject {
        /// 0-based index of the page being copied.
        page: usize,
        /// The reference that could not be resolved in the source.
        missing: ObjectId,
    },

    /// The page object itself is not a dictionary.
    #[error("page {} ({} {} R) is not a dictionary", .page + 1, .id.0, .id.1)]
    InvalidPage {
        /// 0-based index of the page.
        page: usize,
        /// Object id of the page in the source.
        id: ObjectId,
    },

    /// The requested page does not exist in the source.
    #[error("page index {index} is out of range, the document has {count} page(s)")]
    PageOutOfRange {
        /// Requested 0-based index.
        index: usize,
        /// Number of pages in the source.
        count: usize,
    },
}

/// The assembled target could not be written out.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SerializationError {
    /// A page registered in the target is missing or not a dictionary.
    #[error("target page {} {} R is missing or not a dictionary", .id.0, .id.1)]
    InvalidPage {
        /// Object id in the target.
        id: ObjectId,
    },

    /// The PDF writer failed.
    #[error("failed to write PDF: {reason}")]
    Write {
        /// Underlying writer message.
        reason: String,
    },
}

/// Identifies one input of a merge by position and, if known, by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputLabel {
    /// 0-based position in the caller's input sequence.
    pub index: usize,
    /// Display name of the input (usually the file name).
    pub name: Option<String>,
}

impl InputLabel {
    /// Create a label for the input at `index`.
    pub fn new(index: usize, name: Option<String>) -> Self {
        Self { index, name }
    }
}

impl fmt::Display for InputLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index + 1)?;
        if let Some(name) = &self.name {
            write!(f, " ({name})")?;
        }
        Ok(())
    }
}

/// The single failure of a merge invocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    /// No inputs were supplied.
    #[error("nothing to merge: no input documents were provided")]
    NothingToMerge,

    /// One input could not be parsed.
    #[error("could not read input {input} as a PDF: {source}")]
    Parse {
        /// Which input failed.
        input: InputLabel,
        /// Parser failure.
        source: ParseError,
    },

    /// One page of an input could not be copied.
    #[error("could not copy pages of input {input}: {source}")]
    Copy {
        /// Which input failed.
        input: InputLabel,
        /// Copier failure.
        source: CopyError,
    },

    /// The merged document could not be serialized.
    #[error("could not produce the merged PDF: {0}")]
    Serialization(#[from] SerializationError),
}

impl MergeError {
    /// True when one of the inputs is at fault rather than the merge itself.
    pub fn is_input_failure(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::Copy { .. })
    }

    /// The failing input, when the error is tied to one.
    pub fn input(&self) -> Option<&InputLabel> {
        match self {
            Self::Parse { input, .. } | Self::Copy { input, .. } => Some(input),
            _ => None,
        }
    }

    /// Short sentence suitable for end users.
    pub fn user_message(&self) -> String {
        match self {
            Self::NothingToMerge => "Nothing to merge: add at least one PDF file.".to_string(),
            Self::Parse { input, .. } | Self::Copy { input, .. } => {
                format!("Could not read one of your files as a PDF (input {input}).")
            }
            Self::Serialization(_) => "Could not produce the merged file.".to_string(),
        }
    }
}

/// Application-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input file was not found.
    #[error("File not found: {}", .path.display())]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Input file exists but cannot be read.
    #[error("Cannot access file: {}\n  Reason: {source}", .path.display())]
    FileNotAccessible {
        /// Path to the inaccessible file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Input path is not a regular file.
    #[error("Not a file: {}", .path.display())]
    NotAFile {
        /// Offending path.
        path: PathBuf,
    },

    /// Output exists and overwriting is not allowed.
    #[error(
        "Output file already exists: {}\n  Use --force to overwrite or choose a different output path",
        .path.display()
    )]
    OutputExists {
        /// Existing output path.
        path: PathBuf,
    },

    /// Output file could not be created.
    #[error("Failed to create output file: {}\n  Reason: {source}", .path.display())]
    FailedToCreateOutput {
        /// Output path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Output file could not be written.
    #[error("Failed to write to output file: {}\n  Reason: {source}", .path.display())]
    FailedToWrite {
        /// Output path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Input list file could not be read.
    #[error("Failed to read input list file: {}\n  Reason: {source}", .path.display())]
    FailedToReadInputList {
        /// Input list path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Input list file contains an invalid entry.
    #[error(
        "Invalid entry in input list file: {} at line {line_number}\n  Details: {details}",
        .path.display()
    )]
    InvalidInputList {
        /// Input list path.
        path: PathBuf,
        /// 1-based line number.
        line_number: usize,
        /// What is wrong.
        details: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        message: String,
    },

    /// The merge engine failed.
    #[error(transparent)]
    Merge(#[from] MergeError),

    /// User cancelled the operation.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl Error {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a NotAFile error.
    pub fn not_a_file(path: PathBuf) -> Self {
        Self::NotAFile { path }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. } => 2,
            Self::FileNotAccessible { .. } => 2,
            Self::NotAFile { .. } => 2,
            Self::FailedToReadInputList { .. } => 2,
            Self::InvalidInputList { .. } => 1,
            Self::InvalidConfig { .. } => 1,
            Self::OutputExists { .. } => 4,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::Io { .. } => 5,
            Self::Merge(MergeError::NothingToMerge) => 1,
            Self::Merge(err) if err.is_input_failure() => 3,
            Self::Merge(_) => 6,
            Self::Cancelled => 130,
            Self::Other { .. } => 1,
        }
    }
}

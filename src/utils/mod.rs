//! Utilities for path collection, output naming and size formatting.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Output file name used when neither the user nor the naming assistant
/// provides one.
pub const DEFAULT_OUTPUT_NAME: &str = "merged-document.pdf";

/// Expand multiple glob patterns into filesystem paths.
///
/// Accepts anything iterable with items that convert to `&str`, e.g.:
/// `&[&str]`, `Vec<String>`, or `Vec<&str>`.
///
/// Patterns are expanded in argument order, and the matches of one pattern
/// are sorted. A pattern that matches nothing is kept verbatim so the reader
/// can report it as a missing file.
///
/// Errors:
/// - Propagates `glob` parse errors.
/// - Propagates filesystem errors from glob iterator.
pub fn collect_paths_for_patterns<T>(patterns: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved_paths = Vec::new();

    for pattern in patterns.into_iter() {
        let pattern = pattern.as_ref();
        let paths = collect_paths_for_pattern(pattern)?;
        if paths.is_empty() {
            resolved_paths.push(PathBuf::from(pattern));
        } else {
            resolved_paths.extend(paths);
        }
    }

    Ok(resolved_paths)
}

/// Expand a single glob pattern into filesystem paths.
///
/// Pattern examples:
/// - `"**/*.pdf"`
/// - `"./docs/*.pdf"`
fn collect_paths_for_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut resolved_paths = Vec::new();

    let paths = glob::glob(pattern)
        .map_err(|err| Error::other(format!("Invalid pattern '{pattern}': {err}")))?;

    for entry in paths {
        let path = entry.map_err(|err| Error::other(err.to_string()))?;
        resolved_paths.push(path);
    }

    Ok(resolved_paths)
}

/// Append `.pdf` unless the name already ends with it (any case).
pub fn ensure_pdf_extension(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.to_lowercase().ends_with(".pdf") {
        trimmed.to_string()
    } else {
        format!("{trimmed}.pdf")
    }
}

/// The file name of `path`, for display and naming.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Format file size as human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}

//! Writing the merged document to disk.
//!
//! This module provides safe PDF writing with:
//! - Atomic writes (write to temp file, then rename)
//! - Parent directory creation
//! - Overwrite pre-flight checks
//! - Write statistics
//!
//! # Examples
//!
//! ```no_run
//! use pdfmerge::io::writer::PdfWriter;
//! use std::path::Path;
//!
//! # async fn example(bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = PdfWriter::new();
//! writer.save(bytes, Path::new("output.pdf")).await?;
//! # Ok(())
//! # }
//! ```

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;
use tracing::debug;

use crate::error::{Error, Result};
use crate::utils::format_file_size;

/// Options for writing PDF files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Use atomic writes (write to temp file, then rename).
    pub atomic: bool,

    /// Create missing parent directories.
    pub create_dirs: bool,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            create_dirs: true,
            buffer_size: 8192,
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// Writes serialized PDFs to disk.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    options: WriteOptions,
}

impl PdfWriter {
    /// Create a new PDF writer with default options.
    pub fn new() -> Self {
        Self {
            options: WriteOptions::default(),
        }
    }

    /// Create a writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Create a writer without atomic writes.
    pub fn non_atomic() -> Self {
        Self {
            options: WriteOptions {
                atomic: false,
                ..Default::default()
            },
        }
    }

    /// Write `bytes` to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The parent directory cannot be created
    /// - Insufficient permissions
    /// - Disk full
    /// - Write operation fails
    pub async fn save(&self, bytes: Vec<u8>, path: &Path) -> Result<()> {
        self.save_with_stats(bytes, path).await?;
        Ok(())
    }

    /// Write `bytes` to `path` and return statistics about the operation.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfmerge::io::writer::PdfWriter;
    /// # use std::path::Path;
    /// # async fn example(bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
    /// let writer = PdfWriter::new();
    /// let stats = writer.save_with_stats(bytes, Path::new("output.pdf")).await?;
    /// println!("Wrote {} in {:?}", stats.format_file_size(), stats.write_time);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn save_with_stats(&self, bytes: Vec<u8>, path: &Path) -> Result<WriteStatistics> {
        let path_buf = path.to_path_buf();
        let options = self.options.clone();

        let stats = task::spawn_blocking(move || {
            let start = Instant::now();

            if options.create_dirs
                && let Some(parent) = path_buf.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent).map_err(|e| Error::FailedToCreateOutput {
                    path: path_buf.clone(),
                    source: e,
                })?;
            }

            let write_path = if options.atomic {
                temp_path(&path_buf)
            } else {
                path_buf.clone()
            };

            let file = std::fs::File::create(&write_path).map_err(|e| {
                Error::FailedToCreateOutput {
                    path: write_path.clone(),
                    source: e,
                }
            })?;

            let mut writer = std::io::BufWriter::with_capacity(options.buffer_size, file);
            writer
                .write_all(&bytes)
                .and_then(|_| writer.flush())
                .map_err(|e| Error::FailedToWrite {
                    path: write_path.clone(),
                    source: e,
                })?;
            drop(writer);

            if options.atomic {
                std::fs::rename(&write_path, &path_buf).map_err(|e| {
                    let _ = std::fs::remove_file(&write_path);
                    Error::FailedToWrite {
                        path: path_buf.clone(),
                        source: e,
                    }
                })?;
            }

            Ok::<_, Error>(WriteStatistics {
                write_time: start.elapsed(),
                file_size: bytes.len() as u64,
                output_path: path_buf,
            })
        })
        .await
        .map_err(|e| Error::other(format!("Write task failed: {e}")))??;

        debug!(
            path = %stats.output_path.display(),
            bytes = stats.file_size,
            "wrote output file"
        );
        Ok(stats)
    }

    /// Check if a file can be written to the given path.
    ///
    /// Performs pre-flight checks without actually writing.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Parent directory doesn't exist and will not be created
    /// - Parent exists but is not a writable directory
    pub async fn can_write(&self, path: &Path) -> Result<()> {
        let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(());
        };

        let metadata = match tokio::fs::metadata(parent).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if self.options.create_dirs {
                    return Ok(());
                }
                return Err(Error::invalid_config(format!(
                    "Output directory does not exist: {}",
                    parent.display()
                )));
            }
            Err(e) => {
                return Err(Error::FileNotAccessible {
                    path: parent.to_path_buf(),
                    source: e,
                });
            }
        };

        if !metadata.is_dir() {
            return Err(Error::invalid_config(format!(
                "Output parent is not a directory: {}",
                parent.display()
            )));
        }

        if metadata.permissions().readonly() {
            return Err(Error::invalid_config(format!(
                "Output directory is not writable: {}",
                parent.display()
            )));
        }

        Ok(())
    }

    /// Check if output file exists.
    pub async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path).await.is_ok()
    }
}

/// Sibling path used for atomic writes, e.g. `out.pdf` -> `out.pdf.tmp`.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("output"));
    name.push(".tmp");
    path.with_file_name(name)
}

//! Reading input files into memory.
//!
//! The merge engine works on byte buffers; this module gets those buffers off
//! the disk with:
//! - Existence and is-file checks with precise errors
//! - Sequential and bounded-parallel loading that preserves input order
//! - Load statistics
//!
//! # Examples
//!
//! ```no_run
//! use pdfmerge::io::reader::PdfReader;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let paths = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
//! let (results, stats) = reader.load_all(&paths, 4).await;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use tracing::debug;

use crate::error::{Error, Result};
use crate::merge::SourceInput;
use crate::utils::{display_name, format_file_size};

/// An input file read into memory.
#[derive(Debug, Clone)]
pub struct LoadedInput {
    /// Path the bytes were read from.
    pub path: PathBuf,

    /// File contents.
    pub bytes: Vec<u8>,

    /// Time taken to read the file.
    pub load_time: Duration,
}

impl LoadedInput {
    /// File size in bytes.
    pub fn file_size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Hand the bytes to the merge engine, named after the file.
    pub fn into_source_input(self) -> SourceInput {
        SourceInput::named(display_name(&self.path), self.bytes)
    }
}

/// Result of a load operation (success or failure).
pub type LoadResult = Result<LoadedInput>;

/// Statistics for a batch load operation.
#[derive(Debug, Clone)]
pub struct LoadStatistics {
    /// Number of files successfully read.
    pub success_count: usize,

    /// Number of files that failed to read.
    pub failure_count: usize,

    /// Total time taken for all loads.
    pub total_time: Duration,

    /// Total size of successfully read files.
    pub total_size: u64,
}

impl LoadStatistics {
    /// Create statistics from load results.
    fn from_results(results: &[LoadResult], total_time: Duration) -> Self {
        let mut success_count = 0;
        let mut failure_count = 0;
        let mut total_size = 0;

        for result in results {
            match result {
                Ok(loaded) => {
                    success_count += 1;
                    total_size += loaded.file_size();
                }
                Err(_) => failure_count += 1,
            }
        }

        Self {
            success_count,
            failure_count,
            total_time,
            total_size,
        }
    }

    /// Format total size as human-readable string.
    pub fn format_total_size(&self) -> String {
        format_file_size(self.total_size)
    }
}

/// Reads input files from disk.
#[derive(Debug, Clone, Default)]
pub struct PdfReader;

impl PdfReader {
    /// Create a new reader.
    pub fn new() -> Self {
        Self
    }

    /// Check that `path` exists and is a regular file.
    ///
    /// # Errors
    ///
    /// [`Error::FileNotFound`], [`Error::NotAFile`] or
    /// [`Error::FileNotAccessible`].
    pub async fn check_path(path: &Path) -> Result<()> {
        let metadata = tokio::fs::metadata(path).await.map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                Error::file_not_found(path.to_path_buf())
            } else {
                Error::FileNotAccessible {
                    path: path.to_path_buf(),
                    source: err,
                }
            }
        })?;

        if !metadata.is_file() {
            return Err(Error::not_a_file(path.to_path_buf()));
        }
        Ok(())
    }

    /// Read a single file.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfmerge::io::reader::PdfReader;
    /// # use std::path::Path;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let reader = PdfReader::new();
    /// let loaded = reader.load(Path::new("document.pdf")).await?;
    /// println!("Read {} bytes in {:?}", loaded.file_size(), loaded.load_time);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn load(&self, path: &Path) -> Result<LoadedInput> {
        let start = Instant::now();
        Self::check_path(path).await?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|err| Error::FileNotAccessible {
                path: path.to_path_buf(),
                source: err,
            })?;

        let load_time = start.elapsed();
        debug!(path = %path.display(), bytes = bytes.len(), "read input file");

        Ok(LoadedInput {
            path: path.to_path_buf(),
            bytes,
            load_time,
        })
    }

    /// Read files one at a time in the order provided.
    pub async fn load_sequential(&self, paths: &[PathBuf]) -> Vec<LoadResult> {
        let mut results = Vec::with_capacity(paths.len());

        for path in paths {
            results.push(self.load(path).await);
        }

        results
    }

    /// Read files concurrently with at most `workers` reads in flight.
    ///
    /// Results come back in the same order as `paths`.
    pub async fn load_parallel(&self, paths: &[PathBuf], workers: usize) -> Vec<LoadResult> {
        let workers = workers.max(1);

        let tasks = paths.iter().map(|path| {
            let reader = self.clone();
            let path = path.clone();
            async move { reader.load(&path).await }
        });

        stream::iter(tasks).buffered(workers).collect().await
    }

    /// Read all files, in parallel for larger batches.
    ///
    /// Returns per-file results in input order together with aggregate
    /// statistics.
    pub async fn load_all(
        &self,
        paths: &[PathBuf],
        max_workers: usize,
    ) -> (Vec<LoadResult>, LoadStatistics) {
        let start = Instant::now();

        let results = if paths.len() <= 3 {
            self.load_sequential(paths).await
        } else {
            self.load_parallel(paths, max_workers).await
        };

        let stats = LoadStatistics::from_results(&results, start.elapsed());
        (results, stats)
    }
}

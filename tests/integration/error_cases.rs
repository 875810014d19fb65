//! Integration tests for error handling and edge cases.

use pdfmerge::config::{MergeOptions, OverwriteMode};
use pdfmerge::error::{Error, MergeError, ParseReason};
use pdfmerge::io::load_inputs;
use pdfmerge::merge::{Merger, merge_bytes};
use pdfmerge::validation::Validator;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::common::{sample_pdf, write_fixture};

#[tokio::test]
async fn test_error_nonexistent_input() {
    let err = load_inputs(&[PathBuf::from("/nonexistent/file.pdf")], 1)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::FileNotFound { .. }));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_error_nothing_to_merge() {
    let err = Merger::default().merge(Vec::new()).await.unwrap_err();
    assert_eq!(err, MergeError::NothingToMerge);
    assert!(!err.is_input_failure());

    let err: Error = err.into();
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn test_error_not_a_pdf_names_the_input() {
    let temp_dir = TempDir::new().unwrap();
    let paths = vec![
        write_fixture(temp_dir.path(), "a.pdf", &sample_pdf("A", 1)),
        write_fixture(temp_dir.path(), "notes.txt", b"just some notes"),
        write_fixture(temp_dir.path(), "c.pdf", &sample_pdf("C", 1)),
    ];

    let inputs = load_inputs(&paths, 2).await.unwrap();
    let err = Merger::default().merge(inputs).await.unwrap_err();

    match &err {
        MergeError::Parse { input, source } => {
            assert_eq!(input.index, 1);
            assert_eq!(input.name.as_deref(), Some("notes.txt"));
            assert_eq!(source.reason, ParseReason::NotAPdf);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_input_failure());
    assert!(err.user_message().contains("notes.txt"));
    assert_eq!(Error::from(err).exit_code(), 3);
}

#[test]
fn test_error_truncated_pdf() {
    let mut truncated = sample_pdf("A", 2);
    truncated.truncate(truncated.len() / 3);

    let err = merge_bytes(&[truncated], &MergeOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        MergeError::Parse { ref source, .. } if source.reason == ParseReason::CorruptStructure
    ));
}

#[test]
fn test_error_empty_buffer() {
    let err = merge_bytes(&[Vec::new()], &MergeOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        MergeError::Parse { ref source, .. } if source.reason == ParseReason::NotAPdf
    ));
}

#[tokio::test]
async fn test_error_output_exists_no_clobber() {
    let temp_dir = TempDir::new().unwrap();
    let output = write_fixture(temp_dir.path(), "merged.pdf", b"old");

    let err = Validator::new()
        .validate_output(&output, OverwriteMode::NoClobber)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::OutputExists { .. }));
    assert_eq!(err.exit_code(), 4);
}

//! Integration tests for dry run mode.

use pdfmerge::config::OverwriteMode;
use pdfmerge::validation::{ValidationSummary, Validator};
use tempfile::TempDir;

use crate::common::{sample_pdf, write_fixture};

#[tokio::test]
async fn test_dry_run_reports_every_input() {
    let temp_dir = TempDir::new().unwrap();
    let paths = vec![
        write_fixture(temp_dir.path(), "a.pdf", &sample_pdf("A", 2)),
        write_fixture(temp_dir.path(), "b.pdf", &sample_pdf("B", 5)),
    ];

    let validator = Validator::new();
    let summary = validator.validate_files(&paths).await.unwrap();

    assert_eq!(summary.files_validated, 2);
    assert_eq!(summary.total_pages, 7);
    assert_eq!(summary.results[0].path, paths[0]);
    assert_eq!(summary.results[1].page_count, 5);
    assert_eq!(summary.results[1].page_dimensions, Some((612.0, 792.0)));
    assert!(summary.total_size > 0);
}

#[tokio::test]
async fn test_dry_run_creates_no_output() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_fixture(temp_dir.path(), "a.pdf", &sample_pdf("A", 1));
    let output = temp_dir.path().join("merged.pdf");

    let validator = Validator::new();
    validator.validate_files(&[input]).await.unwrap();
    validator
        .validate_output(&output, OverwriteMode::NoClobber)
        .await
        .unwrap();

    assert!(!output.exists());
}

#[tokio::test]
async fn test_dry_run_json_report() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_fixture(temp_dir.path(), "a.pdf", &sample_pdf("A", 3));

    let mut summary = Validator::new().validate_files(&[input]).await.unwrap();
    summary.output = Some(temp_dir.path().join("merged.pdf"));

    let json = summary.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["filesValidated"], 1);
    assert_eq!(value["totalPages"], 3);
    assert_eq!(value["results"][0]["version"], "1.5");

    let decoded: ValidationSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, summary);
}

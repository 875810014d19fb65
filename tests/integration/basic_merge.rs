//! Integration tests for basic PDF merging operations.

use lopdf::Document;
use pdfmerge::config::{CompressionLevel, MergeOptions, Metadata};
use pdfmerge::io::{PdfWriter, load_inputs};
use pdfmerge::merge::{Merger, PRODUCER, SourceInput, merge_bytes, read_metadata};
use rstest::rstest;
use tempfile::TempDir;

use crate::common::{labels, page_texts, sample_pdf, write_fixture};

#[tokio::test]
async fn test_merge_files_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let paths = vec![
        write_fixture(temp_dir.path(), "a.pdf", &sample_pdf("A", 2)),
        write_fixture(temp_dir.path(), "b.pdf", &sample_pdf("B", 1)),
        write_fixture(temp_dir.path(), "c.pdf", &sample_pdf("C", 3)),
    ];

    let inputs = load_inputs(&paths, 3).await.unwrap();
    let options = MergeOptions {
        jobs: 3,
        ..MergeOptions::default()
    };
    let result = Merger::new(options).merge(inputs).await.unwrap();

    assert_eq!(result.statistics.files_merged, 3);
    assert_eq!(result.statistics.total_pages, 6);

    let output = temp_dir.path().join("out").join("merged.pdf");
    let stats = PdfWriter::new()
        .save_with_stats(result.bytes, &output)
        .await
        .unwrap();
    assert!(output.exists(), "Output file was not created");
    assert_eq!(stats.file_size, std::fs::metadata(&output).unwrap().len());

    let written = std::fs::read(&output).unwrap();
    assert_eq!(
        page_texts(&written),
        labels(&["A-1", "A-2", "B-1", "C-1", "C-2", "C-3"])
    );
}

#[test]
fn test_merge_single_pdf_is_identity() {
    let input = sample_pdf("Solo", 4);
    let merged = merge_bytes(&[input.clone()], &MergeOptions::default()).unwrap();

    assert_eq!(page_texts(&merged), page_texts(&input));
}

#[test]
fn test_merge_same_buffer_twice() {
    let input = sample_pdf("A", 2);
    let merged = merge_bytes(&[&input, &input], &MergeOptions::default()).unwrap();

    assert_eq!(page_texts(&merged), labels(&["A-1", "A-2", "A-1", "A-2"]));
}

#[test]
fn test_merge_sets_metadata() {
    let options = MergeOptions {
        metadata: Metadata::new(
            Some("Annual Report".into()),
            Some("Finance".into()),
            None,
            Some("report, 2026".into()),
        ),
        ..MergeOptions::default()
    };
    let merged = merge_bytes(&[sample_pdf("A", 1)], &options).unwrap();

    let doc = Document::load_mem(&merged).unwrap();
    let metadata = read_metadata(&doc);
    assert_eq!(metadata.title.as_deref(), Some("Annual Report"));
    assert_eq!(metadata.author.as_deref(), Some("Finance"));
    assert_eq!(metadata.subject, None);
    assert_eq!(metadata.keywords.as_deref(), Some("report, 2026"));

    let info_id = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
    let info = doc.get_dictionary(info_id).unwrap();
    let producer = info.get(b"Producer").unwrap().as_str().unwrap();
    assert_eq!(producer, PRODUCER.as_bytes());
}

#[rstest]
#[case(CompressionLevel::None)]
#[case(CompressionLevel::Standard)]
#[case(CompressionLevel::Maximum)]
fn test_merge_with_compression(#[case] compression: CompressionLevel) {
    let options = MergeOptions {
        compression,
        ..MergeOptions::default()
    };
    let inputs = [sample_pdf("A", 2), sample_pdf("B", 2)];

    let first = merge_bytes(&inputs, &options).unwrap();
    let second = merge_bytes(&inputs, &options).unwrap();

    assert_eq!(first, second, "output must be deterministic");
    assert_eq!(page_texts(&first), labels(&["A-1", "A-2", "B-1", "B-2"]));
}

#[tokio::test]
async fn test_concurrent_merges_do_not_interfere() {
    let merger = Merger::new(MergeOptions::default());

    let (left, right) = tokio::join!(
        merger.merge(vec![
            SourceInput::named("a.pdf", sample_pdf("A", 2)),
            SourceInput::named("b.pdf", sample_pdf("B", 1)),
        ]),
        merger.merge(vec![SourceInput::named("c.pdf", sample_pdf("C", 3))]),
    );

    assert_eq!(page_texts(&left.unwrap().bytes), labels(&["A-1", "A-2", "B-1"]));
    assert_eq!(
        page_texts(&right.unwrap().bytes),
        labels(&["C-1", "C-2", "C-3"])
    );
}

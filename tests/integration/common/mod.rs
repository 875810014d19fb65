//! Shared helpers for the integration tests.
//!
//! Fixtures are generated with `lopdf` instead of being checked in, so every
//! test states exactly what its inputs contain.

use lopdf::{Dictionary, Document, Object, Stream, dictionary};
use std::path::{Path, PathBuf};

/// A PDF with `pages` Letter-sized pages drawing `"{label}-{n}"`.
///
/// All pages share one font object.
pub fn sample_pdf(label: &str, pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let kids: Vec<Object> = (1..=pages)
        .map(|n| {
            let content = format!("BT /F1 12 Tf 72 720 Td ({label}-{n}) Tj ET");
            let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => content_id,
                "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("Failed to build fixture");
    bytes
}

/// Write `bytes` to `dir/name` and return the path.
pub fn write_fixture(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("Failed to write fixture");
    path
}

/// The text drawn on every page of `bytes`, in page order.
pub fn page_texts(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).expect("Output is not a readable PDF");
    doc.get_pages()
        .values()
        .filter_map(|id| {
            let content = doc.get_page_content(*id).ok()?;
            let text = String::from_utf8_lossy(&content).into_owned();
            let start = text.find('(')? + 1;
            let end = text[start..].find(')')? + start;
            Some(text[start..end].to_string())
        })
        .collect()
}

/// Owned labels for comparisons.
pub fn labels(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

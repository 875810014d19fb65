//! Final assembly and serialization of the target document.

use lopdf::{Dictionary, Document, Object, StringFormat, dictionary};
use tracing::debug;

use crate::config::{CompressionLevel, Metadata};
use crate::error::SerializationError;
use crate::merge::target::TargetDocument;

/// Value written to the `/Producer` entry of the Info dictionary.
pub const PRODUCER: &str = concat!("pdfmerge ", env!("CARGO_PKG_VERSION"));

/// Options applied while serializing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Stream compression.
    pub compression: CompressionLevel,
    /// Document information entries.
    pub metadata: Metadata,
}

/// Serialize `target` into a complete PDF byte buffer.
///
/// Builds a flat page tree over the copied pages, adds the catalog, the Info
/// dictionary and the trailer, then writes header, body, cross-reference
/// table and trailer. No timestamps or random identifiers are written, so
/// identical targets serialize to identical bytes.
///
/// # Errors
///
/// Returns [`SerializationError::InvalidPage`] when a registered page is not
/// a dictionary and [`SerializationError::Write`] when the writer fails.
pub fn serialize(
    target: TargetDocument,
    options: &SerializeOptions,
) -> Result<Vec<u8>, SerializationError> {
    let (mut document, pages_id, pages) = target.into_parts();

    for id in &pages {
        match document.objects.get_mut(id) {
            Some(Object::Dictionary(page)) => page.set("Parent", pages_id),
            _ => return Err(SerializationError::InvalidPage { id: *id }),
        }
    }

    document.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => pages.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
            "Count" => pages.len() as i64,
        }),
    );

    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = document.add_object(info_dictionary(&options.metadata));

    document.trailer = Dictionary::new();
    document.trailer.set("Root", catalog_id);
    document.trailer.set("Info", info_id);

    match options.compression {
        CompressionLevel::None => {}
        CompressionLevel::Standard => document.compress(),
        CompressionLevel::Maximum => {
            document.prune_objects();
            document.compress();
        }
    }

    let mut bytes = Vec::new();
    document
        .save_to(&mut bytes)
        .map_err(|err| SerializationError::Write {
            reason: err.to_string(),
        })?;

    debug!(
        pages = pages.len(),
        objects = document.objects.len(),
        bytes = bytes.len(),
        version = %document.version,
        "serialized merged document"
    );

    Ok(bytes)
}

fn info_dictionary(metadata: &Metadata) -> Dictionary {
    let mut info = Dictionary::new();
    let fields = [
        ("Title", &metadata.title),
        ("Author", &metadata.author),
        ("Subject", &metadata.subject),
        ("Keywords", &metadata.keywords),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            info.set(key, text_string(value));
        }
    }
    info.set("Producer", text_string(PRODUCER));
    info
}

/// Encode a PDF text string: literal when ASCII, UTF-16BE with BOM otherwise.
fn text_string(value: &str) -> Object {
    if value.is_ascii() {
        return Object::String(value.as_bytes().to_vec(), StringFormat::Literal);
    }

    let mut bytes = vec![0xFE, 0xFF];
    for unit in value.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Read the document information entries back from a loaded document.
pub fn read_metadata(document: &Document) -> Metadata {
    let Some(info) = document
        .trailer
        .get(b"Info")
        .and_then(Object::as_reference)
        .ok()
        .and_then(|id| document.get_object(id).ok())
        .and_then(|object| object.as_dict().ok())
    else {
        return Metadata::default();
    };

    let field = |key: &[u8]| match info.get(key) {
        Ok(Object::String(bytes, _)) => Some(decode_text_string(bytes)),
        _ => None,
    };

    Metadata::new(
        field(b"Title"),
        field(b"Author"),
        field(b"Subject"),
        field(b"Keywords"),
    )
}

fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    String::from_utf8_lossy(bytes).into_owned()
}

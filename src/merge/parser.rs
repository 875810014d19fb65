//! Parsing raw buffers into source documents.
//!
//! The object model and cross-reference structure (classic tables, xref
//! streams and object streams) are loaded by `lopdf`. On top of that this
//! module validates the header, rejects encrypted files, and flattens the page
//! tree into an ordered list of leaf pages, resolving inherited attributes on
//! the way down.

use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, warn};

use crate::error::ParseError;

/// Page attributes that may be defined on an ancestor node of the page tree.
pub const INHERITABLE_KEYS: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Rotate", b"Resources"];

/// How far into the buffer the `%PDF-` signature may appear.
const HEADER_SEARCH_WINDOW: usize = 1024;

/// One leaf page of a source document.
#[derive(Debug, Clone)]
pub struct SourcePage {
    /// Object id of the page dictionary in the source.
    pub id: ObjectId,
    /// Inheritable attributes the page does not define itself, taken from the
    /// nearest ancestor that does.
    pub inherited: Dictionary,
}

/// An immutable, parsed input PDF.
#[derive(Debug)]
pub struct SourceDocument {
    document: Document,
    pages: Vec<SourcePage>,
    tree_nodes: BTreeSet<ObjectId>,
}

impl SourceDocument {
    /// Parse a raw buffer.
    ///
    /// # Errors
    ///
    /// - `not-a-pdf` when no `%PDF-` signature starts in the first 1024 bytes
    /// - `encrypted` when the document carries an `/Encrypt` dictionary
    /// - `corrupt-structure` when the xref, trailer, catalog or page tree
    ///   cannot be resolved
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        if !has_pdf_header(bytes) {
            return Err(ParseError::not_a_pdf("missing %PDF- header"));
        }

        let document = Document::load_mem(bytes).map_err(|err| {
            let message = err.to_string();
            let lowered = message.to_lowercase();
            if lowered.contains("encrypt") || lowered.contains("password") {
                ParseError::encrypted()
            } else {
                ParseError::corrupt(message)
            }
        })?;

        Self::from_document(document)
    }

    /// Build a source document from an already loaded `lopdf` document.
    pub fn from_document(document: Document) -> Result<Self, ParseError> {
        if document.trailer.has(b"Encrypt") {
            return Err(ParseError::encrypted());
        }

        let (pages, tree_nodes) = collect_pages(&document)?;

        debug!(
            version = %document.version,
            objects = document.objects.len(),
            pages = pages.len(),
            "parsed source document"
        );

        Ok(Self {
            document,
            pages,
            tree_nodes,
        })
    }

    /// Leaf pages in document order.
    pub fn pages(&self) -> &[SourcePage] {
        &self.pages
    }

    /// Number of leaf pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// PDF version from the header, e.g. `"1.7"`.
    pub fn version(&self) -> &str {
        &self.document.version
    }

    /// Number of indirect objects loaded.
    pub fn object_count(&self) -> usize {
        self.document.objects.len()
    }

    /// Look up an indirect object.
    pub fn get_object(&self, id: ObjectId) -> Option<&Object> {
        self.document.objects.get(&id)
    }

    /// The underlying object model.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Whether `id` is an intermediate (`/Pages`) node of the page tree.
    pub fn is_tree_node(&self, id: ObjectId) -> bool {
        self.tree_nodes.contains(&id)
    }

    /// The page dictionary of the page at `index`.
    pub fn page_dictionary(&self, index: usize) -> Option<&Dictionary> {
        let page = self.pages.get(index)?;
        self.get_object(page.id)?.as_dict().ok()
    }

    /// The effective media box of the page at `index`, own or inherited.
    pub fn media_box(&self, index: usize) -> Option<[f32; 4]> {
        let page = self.pages.get(index)?;
        let dict = self.page_dictionary(index)?;
        let value = dict
            .get(b"MediaBox")
            .or_else(|_| page.inherited.get(b"MediaBox"))
            .ok()?;

        let array = resolve(&self.document, value)?.as_array().ok()?;
        if array.len() != 4 {
            return None;
        }

        let mut rect = [0.0; 4];
        for (slot, item) in rect.iter_mut().zip(array) {
            *slot = resolve(&self.document, item)?.as_float().ok()?;
        }
        Some(rect)
    }
}

/// Parse a raw buffer into a [`SourceDocument`].
pub fn parse_document(bytes: &[u8]) -> Result<SourceDocument, ParseError> {
    SourceDocument::parse(bytes)
}

/// Whether the buffer carries a PDF signature near its start.
pub fn has_pdf_header(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(HEADER_SEARCH_WINDOW)];
    window.windows(5).any(|w| w == b"%PDF-")
}

fn resolve<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => document.objects.get(id),
        other => Some(other),
    }
}

fn is_pages_node(node: &Dictionary) -> bool {
    match node.get(b"Type").and_then(Object::as_name) {
        Ok(b"Pages") => true,
        Ok(_) => false,
        Err(_) => node.has(b"Kids"),
    }
}

fn collect_pages(
    document: &Document,
) -> Result<(Vec<SourcePage>, BTreeSet<ObjectId>), ParseError> {
    let root_id = document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| ParseError::corrupt("trailer has no /Root reference"))?;

    let catalog = document
        .objects
        .get(&root_id)
        .and_then(|obj| obj.as_dict().ok())
        .ok_or_else(|| {
            ParseError::corrupt(format!(
                "catalog {} {} R is missing or not a dictionary",
                root_id.0, root_id.1
            ))
        })?;

    let tree_root = catalog
        .get(b"Pages")
        .and_then(Object::as_reference)
        .map_err(|_| ParseError::corrupt("catalog has no /Pages reference"))?;

    let mut pages = Vec::new();
    let mut tree_nodes = BTreeSet::new();
    let mut visited = HashSet::new();
    let mut stack = vec![(tree_root, Dictionary::new())];

    while let Some((id, inherited)) = stack.pop() {
        let node = document
            .objects
            .get(&id)
            .and_then(|obj| obj.as_dict().ok())
            .ok_or_else(|| {
                ParseError::corrupt(format!(
                    "page tree references missing object {} {} R",
                    id.0, id.1
                ))
            })?;

        if !is_pages_node(node) {
            let mut own = Dictionary::new();
            for key in INHERITABLE_KEYS {
                if !node.has(key)
                    && let Ok(value) = inherited.get(key)
                {
                    own.set(key.to_vec(), value.clone());
                }
            }
            pages.push(SourcePage { id, inherited: own });
            continue;
        }

        if !visited.insert(id) {
            return Err(ParseError::corrupt(format!(
                "page tree node {} {} R is reachable more than once",
                id.0, id.1
            )));
        }
        tree_nodes.insert(id);

        let mut inherited = inherited;
        for key in INHERITABLE_KEYS {
            if let Ok(value) = node.get(key) {
                inherited.set(key.to_vec(), value.clone());
            }
        }

        let kids = node
            .get(b"Kids")
            .ok()
            .and_then(|kids| resolve(document, kids))
            .and_then(|kids| kids.as_array().ok())
            .ok_or_else(|| {
                ParseError::corrupt(format!(
                    "page tree node {} {} R has no /Kids array",
                    id.0, id.1
                ))
            })?;

        // Reversed so the stack pops kids in document order.
        for kid in kids.iter().rev() {
            let kid_id = kid.as_reference().map_err(|_| {
                ParseError::corrupt(format!(
                    "page tree node {} {} R has a kid that is not a reference",
                    id.0, id.1
                ))
            })?;
            stack.push((kid_id, inherited.clone()));
        }
    }

    let declared = document
        .objects
        .get(&tree_root)
        .and_then(|obj| obj.as_dict().ok())
        .and_then(|dict| dict.get(b"Count").and_then(Object::as_i64).ok());

    if let Some(count) = declared
        && count != pages.len() as i64
    {
        warn!(
            declared = count,
            found = pages.len(),
            "page tree /Count does not match the number of leaf pages"
        );
    }

    Ok((pages, tree_nodes))
}

//! The document under construction.

use lopdf::{Document, Object, ObjectId};

use crate::error::CopyError;
use crate::merge::copier::{CopySummary, PageCopier};
use crate::merge::parser::SourceDocument;

/// Lowest version header the merged output is written with.
pub const MIN_VERSION: &str = "1.4";

/// A mutable, initially empty output document.
///
/// Pages are appended by [`PageCopier`]s, one session per source, and the
/// whole value is consumed once by [`serialize`](crate::merge::serialize).
/// Object ids are allocated from this document's own counter, so they never
/// collide with ids of any source.
#[derive(Debug, Clone)]
pub struct TargetDocument {
    document: Document,
    pages_id: ObjectId,
    pages: Vec<ObjectId>,
}

impl TargetDocument {
    /// Create an empty target.
    pub fn new() -> Self {
        let mut document = Document::with_version(MIN_VERSION);
        // Reserved up front so the page tree root keeps a stable, low number.
        let pages_id = document.new_object_id();

        Self {
            document,
            pages_id,
            pages: Vec::new(),
        }
    }

    /// Copy every page of `source`, in order, onto the end of this document.
    ///
    /// Resources shared between pages of `source` are copied once.
    pub fn append_document(&mut self, source: &SourceDocument) -> Result<CopySummary, CopyError> {
        self.note_version(source.version());

        let mut copier = PageCopier::new(source);
        copier.copy_all(self)?;
        Ok(copier.finish(self))
    }

    /// Copied pages in output order.
    pub fn pages(&self) -> &[ObjectId] {
        &self.pages
    }

    /// Number of copied pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Number of indirect objects written so far.
    pub fn object_count(&self) -> usize {
        self.document.objects.len()
    }

    /// Id reserved for the page tree root.
    pub fn pages_id(&self) -> ObjectId {
        self.pages_id
    }

    /// Version header the output will carry.
    pub fn version(&self) -> &str {
        &self.document.version
    }

    /// Look up an object already copied into the target.
    pub fn get_object(&self, id: ObjectId) -> Option<&Object> {
        self.document.objects.get(&id)
    }

    /// Raise the output version to `version` if it is newer.
    pub fn note_version(&mut self, version: &str) {
        if let (Some(new), Some(current)) =
            (parse_version(version), parse_version(&self.document.version))
            && new > current
        {
            self.document.version = version.to_string();
        }
    }

    pub(crate) fn allocate_id(&mut self) -> ObjectId {
        self.document.new_object_id()
    }

    pub(crate) fn insert_object(&mut self, id: ObjectId, object: Object) {
        self.document.objects.insert(id, object);
    }

    pub(crate) fn push_page(&mut self, id: ObjectId) {
        self.pages.push(id);
    }

    pub(crate) fn into_parts(self) -> (Document, ObjectId, Vec<ObjectId>) {
        (self.document, self.pages_id, self.pages)
    }
}

impl Default for TargetDocument {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_version(version: &str) -> Option<(u32, u32)> {
    let (major, minor) = version.trim().split_once('.')?;
    Some((major.parse().ok()?, minor.parse().ok()?))
}

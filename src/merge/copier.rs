//! Deep copy of pages from a source document into a target document.
//!
//! A [`PageCopier`] is a session scoped to one source. It remembers which
//! source objects already have a counterpart in the target, so resources
//! shared by several pages (fonts, images, color spaces) are copied once and
//! reference cycles terminate. The object graph is walked with an explicit
//! worklist rather than recursion, so deeply nested sources cannot exhaust
//! the stack.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use lopdf::{Dictionary, Object, ObjectId};
use tracing::{debug, warn};

use crate::error::CopyError;
use crate::merge::parser::SourceDocument;
use crate::merge::target::TargetDocument;

/// US Letter, used when a page carries no MediaBox at all.
pub const DEFAULT_MEDIA_BOX: [i64; 4] = [0, 0, 612, 792];

/// Outcome of a finished copy session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopySummary {
    /// Page objects appended to the target.
    pub pages_copied: usize,
    /// Non-page objects copied into the target.
    pub objects_copied: usize,
    /// References to pages that were never copied, written as null objects.
    pub dangling_page_refs: usize,
}

/// Copy session for a single source document.
#[derive(Debug)]
pub struct PageCopier<'a> {
    source: &'a SourceDocument,
    /// Source object id to the target id standing in for it.
    mapping: HashMap<ObjectId, ObjectId>,
    /// Source leaf page ids and their first index.
    page_index: HashMap<ObjectId, usize>,
    /// Source pages whose own object has been written.
    copied_pages: HashSet<ObjectId>,
    /// Target ids handed out for page references before the page was copied.
    reserved_pages: BTreeSet<ObjectId>,
    /// Objects allocated in the target but not yet written.
    worklist: VecDeque<(ObjectId, ObjectId)>,
    pages_copied: usize,
    objects_copied: usize,
}

impl<'a> PageCopier<'a> {
    /// Start a session over `source`.
    pub fn new(source: &'a SourceDocument) -> Self {
        let mut page_index = HashMap::new();
        for (index, page) in source.pages().iter().enumerate() {
            page_index.entry(page.id).or_insert(index);
        }

        Self {
            source,
            mapping: HashMap::new(),
            page_index,
            copied_pages: HashSet::new(),
            reserved_pages: BTreeSet::new(),
            worklist: VecDeque::new(),
            pages_copied: 0,
            objects_copied: 0,
        }
    }

    /// Copy every page of the source, in order.
    pub fn copy_all(&mut self, target: &mut TargetDocument) -> Result<usize, CopyError> {
        for index in 0..self.source.page_count() {
            self.copy_page(target, index)?;
        }
        Ok(self.source.page_count())
    }

    /// Copy the page at `index` (0-based) and everything it transitively
    /// references, appending it to `target`'s page list.
    ///
    /// Returns the id of the new page object in the target.
    pub fn copy_page(
        &mut self,
        target: &mut TargetDocument,
        index: usize,
    ) -> Result<ObjectId, CopyError> {
        let source = self.source;
        let page = source
            .pages()
            .get(index)
            .ok_or(CopyError::PageOutOfRange {
                index,
                count: source.page_count(),
            })?;
        let page_number = index + 1;

        let mut dict = source
            .get_object(page.id)
            .and_then(|object| object.as_dict().ok())
            .cloned()
            .ok_or(CopyError::InvalidPage {
                page: index,
                id: page.id,
            })?;

        // The serializer attaches the page to the new tree.
        dict.remove(b"Parent");
        for (key, value) in page.inherited.iter() {
            dict.set(key.clone(), value.clone());
        }
        if !dict.has(b"MediaBox") {
            warn!(
                page = page_number,
                "page has no MediaBox, defaulting to US Letter"
            );
            dict.set(
                "MediaBox",
                DEFAULT_MEDIA_BOX
                    .iter()
                    .map(|v| Object::Integer(*v))
                    .collect::<Vec<_>>(),
            );
        }

        let target_id = if self.copied_pages.insert(page.id) {
            match self.mapping.get(&page.id) {
                Some(reserved) => {
                    let reserved = *reserved;
                    self.reserved_pages.remove(&reserved);
                    reserved
                }
                None => {
                    let id = target.allocate_id();
                    self.mapping.insert(page.id, id);
                    id
                }
            }
        } else {
            // Same page listed twice: a fresh page object over shared resources.
            target.allocate_id()
        };

        let objects_before = self.objects_copied;
        let dict = self.rewrite_dictionary(dict, target, index)?;
        target.insert_object(target_id, Object::Dictionary(dict));
        self.drain(target, index)?;
        target.push_page(target_id);
        self.pages_copied += 1;

        debug!(
            page = page_number,
            id = ?target_id,
            objects = self.objects_copied - objects_before,
            "copied page"
        );
        Ok(target_id)
    }

    /// Close the session.
    ///
    /// Page references that pointed at pages never copied (none, when every
    /// page was copied) are resolved to null objects so the target has no
    /// dangling references.
    pub fn finish(self, target: &mut TargetDocument) -> CopySummary {
        for id in &self.reserved_pages {
            target.insert_object(*id, Object::Null);
        }
        if !self.reserved_pages.is_empty() {
            debug!(
                count = self.reserved_pages.len(),
                "replaced references to uncopied pages with null"
            );
        }

        CopySummary {
            pages_copied: self.pages_copied,
            objects_copied: self.objects_copied,
            dangling_page_refs: self.reserved_pages.len(),
        }
    }

    fn drain(&mut self, target: &mut TargetDocument, page: usize) -> Result<(), CopyError> {
        while let Some((source_id, target_id)) = self.worklist.pop_front() {
            let object = self
                .source
                .get_object(source_id)
                .cloned()
                .ok_or(CopyError::MissingObject {
                    page,
                    missing: source_id,
                })?;
            let object = self.rewrite(object, target, page)?;
            target.insert_object(target_id, object);
            self.objects_copied += 1;
        }
        Ok(())
    }

    fn rewrite(
        &mut self,
        object: Object,
        target: &mut TargetDocument,
        page: usize,
    ) -> Result<Object, CopyError> {
        match object {
            Object::Reference(id) => self.map_reference(id, target, page),
            Object::Array(items) => {
                let items = items
                    .into_iter()
                    .map(|item| self.rewrite(item, target, page))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Object::Array(items))
            }
            Object::Dictionary(dict) => Ok(Object::Dictionary(
                self.rewrite_dictionary(dict, target, page)?,
            )),
            Object::Stream(mut stream) => {
                let dict = std::mem::take(&mut stream.dict);
                stream.dict = self.rewrite_dictionary(dict, target, page)?;
                Ok(Object::Stream(stream))
            }
            other => Ok(other),
        }
    }

    fn rewrite_dictionary(
        &mut self,
        mut dict: Dictionary,
        target: &mut TargetDocument,
        page: usize,
    ) -> Result<Dictionary, CopyError> {
        for (_, value) in dict.iter_mut() {
            let taken = std::mem::replace(value, Object::Null);
            *value = self.rewrite(taken, target, page)?;
        }
        Ok(dict)
    }

    fn map_reference(
        &mut self,
        id: ObjectId,
        target: &mut TargetDocument,
        page: usize,
    ) -> Result<Object, CopyError> {
        if let Some(mapped) = self.mapping.get(&id) {
            return Ok(Object::Reference(*mapped));
        }

        // Intermediate tree nodes have no counterpart in the flat output tree.
        if self.source.is_tree_node(id) {
            return Ok(Object::Null);
        }

        if self.page_index.contains_key(&id) {
            let reserved = target.allocate_id();
            self.mapping.insert(id, reserved);
            self.reserved_pages.insert(reserved);
            return Ok(Object::Reference(reserved));
        }

        if self.source.get_object(id).is_none() {
            return Err(CopyError::MissingObject { page, missing: id });
        }

        let new_id = target.allocate_id();
        self.mapping.insert(id, new_id);
        self.worklist.push_back((id, new_id));
        Ok(Object::Reference(new_id))
    }
}

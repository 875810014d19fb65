//! Test fixtures: small PDFs assembled in memory with `lopdf`.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

use crate::merge::SourceDocument;

#[derive(Debug, Clone)]
enum Layout {
    Flat(usize),
    Nested(Vec<usize>),
}

/// Builds test PDFs whose pages carry the text `"{label}-{n}"`.
///
/// Every page references one shared Helvetica font object.
#[derive(Debug, Clone)]
pub(crate) struct PdfBuilder {
    label: String,
    version: String,
    layout: Layout,
    inherit: bool,
    missing_kid: bool,
    missing_font: bool,
    annotations: bool,
    cyclic_resources: bool,
}

impl PdfBuilder {
    pub(crate) fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            version: "1.5".to_string(),
            layout: Layout::Flat(1),
            inherit: false,
            missing_kid: false,
            missing_font: false,
            annotations: false,
            cyclic_resources: false,
        }
    }

    pub(crate) fn pages(mut self, count: usize) -> Self {
        self.layout = Layout::Flat(count);
        self
    }

    /// One intermediate `/Pages` node per entry, holding that many leaves.
    pub(crate) fn nested(mut self, groups: &[usize]) -> Self {
        self.layout = Layout::Nested(groups.to_vec());
        self
    }

    pub(crate) fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    /// Move MediaBox, Rotate and Resources from the leaves to the tree root.
    pub(crate) fn inherit_attributes(mut self) -> Self {
        self.inherit = true;
        self
    }

    /// Add a kid reference to an object that does not exist.
    pub(crate) fn missing_kid(mut self) -> Self {
        self.missing_kid = true;
        self
    }

    /// Point the shared font reference at an object that does not exist.
    pub(crate) fn missing_font(mut self) -> Self {
        self.missing_font = true;
        self
    }

    /// Give page 1 a link annotation whose /P and /Dest point at pages 1 and 2.
    pub(crate) fn annotations(mut self) -> Self {
        self.annotations = true;
        self
    }

    /// Make the resources an indirect dictionary that a form XObject points back to.
    pub(crate) fn cyclic_resources(mut self) -> Self {
        self.cyclic_resources = true;
        self
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let mut doc = self.build_document();
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    pub(crate) fn build_document(&self) -> Document {
        let mut doc = Document::with_version(self.version.as_str());
        let root_id = doc.new_object_id();

        let font_id = if self.missing_font {
            (9_998, 0)
        } else {
            doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica",
            })
        };

        let resources: Object = if self.cyclic_resources {
            let resources_id = doc.new_object_id();
            let form_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Form",
                    "BBox" => vec![0.into(), 0.into(), 10.into(), 10.into()],
                    "Resources" => resources_id,
                },
                b"0 0 m 10 10 l S".to_vec(),
            ));
            doc.objects.insert(
                resources_id,
                Object::Dictionary(dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                    "XObject" => dictionary! { "X1" => form_id },
                }),
            );
            resources_id.into()
        } else {
            dictionary! { "Font" => dictionary! { "F1" => font_id } }.into()
        };

        let groups = match &self.layout {
            Layout::Flat(count) => vec![*count],
            Layout::Nested(groups) => groups.clone(),
        };
        let total: usize = groups.iter().sum();

        // Allocate groups back to front so object numbers run against page order.
        let mut group_nodes: Vec<(ObjectId, Vec<ObjectId>)> = Vec::new();
        let mut number = total;
        for size in groups.iter().rev() {
            let parent = match self.layout {
                Layout::Flat(_) => root_id,
                Layout::Nested(_) => doc.new_object_id(),
            };
            let first = number - size + 1;
            let mut leaves = Vec::new();
            for n in first..=number {
                leaves.push(self.add_page(&mut doc, parent, n, &resources));
            }
            number -= size;
            group_nodes.insert(0, (parent, leaves));
        }

        let mut root_kids: Vec<Object> = Vec::new();
        match self.layout {
            Layout::Flat(_) => {
                if let Some((_, leaves)) = group_nodes.first() {
                    root_kids.extend(leaves.iter().map(|id| Object::Reference(*id)));
                }
            }
            Layout::Nested(_) => {
                for (node_id, leaves) in &group_nodes {
                    doc.objects.insert(
                        *node_id,
                        Object::Dictionary(dictionary! {
                            "Type" => "Pages",
                            "Parent" => root_id,
                            "Kids" => leaves.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
                            "Count" => leaves.len() as i64,
                        }),
                    );
                    root_kids.push(Object::Reference(*node_id));
                }
            }
        }

        if self.missing_kid {
            root_kids.push(Object::Reference((9_999, 0)));
        }

        if self.annotations && total >= 2 {
            let first_page = group_nodes[0].1[0];
            let second_page = group_nodes
                .iter()
                .flat_map(|(_, leaves)| leaves.iter())
                .nth(1)
                .copied()
                .unwrap();
            let annot_id = doc.add_object(dictionary! {
                "Type" => "Annot",
                "Subtype" => "Link",
                "Rect" => vec![0.into(), 0.into(), 50.into(), 50.into()],
                "P" => first_page,
                "Dest" => vec![second_page.into(), "Fit".into()],
            });
            if let Ok(Object::Dictionary(page)) = doc.get_object_mut(first_page) {
                page.set("Annots", vec![Object::Reference(annot_id)]);
            }
        }

        let mut root = dictionary! {
            "Type" => "Pages",
            "Kids" => root_kids,
            "Count" => total as i64,
        };
        if self.inherit {
            root.set(
                "MediaBox",
                vec![0.into(), 0.into(), 300.into(), 400.into()],
            );
            root.set("Rotate", 90);
            root.set("Resources", resources.clone());
        }
        doc.objects.insert(root_id, Object::Dictionary(root));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => root_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    fn add_page(&self, doc: &mut Document, parent: ObjectId, n: usize, resources: &Object) -> ObjectId {
        let content = format!("BT /F1 12 Tf 72 720 Td ({}-{}) Tj ET", self.label, n);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => parent,
            "Contents" => content_id,
        };
        if !self.inherit {
            page.set(
                "MediaBox",
                vec![0.into(), 0.into(), 612.into(), 792.into()],
            );
            page.set("Resources", resources.clone());
        }
        doc.add_object(page)
    }
}

/// Text label drawn on a page, e.g. `"A-2"`.
pub(crate) fn page_label(doc: &Document, page_id: ObjectId) -> Option<String> {
    let page = doc.get_object(page_id).ok()?.as_dict().ok()?;
    let content_id = page.get(b"Contents").ok()?.as_reference().ok()?;
    let stream = doc.get_object(content_id).ok()?.as_stream().ok()?;
    let bytes = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    let text = String::from_utf8_lossy(&bytes);
    let start = text.find('(')? + 1;
    let end = text[start..].find(')')? + start;
    Some(text[start..end].to_string())
}

/// Labels of every page of a source document, in page order.
pub(crate) fn page_labels(source: &SourceDocument) -> Vec<String> {
    source
        .pages()
        .iter()
        .filter_map(|page| page_label(source.document(), page.id))
        .collect()
}

/// Labels of every page of a serialized PDF, in page order.
pub(crate) fn output_labels(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .filter_map(|id| page_label(&doc, *id))
        .collect()
}

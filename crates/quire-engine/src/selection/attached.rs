use crate::document::{Document, DocumentError};
use crate::selection::{Fragment, Selection};

/// A selection paired with the document it refers to.
///
/// The selection itself stays a detached value; this wrapper only borrows the
/// document for lookups that need live content, such as text lengths.
#[derive(Debug, Clone)]
pub struct AttachedSelection<'d> {
    selection: Selection,
    document: &'d Document,
}

impl<'d> AttachedSelection<'d> {
    pub(crate) fn new(selection: Selection, document: &'d Document) -> Self {
        Self {
            selection,
            document,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn document(&self) -> &'d Document {
        self.document
    }

    pub fn detach(self) -> Selection {
        self.selection
    }

    pub fn fragments(&self) -> Vec<Fragment> {
        match &self.selection {
            Selection::Null => Vec::new(),
            Selection::Property(selection) => selection.fragments(),
            Selection::Container(selection) => {
                selection.fragments_with(|path| self.document.text_len(path).ok())
            }
        }
    }

    /// Selected text, one line per covered property
    pub fn text(&self) -> Result<String, DocumentError> {
        let mut lines = Vec::new();
        for fragment in self.fragments() {
            if let Fragment::Span { path, start, end } = fragment {
                let text = self.document.text(&path)?;
                let slice = text
                    .get(start..end)
                    .ok_or(DocumentError::InvalidOffset { path, offset: end })?;
                lines.push(slice.to_string());
            }
        }
        Ok(lines.join("\n"))
    }
}

impl Selection {
    pub fn attach(self, document: &Document) -> AttachedSelection<'_> {
        AttachedSelection::new(self, document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Node;
    use crate::model::{NodeId, Path};
    use crate::selection::{PropertySelection, SelectionDescriptor};
    use pretty_assertions::assert_eq;

    fn document() -> Document {
        let mut doc = Document::new();
        doc.insert(Node::text("p1", "paragraph", "hello"));
        doc.insert(Node::atomic("img", "image"));
        doc.insert(Node::text("p2", "paragraph", "world"));
        doc.insert(Node::container(
            "body",
            "container",
            vec![NodeId::from("p1"), NodeId::from("img"), NodeId::from("p2")],
        ));
        doc
    }

    #[test]
    fn attached_property_selection_reads_its_text() {
        let doc = document();
        let selection = Selection::Property(PropertySelection::new(
            Path::new(["p1", "content"]),
            1,
            4,
            false,
        ));

        let attached = selection.attach(&doc);

        assert_eq!(attached.text().unwrap(), "ell");
        assert_eq!(attached.document().version(), 0);
    }

    #[test]
    fn container_fragments_use_live_text_lengths() {
        let doc = document();
        let selection = doc
            .create_selection(&SelectionDescriptor::Container {
                container_id: Some(NodeId::from("body")),
                path: Some(Path::new(["p1", "content"])),
                start_offset: Some(3),
                end_path: Some(Path::new(["p2", "content"])),
                end_offset: Some(2),
                reverse: false,
                surface_id: None,
            })
            .unwrap();

        let attached = doc.attach(selection.clone());

        assert_eq!(
            attached.fragments(),
            vec![
                Fragment::Span {
                    path: Path::new(["p1", "content"]),
                    start: 3,
                    end: 5
                },
                Fragment::Node {
                    path: Path::new(["img"])
                },
                Fragment::Span {
                    path: Path::new(["p2", "content"]),
                    start: 0,
                    end: 2
                },
            ]
        );
        assert_eq!(attached.text().unwrap(), "lo\nwo");
        assert_eq!(attached.detach(), selection);
    }

    #[test]
    fn null_selection_has_no_fragments() {
        let doc = document();

        assert!(doc.attach(Selection::Null).fragments().is_empty());
    }
}

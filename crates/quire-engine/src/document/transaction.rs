use serde::{Deserialize, Serialize};
use xi_rope::Rope;
use xi_rope::delta::Builder;

use crate::document::annotation::transform_annotations;
use crate::document::{
    Annotation, ContainerLayout, Document, DocumentError, Node, NodeContent, TextComponent,
};
use crate::model::{CHILDREN_FIELD, COMPONENTS_FIELD, NodeId, Path};
use crate::selection::{Selection, SelectionDescriptor};

/// Splice on a text property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum TextOp {
    Insert { offset: usize, text: String },
    Delete { start: usize, end: usize },
}

/// Splice on an ordered list: container children (`[id, "nodes"]`) or
/// composite components (`[id, "components"]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum ArrayOp {
    Insert { index: usize, value: String },
    Remove { index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpdateOp {
    Text(TextOp),
    Array(ArrayOp),
}

/// One entry of a transaction's change log, in application order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "camelCase")]
pub enum Change {
    Create { id: NodeId },
    Delete { id: NodeId },
    Update { path: Path, op: UpdateOp },
    Annotate { id: NodeId },
}

/// Exclusive write handle on a document.
///
/// Edits apply immediately and are recorded in order; [`commit`](Self::commit)
/// hands the log back and bumps the document version when anything changed.
pub struct Transaction<'d> {
    doc: &'d mut Document,
    changes: Vec<Change>,
}

impl<'d> Transaction<'d> {
    pub(crate) fn new(doc: &'d mut Document) -> Self {
        Self {
            doc,
            changes: Vec::new(),
        }
    }

    pub fn get(&self, id: &NodeId) -> Result<&Node, DocumentError> {
        self.doc
            .get(id)
            .ok_or_else(|| DocumentError::NodeNotFound(id.clone()))
    }

    pub fn text(&self, path: &Path) -> Result<String, DocumentError> {
        self.doc.text(path)
    }

    pub fn text_len(&self, path: &Path) -> Result<usize, DocumentError> {
        self.doc.text_len(path)
    }

    pub fn layout(&self, container_id: &NodeId) -> Result<ContainerLayout, DocumentError> {
        self.doc.layout(container_id)
    }

    pub fn annotations_on<'a>(&'a self, path: &'a Path) -> impl Iterator<Item = &'a Annotation> {
        self.doc.annotations_on(path)
    }

    pub fn create_selection(
        &self,
        descriptor: &SelectionDescriptor,
    ) -> Result<Selection, DocumentError> {
        self.doc.create_selection(descriptor)
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn update(&mut self, path: &Path, op: UpdateOp) -> Result<(), DocumentError> {
        match &op {
            UpdateOp::Text(text_op) => self.apply_text(path, text_op)?,
            UpdateOp::Array(array_op) => self.apply_array(path, array_op)?,
        }
        self.changes.push(Change::Update {
            path: path.clone(),
            op,
        });
        Ok(())
    }

    pub fn create(&mut self, node: Node) -> Result<(), DocumentError> {
        if self.doc.nodes.contains_key(&node.id) {
            return Err(DocumentError::DuplicateNode(node.id));
        }
        let id = node.id.clone();
        self.doc.nodes.insert(id.clone(), node);
        self.changes.push(Change::Create { id });
        Ok(())
    }

    /// Remove a node record together with the annotations anchored in it
    pub fn delete(&mut self, id: &NodeId) -> Result<Node, DocumentError> {
        let node = self
            .doc
            .nodes
            .remove(id)
            .ok_or_else(|| DocumentError::NodeNotFound(id.clone()))?;
        self.doc
            .annotations
            .retain(|annotation| annotation.path.node_id().as_ref() != Some(id));
        self.changes.push(Change::Delete { id: id.clone() });
        Ok(node)
    }

    /// Take `node_id` out of the container's visible order without deleting it
    pub fn hide(&mut self, container_id: &NodeId, node_id: &NodeId) -> Result<(), DocumentError> {
        let index = self
            .get(container_id)?
            .children()
            .ok_or_else(|| DocumentError::NotAContainer(container_id.clone()))?
            .iter()
            .position(|child| child == node_id)
            .ok_or_else(|| DocumentError::NotAChild {
                container_id: container_id.clone(),
                node_id: node_id.clone(),
            })?;
        self.update(
            &Path::field(container_id, CHILDREN_FIELD),
            UpdateOp::Array(ArrayOp::Remove { index }),
        )
    }

    pub fn create_annotation(&mut self, annotation: Annotation) -> Result<(), DocumentError> {
        if self.doc.annotations.iter().any(|a| a.id == annotation.id) {
            return Err(DocumentError::DuplicateNode(annotation.id));
        }
        self.changes.push(Change::Annotate {
            id: annotation.id.clone(),
        });
        self.doc.annotations.push(annotation);
        Ok(())
    }

    /// Replace the annotation with the same id
    pub fn set_annotation(&mut self, annotation: Annotation) -> Result<(), DocumentError> {
        let slot = self
            .doc
            .annotations
            .iter_mut()
            .find(|a| a.id == annotation.id)
            .ok_or_else(|| DocumentError::NodeNotFound(annotation.id.clone()))?;
        self.changes.push(Change::Annotate {
            id: annotation.id.clone(),
        });
        *slot = annotation;
        Ok(())
    }

    /// Finish the transaction, returning its change log
    pub fn commit(self) -> Vec<Change> {
        if !self.changes.is_empty() {
            self.doc.version += 1;
        }
        self.changes
    }

    fn apply_text(&mut self, path: &Path, op: &TextOp) -> Result<(), DocumentError> {
        let text = self.doc.text(path)?;
        let mut builder = Builder::new(text.len());
        match op {
            TextOp::Insert { offset, text: inserted } => {
                check_offset(path, &text, *offset)?;
                builder.replace(*offset..*offset, Rope::from(inserted.as_str()));
            }
            TextOp::Delete { start, end } => {
                check_offset(path, &text, *start)?;
                check_offset(path, &text, *end)?;
                if start > end {
                    return Err(DocumentError::InvalidOffset {
                        path: path.clone(),
                        offset: *start,
                    });
                }
                builder.delete(*start..*end);
            }
        }
        let delta = builder.build();

        let rope = self.doc.field_text_mut(path)?;
        *rope = delta.apply(rope);
        transform_annotations(&mut self.doc.annotations, path, &delta);
        Ok(())
    }

    fn apply_array(&mut self, path: &Path, op: &ArrayOp) -> Result<(), DocumentError> {
        let id = path
            .node_id()
            .ok_or_else(|| DocumentError::PathNotFound(path.clone()))?;
        let field = path.field_name().unwrap_or_default().to_string();
        let node = self
            .doc
            .nodes
            .get_mut(&id)
            .ok_or_else(|| DocumentError::NodeNotFound(id.clone()))?;

        let removed_key = match (&mut node.content, field.as_str()) {
            (NodeContent::Container(children), CHILDREN_FIELD) => match op {
                ArrayOp::Insert { index, value } => {
                    check_index(path, *index, children.len() + 1)?;
                    children.insert(*index, NodeId::from(value.as_str()));
                    None
                }
                ArrayOp::Remove { index } => {
                    check_index(path, *index, children.len())?;
                    children.remove(*index);
                    None
                }
            },
            (NodeContent::Composite(components), COMPONENTS_FIELD) => match op {
                ArrayOp::Insert { index, value } => {
                    check_index(path, *index, components.len() + 1)?;
                    if components.iter().any(|component| component.key == *value) {
                        return Err(DocumentError::DuplicateComponent {
                            id,
                            key: value.clone(),
                        });
                    }
                    components.insert(*index, TextComponent::new(value.as_str(), ""));
                    None
                }
                ArrayOp::Remove { index } => {
                    check_index(path, *index, components.len())?;
                    Some(components.remove(*index).key)
                }
            },
            _ => return Err(DocumentError::PathNotFound(path.clone())),
        };

        if let Some(key) = removed_key {
            let component_path = Path::field(&id, &key);
            self.doc
                .annotations
                .retain(|annotation| annotation.path != component_path);
        }
        Ok(())
    }
}

fn check_offset(path: &Path, text: &str, offset: usize) -> Result<(), DocumentError> {
    if offset <= text.len() && text.is_char_boundary(offset) {
        Ok(())
    } else {
        Err(DocumentError::InvalidOffset {
            path: path.clone(),
            offset,
        })
    }
}

fn check_index(path: &Path, index: usize, bound: usize) -> Result<(), DocumentError> {
    if index < bound {
        Ok(())
    } else {
        Err(DocumentError::InvalidIndex {
            path: path.clone(),
            index,
        })
    }
}

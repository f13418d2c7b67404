//! Document store and its transactional write handle.
//!
//! A [`Document`] owns node records and the annotation index. Reads go
//! straight to the document; every mutation goes through a [`Transaction`],
//! which is what edit strategies receive. [`Document::apply`] wraps a whole
//! command in one transaction and returns a [`Patch`].

mod annotation;
mod container;
mod node;
mod transaction;

pub use annotation::{Annotation, transfer_annotations};
pub use container::{Address, ContainerLayout};
pub use node::{Node, NodeContent, TextComponent};
pub use transaction::{ArrayOp, Change, TextOp, Transaction, UpdateOp};

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use xi_rope::Rope;

use crate::editing::{Cmd, EditContext, EditError, Patch};
use crate::model::{NodeId, Path};
use crate::selection::{AttachedSelection, Selection, SelectionDescriptor, SelectionError};

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),
    #[error("node already exists: {0}")]
    DuplicateNode(NodeId),
    #[error("{id} already has a component named {key}")]
    DuplicateComponent { id: NodeId, key: String },
    #[error("no text property at {0}")]
    PathNotFound(Path),
    #[error("{0} is not a container")]
    NotAContainer(NodeId),
    #[error("{node_id} is not a child of {container_id}")]
    NotAChild { container_id: NodeId, node_id: NodeId },
    #[error("{path} is not part of container {container_id}")]
    PathNotInContainer { path: Path, container_id: NodeId },
    #[error("offset {offset} is outside the text at {path}")]
    InvalidOffset { path: Path, offset: usize },
    #[error("index {index} is out of bounds for {path}")]
    InvalidIndex { path: Path, index: usize },
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialized form of a document
#[derive(Serialize, Deserialize)]
struct DocumentData {
    nodes: Vec<Node>,
    #[serde(default)]
    annotations: Vec<Annotation>,
}

/// Node records plus the annotations anchored in their text
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub(crate) nodes: BTreeMap<NodeId, Node>,
    pub(crate) annotations: Vec<Annotation>,
    /// Incremented by every transaction that changed something
    pub(crate) version: u64,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let data: DocumentData = serde_json::from_str(json)?;
        let mut doc = Self::new();
        for node in data.nodes {
            if doc.nodes.contains_key(&node.id) {
                return Err(DocumentError::DuplicateNode(node.id));
            }
            doc.insert(node);
        }
        doc.annotations = data.annotations;
        Ok(doc)
    }

    pub fn to_json(&self) -> Result<String, DocumentError> {
        let data = DocumentData {
            nodes: self.nodes.values().cloned().collect(),
            annotations: self.annotations.clone(),
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Add or replace a node outside of any transaction (document setup)
    pub fn insert(&mut self, node: Node) {
        self.nodes.insert(node.id.clone(), node);
    }

    pub fn add_annotation(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn annotations_on<'a>(&'a self, path: &'a Path) -> impl Iterator<Item = &'a Annotation> {
        self.annotations.iter().filter(move |a| &a.path == path)
    }

    /// Text stored at `path`
    pub fn text(&self, path: &Path) -> Result<String, DocumentError> {
        Ok(self.field_text(path)?.to_string())
    }

    pub fn text_len(&self, path: &Path) -> Result<usize, DocumentError> {
        Ok(self.field_text(path)?.len())
    }

    /// Addressable units of a container in their visible order
    pub fn layout(&self, container_id: &NodeId) -> Result<ContainerLayout, DocumentError> {
        let container = self
            .get(container_id)
            .ok_or_else(|| DocumentError::NodeNotFound(container_id.clone()))?;
        let children = container
            .children()
            .ok_or_else(|| DocumentError::NotAContainer(container_id.clone()))?;
        let units = children
            .iter()
            .map(|id| {
                let child = self
                    .get(id)
                    .ok_or_else(|| DocumentError::NodeNotFound(id.clone()))?;
                Ok((id.clone(), child.unit_paths()))
            })
            .collect::<Result<Vec<_>, DocumentError>>()?;
        Ok(ContainerLayout::new(container_id.clone(), units))
    }

    /// Build a selection from its serialized form, resolving the container
    /// a container descriptor names
    pub fn create_selection(
        &self,
        descriptor: &SelectionDescriptor,
    ) -> Result<Selection, DocumentError> {
        let layout = match descriptor {
            SelectionDescriptor::Container {
                container_id: Some(container_id),
                ..
            } => Some(Arc::new(self.layout(container_id)?)),
            _ => None,
        };
        Ok(Selection::from_descriptor(descriptor, layout)?)
    }

    pub fn attach(&self, selection: Selection) -> AttachedSelection<'_> {
        AttachedSelection::new(selection, self)
    }

    pub fn transaction(&mut self) -> Transaction<'_> {
        Transaction::new(self)
    }

    /// Run one edit command in its own transaction
    pub fn apply(&mut self, cmd: Cmd, ctx: &EditContext<'_>) -> Result<Patch, EditError> {
        crate::editing::commands::execute(self, cmd, ctx)
    }

    pub(crate) fn field_text(&self, path: &Path) -> Result<&Rope, DocumentError> {
        let (id, field) = split_path(path)?;
        self.get(&id)
            .and_then(|node| node.field_text(field))
            .ok_or_else(|| DocumentError::PathNotFound(path.clone()))
    }

    pub(crate) fn field_text_mut(&mut self, path: &Path) -> Result<&mut Rope, DocumentError> {
        let (id, field) = split_path(path)?;
        self.nodes
            .get_mut(&id)
            .and_then(|node| node.field_text_mut(field))
            .ok_or_else(|| DocumentError::PathNotFound(path.clone()))
    }
}

fn split_path(path: &Path) -> Result<(NodeId, &str), DocumentError> {
    match (path.node_id(), path.field_name()) {
        (Some(id), Some(field)) => Ok((id, field)),
        _ => Err(DocumentError::PathNotFound(path.clone())),
    }
}

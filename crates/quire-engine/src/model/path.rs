use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Field name holding the text of a plain text node.
pub const TEXT_FIELD: &str = "content";
/// Field name holding the ordered child ids of a container node.
pub const CHILDREN_FIELD: &str = "nodes";
/// Field name holding the ordered components of a composite node.
pub const COMPONENTS_FIELD: &str = "components";

/// Identifier of a node (or annotation) in a document
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh random id for nodes created by edits
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered identifier sequence addressing a field inside a node.
///
/// The first segment is always the owning node id, e.g. `["p1", "content"]`.
/// Two paths denote the same property iff they are equal segment by segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<String>);

impl Path {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Path of a node-level field such as `[id, "content"]`
    pub fn field(id: &NodeId, field: &str) -> Self {
        Self(vec![id.as_str().to_string(), field.to_string()])
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The node owning this path
    pub fn node_id(&self) -> Option<NodeId> {
        self.0.first().map(|id| NodeId::from(id.as_str()))
    }

    /// Field name below the node id, if any
    pub fn field_name(&self) -> Option<&str> {
        self.0.get(1).map(String::as_str)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

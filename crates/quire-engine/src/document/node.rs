use serde::{Deserialize, Serialize};
use xi_rope::Rope;

use crate::model::{NodeId, Path, TEXT_FIELD};

/// Structural node: an id, a type tag, and what it holds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: String,
    pub content: NodeContent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeContent {
    /// Plain annotable text at `[id, "content"]`; such nodes are textish
    Text(#[serde(with = "rope_text")] Rope),
    /// Several text components, each its own addressable unit at `[id, key]`
    Composite(Vec<TextComponent>),
    /// Ordered child ids
    Container(Vec<NodeId>),
    /// Addressable unit without text (images, rules, embeds)
    Atomic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextComponent {
    pub key: String,
    #[serde(with = "rope_text")]
    pub text: Rope,
}

impl TextComponent {
    pub fn new(key: impl Into<String>, text: &str) -> Self {
        Self {
            key: key.into(),
            text: Rope::from(text),
        }
    }
}

impl Node {
    pub fn text(id: impl Into<NodeId>, node_type: impl Into<String>, text: &str) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            content: NodeContent::Text(Rope::from(text)),
        }
    }

    pub fn composite(
        id: impl Into<NodeId>,
        node_type: impl Into<String>,
        components: Vec<TextComponent>,
    ) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            content: NodeContent::Composite(components),
        }
    }

    pub fn container(
        id: impl Into<NodeId>,
        node_type: impl Into<String>,
        children: Vec<NodeId>,
    ) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            content: NodeContent::Container(children),
        }
    }

    pub fn atomic(id: impl Into<NodeId>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            content: NodeContent::Atomic,
        }
    }

    /// Whether this node holds plain annotable text
    pub fn is_textish(&self) -> bool {
        matches!(self.content, NodeContent::Text(_))
    }

    pub fn text_path(&self) -> Option<Path> {
        self.is_textish()
            .then(|| Path::field(&self.id, TEXT_FIELD))
    }

    pub fn get_text(&self) -> Option<String> {
        match &self.content {
            NodeContent::Text(text) => Some(text.to_string()),
            _ => None,
        }
    }

    pub fn children(&self) -> Option<&[NodeId]> {
        match &self.content {
            NodeContent::Container(children) => Some(children),
            _ => None,
        }
    }

    /// Paths of the units this node contributes to a container, in order
    pub fn unit_paths(&self) -> Vec<Path> {
        match &self.content {
            NodeContent::Text(_) => vec![Path::field(&self.id, TEXT_FIELD)],
            NodeContent::Composite(components) => components
                .iter()
                .map(|component| Path::field(&self.id, &component.key))
                .collect(),
            NodeContent::Container(_) | NodeContent::Atomic => {
                vec![Path::new([self.id.as_str()])]
            }
        }
    }

    /// Text stored under `field`
    pub(crate) fn field_text(&self, field: &str) -> Option<&Rope> {
        match &self.content {
            NodeContent::Text(text) if field == TEXT_FIELD => Some(text),
            NodeContent::Composite(components) => components
                .iter()
                .find(|component| component.key == field)
                .map(|component| &component.text),
            _ => None,
        }
    }

    pub(crate) fn field_text_mut(&mut self, field: &str) -> Option<&mut Rope> {
        match &mut self.content {
            NodeContent::Text(text) if field == TEXT_FIELD => Some(text),
            NodeContent::Composite(components) => components
                .iter_mut()
                .find(|component| component.key == field)
                .map(|component| &mut component.text),
            _ => None,
        }
    }
}

/// Ropes travel as plain strings
mod rope_text {
    use serde::{Deserialize, Deserializer, Serializer};
    use xi_rope::Rope;

    pub fn serialize<S: Serializer>(rope: &Rope, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&rope.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Rope, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Rope::from(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_nodes_are_textish() {
        let node = Node::text("p1", "paragraph", "hello");

        assert!(node.is_textish());
        assert_eq!(node.text_path(), Some(Path::new(["p1", "content"])));
        assert_eq!(node.get_text().as_deref(), Some("hello"));
    }

    #[test]
    fn composite_nodes_expose_one_unit_per_component() {
        let node = Node::composite(
            "l1",
            "list",
            vec![TextComponent::new("i1", "a"), TextComponent::new("i2", "b")],
        );

        assert!(!node.is_textish());
        assert_eq!(
            node.unit_paths(),
            vec![Path::new(["l1", "i1"]), Path::new(["l1", "i2"])]
        );
        assert_eq!(node.field_text("i2").map(|t| t.to_string()).as_deref(), Some("b"));
    }

    #[test]
    fn atomic_nodes_have_no_text() {
        let node = Node::atomic("img", "image");

        assert_eq!(node.text_path(), None);
        assert_eq!(node.unit_paths(), vec![Path::new(["img"])]);
    }

    #[test]
    fn nodes_serialize_text_as_strings() {
        let node = Node::text("p1", "paragraph", "hi");

        let value = serde_json::to_value(&node).unwrap();

        assert_eq!(
            value,
            json!({"id": "p1", "type": "paragraph", "content": {"text": "hi"}})
        );
        let back: Node = serde_json::from_value(value).unwrap();
        assert_eq!(back.get_text().as_deref(), Some("hi"));
    }
}

use serde::{Deserialize, Serialize};

use crate::document::{
    ArrayOp, DocumentError, Node, TextOp, Transaction, UpdateOp, transfer_annotations,
};
use crate::editing::merge::node_at;
use crate::editing::{EditContext, EditError, EditResult, NodeBreak, Outcome};
use crate::model::{CHILDREN_FIELD, NodeId, Path};
use crate::selection::{PropertySelection, Selection};

/// Arguments of a break: split the unit at `path` at `offset`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakArgs {
    pub container_id: Option<NodeId>,
    pub path: Option<Path>,
    pub offset: Option<usize>,
}

impl BreakArgs {
    pub fn new(container_id: impl Into<NodeId>, path: Path, offset: usize) -> Self {
        Self {
            container_id: Some(container_id.into()),
            path: Some(path),
            offset: Some(offset),
        }
    }
}

/// Split the node owning `path` in two at `offset`
pub fn break_node(
    tx: &mut Transaction<'_>,
    args: BreakArgs,
    ctx: &EditContext<'_>,
) -> Result<EditResult<BreakArgs>, EditError> {
    let container_id = args
        .container_id
        .clone()
        .ok_or(EditError::InvalidArgument("containerId is mandatory"))?;
    let path = args
        .path
        .clone()
        .ok_or(EditError::InvalidArgument("path is mandatory"))?;
    let offset = args
        .offset
        .ok_or(EditError::InvalidArgument("offset is mandatory"))?;

    let layout = tx.layout(&container_id)?;
    let address = layout
        .address_of(&path)
        .ok_or_else(|| DocumentError::PathNotInContainer {
            path: path.clone(),
            container_id: container_id.clone(),
        })?;
    let node = node_at(tx, &layout, address)?;

    let custom = ctx.behavior.and_then(|behavior| behavior.find_breaker(&node));
    if custom.is_none() && !node.is_textish() {
        log::warn!("no break strategy for {}", node.node_type);
        let outcome = Outcome::NoStrategy {
            types: vec![node.node_type],
        };
        return Ok(EditResult::unchanged(args, outcome));
    }

    let split = NodeBreak {
        args: args.clone(),
        container_id,
        node,
        address,
        path,
        offset,
    };
    let selection = match custom {
        Some(breaker) => breaker(tx, &split)?,
        None => break_text_node(tx, &split)?,
    };
    Ok(EditResult::applied(args, selection))
}

/// Built-in break of a textish node.
///
/// At offset 0 an empty sibling of the same type is inserted before the node
/// and the cursor stays put. Anywhere else the tail text and the annotations
/// on it move into a new sibling inserted after the node, and the cursor
/// lands at its start.
pub fn break_text_node(
    tx: &mut Transaction<'_>,
    split: &NodeBreak,
) -> Result<Selection, EditError> {
    let len = tx.text_len(&split.path)?;
    if split.offset > len {
        return Err(DocumentError::InvalidOffset {
            path: split.path.clone(),
            offset: split.offset,
        }
        .into());
    }
    let children_path = Path::field(&split.container_id, CHILDREN_FIELD);
    let sibling_id = NodeId::generate();
    let node_type = split.node.node_type.clone();

    if split.offset == 0 {
        tx.create(Node::text(sibling_id.clone(), node_type, ""))?;
        tx.update(
            &children_path,
            UpdateOp::Array(ArrayOp::Insert {
                index: split.address.child,
                value: sibling_id.to_string(),
            }),
        )?;
        return Ok(Selection::Property(PropertySelection::collapsed(
            split.path.clone(),
            0,
        )));
    }

    let text = tx.text(&split.path)?;
    let tail = text
        .get(split.offset..)
        .ok_or_else(|| DocumentError::InvalidOffset {
            path: split.path.clone(),
            offset: split.offset,
        })?;
    let sibling = Node::text(sibling_id.clone(), node_type, tail);
    let sibling_path = sibling
        .text_path()
        .ok_or_else(|| DocumentError::PathNotFound(split.path.clone()))?;
    tx.create(sibling)?;
    transfer_annotations(tx, &split.path, split.offset, &sibling_path, 0)?;
    tx.update(
        &split.path,
        UpdateOp::Text(TextOp::Delete {
            start: split.offset,
            end: len,
        }),
    )?;
    tx.update(
        &children_path,
        UpdateOp::Array(ArrayOp::Insert {
            index: split.address.child + 1,
            value: sibling_id.to_string(),
        }),
    )?;
    Ok(Selection::Property(PropertySelection::collapsed(sibling_path, 0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Document;
    use crate::document::Annotation;
    use crate::editing::EditingBehavior;
    use pretty_assertions::assert_eq;

    fn text_path(id: &str) -> Path {
        Path::new([id, "content"])
    }

    fn document() -> Document {
        let mut doc = Document::new();
        doc.insert(Node::text("p1", "paragraph", "hello world"));
        doc.insert(Node::atomic("img", "image"));
        doc.insert(Node::container(
            "body",
            "container",
            vec![NodeId::from("p1"), NodeId::from("img")],
        ));
        doc
    }

    fn run(
        doc: &mut Document,
        args: BreakArgs,
        ctx: &EditContext<'_>,
    ) -> Result<EditResult<BreakArgs>, EditError> {
        let mut tx = doc.transaction();
        let result = break_node(&mut tx, args, ctx);
        tx.commit();
        result
    }

    fn children(doc: &Document) -> Vec<NodeId> {
        doc.get(&NodeId::from("body"))
            .and_then(Node::children)
            .map(<[NodeId]>::to_vec)
            .unwrap_or_default()
    }

    #[test]
    fn break_in_the_middle_moves_the_tail_into_a_new_sibling() {
        let mut doc = document();
        doc.add_annotation(Annotation::new("a1", "strong", text_path("p1"), 6, 11));

        let result = run(
            &mut doc,
            BreakArgs::new("body", text_path("p1"), 5),
            &EditContext::new(),
        )
        .unwrap();

        let order = children(&doc);
        assert_eq!(order.len(), 3);
        assert_eq!(order[0], NodeId::from("p1"));
        let sibling_path = Path::field(&order[1], "content");
        assert_eq!(doc.text(&text_path("p1")).unwrap(), "hello");
        assert_eq!(doc.text(&sibling_path).unwrap(), " world");
        assert_eq!(
            result.selection,
            Some(Selection::Property(PropertySelection::collapsed(sibling_path.clone(), 0)))
        );
        let moved = &doc.annotations()[0];
        assert_eq!((&moved.path, moved.start, moved.end), (&sibling_path, 1, 6));
    }

    #[test]
    fn break_at_the_start_inserts_an_empty_sibling_before() {
        let mut doc = document();

        let result = run(
            &mut doc,
            BreakArgs::new("body", text_path("p1"), 0),
            &EditContext::new(),
        )
        .unwrap();

        let order = children(&doc);
        assert_eq!(order[1], NodeId::from("p1"));
        assert_eq!(doc.text(&Path::field(&order[0], "content")).unwrap(), "");
        assert_eq!(doc.text(&text_path("p1")).unwrap(), "hello world");
        assert_eq!(
            result.selection,
            Some(Selection::Property(PropertySelection::collapsed(text_path("p1"), 0)))
        );
    }

    #[test]
    fn break_past_the_end_fails() {
        let mut doc = document();

        let result = run(
            &mut doc,
            BreakArgs::new("body", text_path("p1"), 40),
            &EditContext::new(),
        );

        assert!(matches!(
            result,
            Err(EditError::Document(DocumentError::InvalidOffset { offset: 40, .. }))
        ));
    }

    #[test]
    fn atomic_nodes_need_a_registered_breaker() {
        let mut doc = document();

        let result = run(
            &mut doc,
            BreakArgs::new("body", Path::new(["img"]), 0),
            &EditContext::new(),
        )
        .unwrap();

        assert_eq!(
            result.outcome,
            Outcome::NoStrategy {
                types: vec!["image".to_string()]
            }
        );
        assert_eq!(doc.version(), 0);
    }

    #[test]
    fn registered_breaker_overrides_the_text_break() {
        let mut doc = document();
        let mut behavior = EditingBehavior::new();
        behavior.define_break("paragraph", |_, split| {
            Ok(Selection::Property(PropertySelection::collapsed(
                split.path.clone(),
                split.offset,
            )))
        });

        let result = run(
            &mut doc,
            BreakArgs::new("body", text_path("p1"), 3),
            &EditContext::new().with_behavior(&behavior),
        )
        .unwrap();

        assert_eq!(children(&doc).len(), 2);
        assert_eq!(
            result.selection,
            Some(Selection::Property(PropertySelection::collapsed(text_path("p1"), 3)))
        );
    }

    #[test]
    fn missing_offset_is_invalid() {
        let mut doc = document();
        let mut args = BreakArgs::new("body", text_path("p1"), 0);
        args.offset = None;

        let result = run(&mut doc, args, &EditContext::new());

        assert!(matches!(
            result,
            Err(EditError::InvalidArgument("offset is mandatory"))
        ));
    }
}

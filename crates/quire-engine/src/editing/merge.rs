use serde::{Deserialize, Serialize};

use crate::document::{
    Address, ArrayOp, ContainerLayout, DocumentError, Node, TextOp, Transaction, UpdateOp,
    transfer_annotations,
};
use crate::editing::behavior::NodeMerger;
use crate::editing::{
    ComponentMerge, DirectionPolicy, EditContext, EditError, EditResult, NodeMerge, Outcome,
};
use crate::model::{CHILDREN_FIELD, COMPONENTS_FIELD, Direction, NodeId, Path};
use crate::selection::{PropertySelection, Selection};

/// Arguments of a merge. All three fields are mandatory; they are optional
/// here so that a missing one surfaces as [`EditError::InvalidArgument`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeArgs {
    pub container_id: Option<NodeId>,
    pub path: Option<Path>,
    pub direction: Option<Direction>,
}

impl MergeArgs {
    pub fn new(container_id: impl Into<NodeId>, path: Path, direction: Direction) -> Self {
        Self {
            container_id: Some(container_id.into()),
            path: Some(path),
            direction: Some(direction),
        }
    }
}

enum Strategy<'b> {
    Custom(&'b NodeMerger),
    Text,
}

/// Merge the unit at `path` with its neighbour in `direction`.
///
/// The left unit always absorbs the right one: merging `left` from a unit
/// merges its predecessor with it, merging `right` merges it with its
/// successor.
pub fn merge(
    tx: &mut Transaction<'_>,
    args: MergeArgs,
    ctx: &EditContext<'_>,
) -> Result<EditResult<MergeArgs>, EditError> {
    let container_id = args
        .container_id
        .clone()
        .ok_or(EditError::InvalidArgument("containerId is mandatory"))?;
    let path = args
        .path
        .clone()
        .ok_or(EditError::InvalidArgument("path is mandatory"))?;
    let direction = args
        .direction
        .clone()
        .ok_or(EditError::InvalidArgument("direction is mandatory"))?;

    let layout = tx.layout(&container_id)?;
    let address = layout
        .address_of(&path)
        .ok_or_else(|| DocumentError::PathNotInContainer {
            path: path.clone(),
            container_id: container_id.clone(),
        })?;

    let neighbour = match &direction {
        Direction::Right => layout.next_address(address),
        Direction::Left => layout.previous_address(address),
        Direction::Other(value) => {
            if ctx.direction_policy == DirectionPolicy::Reject {
                return Err(EditError::InvalidArgument("direction must be left or right"));
            }
            log::debug!("merge ignored: unsupported direction {value:?}");
            let outcome = Outcome::UnsupportedDirection {
                direction: value.clone(),
            };
            return Ok(EditResult::unchanged(args, outcome));
        }
    };
    let Some(neighbour) = neighbour else {
        log::debug!("merge ignored: {path} has no neighbour to the {direction:?}");
        return Ok(EditResult::unchanged(args, Outcome::AtBoundary));
    };

    let (first_address, second_address) = match direction {
        Direction::Left => (neighbour, address),
        _ => (address, neighbour),
    };
    let first = node_at(tx, &layout, first_address)?;
    let second = node_at(tx, &layout, second_address)?;

    if first.id == second.id {
        let Some(merger) = ctx
            .behavior
            .and_then(|behavior| behavior.get_component_merger(&first.node_type))
        else {
            log::debug!("merge ignored: no component merger for {}", first.node_type);
            let outcome = Outcome::NoStrategy {
                types: vec![first.node_type.clone()],
            };
            return Ok(EditResult::unchanged(args, outcome));
        };
        let merge = ComponentMerge {
            args: args.clone(),
            container_id,
            first_path: path_at(&layout, first_address)?,
            second_path: path_at(&layout, second_address)?,
            node: first,
            first_address,
            second_address,
        };
        let selection = merger(tx, &merge)?;
        return Ok(EditResult::applied(args, selection));
    }

    let strategy = match ctx
        .behavior
        .and_then(|behavior| behavior.find_merger(&first, &second))
    {
        Some(merger) => Strategy::Custom(merger),
        None if first.is_textish() && second.is_textish() => Strategy::Text,
        None => {
            log::warn!(
                "no merge strategy for {} followed by {}",
                first.node_type,
                second.node_type
            );
            let outcome = Outcome::NoStrategy {
                types: vec![first.node_type, second.node_type],
            };
            return Ok(EditResult::unchanged(args, outcome));
        }
    };
    let merge = NodeMerge {
        args: args.clone(),
        container_id,
        first,
        second,
    };
    let selection = match strategy {
        Strategy::Custom(merger) => merger(tx, &merge)?,
        Strategy::Text => merge_text_nodes(tx, &merge)?,
    };
    Ok(EditResult::applied(args, selection))
}

/// Built-in merge of two textish nodes.
///
/// An empty first node is discarded and the cursor lands at the start of the
/// second. Otherwise the second node's text and annotations are appended to
/// the first and the cursor lands on the seam. The absorbed node is hidden
/// from the container before its record is deleted.
pub fn merge_text_nodes(
    tx: &mut Transaction<'_>,
    merge: &NodeMerge,
) -> Result<Selection, EditError> {
    let first_path = text_path(&merge.first)?;
    let second_path = text_path(&merge.second)?;
    let first_len = tx.text_len(&first_path)?;

    if first_len == 0 {
        tx.hide(&merge.container_id, &merge.first.id)?;
        tx.delete(&merge.first.id)?;
        return Ok(Selection::Property(PropertySelection::collapsed(second_path, 0)));
    }

    let second_text = tx.text(&second_path)?;
    tx.update(
        &first_path,
        UpdateOp::Text(TextOp::Insert {
            offset: first_len,
            text: second_text,
        }),
    )?;
    transfer_annotations(tx, &second_path, 0, &first_path, first_len)?;
    tx.hide(&merge.container_id, &merge.second.id)?;
    tx.delete(&merge.second.id)?;
    Ok(Selection::Property(PropertySelection::collapsed(
        first_path, first_len,
    )))
}

/// Component merger for composite nodes made of text components: appends
/// the second component to the first and removes it.
pub fn merge_text_components(
    tx: &mut Transaction<'_>,
    merge: &ComponentMerge,
) -> Result<Selection, EditError> {
    let first_len = tx.text_len(&merge.first_path)?;
    let second_text = tx.text(&merge.second_path)?;
    tx.update(
        &merge.first_path,
        UpdateOp::Text(TextOp::Insert {
            offset: first_len,
            text: second_text,
        }),
    )?;
    transfer_annotations(tx, &merge.second_path, 0, &merge.first_path, first_len)?;
    tx.update(
        &Path::field(&merge.node.id, COMPONENTS_FIELD),
        UpdateOp::Array(ArrayOp::Remove {
            index: merge.second_address.component,
        }),
    )?;
    Ok(Selection::Property(PropertySelection::collapsed(
        merge.first_path.clone(),
        first_len,
    )))
}

pub(crate) fn node_at(
    tx: &Transaction<'_>,
    layout: &ContainerLayout,
    address: Address,
) -> Result<Node, DocumentError> {
    let id = layout
        .child_at(address.child)
        .ok_or_else(|| unit_missing(layout, address))?;
    tx.get(id).cloned()
}

fn path_at(layout: &ContainerLayout, address: Address) -> Result<Path, DocumentError> {
    layout
        .path_at(address)
        .cloned()
        .ok_or_else(|| unit_missing(layout, address))
}

fn unit_missing(layout: &ContainerLayout, address: Address) -> DocumentError {
    DocumentError::InvalidIndex {
        path: Path::field(layout.container_id(), CHILDREN_FIELD),
        index: address.child,
    }
}

fn text_path(node: &Node) -> Result<Path, DocumentError> {
    node.text_path()
        .ok_or_else(|| DocumentError::PathNotFound(Path::new([node.id.as_str()])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Document;
    use crate::document::{Annotation, TextComponent};
    use crate::editing::EditingBehavior;
    use crate::model::TEXT_FIELD;
    use pretty_assertions::assert_eq;

    fn text_path(id: &str) -> Path {
        Path::field(&NodeId::from(id), TEXT_FIELD)
    }

    fn document(nodes: Vec<Node>) -> Document {
        let mut doc = Document::new();
        let ids = nodes.iter().map(|node| node.id.clone()).collect();
        for node in nodes {
            doc.insert(node);
        }
        doc.insert(Node::container("body", "container", ids));
        doc
    }

    fn run(
        doc: &mut Document,
        args: MergeArgs,
        ctx: &EditContext<'_>,
    ) -> Result<EditResult<MergeArgs>, EditError> {
        let mut tx = doc.transaction();
        let result = merge(&mut tx, args, ctx);
        tx.commit();
        result
    }

    fn cursor(path: Path, offset: usize) -> Option<Selection> {
        Some(Selection::Property(PropertySelection::collapsed(path, offset)))
    }

    #[test]
    fn missing_arguments_are_invalid() {
        let mut doc = document(vec![Node::text("p1", "paragraph", "a")]);
        let mut args = MergeArgs::new("body", text_path("p1"), Direction::Right);
        args.direction = None;

        let result = run(&mut doc, args, &EditContext::new());

        assert!(matches!(
            result,
            Err(EditError::InvalidArgument("direction is mandatory"))
        ));
    }

    #[test]
    fn path_outside_the_container_fails() {
        let mut doc = document(vec![Node::text("p1", "paragraph", "a")]);

        let result = run(
            &mut doc,
            MergeArgs::new("body", text_path("nope"), Direction::Right),
            &EditContext::new(),
        );

        assert!(matches!(
            result,
            Err(EditError::Document(DocumentError::PathNotInContainer { .. }))
        ));
    }

    #[test]
    fn merging_left_from_the_first_unit_does_nothing() {
        let mut doc = document(vec![
            Node::text("p1", "paragraph", "foo"),
            Node::text("p2", "paragraph", "bar"),
        ]);
        let args = MergeArgs::new("body", text_path("p1"), Direction::Left);

        let result = run(&mut doc, args.clone(), &EditContext::new()).unwrap();

        assert_eq!(result.outcome, Outcome::AtBoundary);
        assert_eq!(result.selection, None);
        assert_eq!(result.args, args);
        assert_eq!(doc.version(), 0);
        assert_eq!(doc.text(&text_path("p1")).unwrap(), "foo");
    }

    #[test]
    fn merging_left_absorbs_into_the_predecessor() {
        let mut doc = document(vec![
            Node::text("p1", "paragraph", "foo"),
            Node::text("p2", "paragraph", "bar"),
        ]);

        let result = run(
            &mut doc,
            MergeArgs::new("body", text_path("p2"), Direction::Left),
            &EditContext::new(),
        )
        .unwrap();

        assert_eq!(doc.text(&text_path("p1")).unwrap(), "foobar");
        assert!(doc.get(&NodeId::from("p2")).is_none());
        assert_eq!(result.selection, cursor(text_path("p1"), 3));
    }

    #[test]
    fn unsupported_direction_is_ignored_by_default() {
        let mut doc = document(vec![
            Node::text("p1", "paragraph", "foo"),
            Node::text("p2", "paragraph", "bar"),
        ]);

        let result = run(
            &mut doc,
            MergeArgs::new("body", text_path("p1"), Direction::from("up")),
            &EditContext::new(),
        )
        .unwrap();

        assert_eq!(
            result.outcome,
            Outcome::UnsupportedDirection {
                direction: "up".to_string()
            }
        );
        assert_eq!(doc.version(), 0);
    }

    #[test]
    fn unsupported_direction_can_be_rejected() {
        let mut doc = document(vec![Node::text("p1", "paragraph", "foo")]);
        let ctx = EditContext::new().with_direction_policy(DirectionPolicy::Reject);

        let result = run(
            &mut doc,
            MergeArgs::new("body", text_path("p1"), Direction::from("up")),
            &ctx,
        );

        assert!(matches!(result, Err(EditError::InvalidArgument(_))));
    }

    #[test]
    fn non_textish_pair_without_behavior_is_a_reported_no_op() {
        let mut doc = document(vec![Node::atomic("img", "image"), Node::atomic("hr", "rule")]);
        let args = MergeArgs::new("body", Path::new(["img"]), Direction::Right);

        let result = run(&mut doc, args.clone(), &EditContext::new()).unwrap();

        assert_eq!(
            result,
            EditResult {
                args,
                selection: None,
                outcome: Outcome::NoStrategy {
                    types: vec!["image".to_string(), "rule".to_string()]
                },
            }
        );
        assert_eq!(doc.layout(&NodeId::from("body")).unwrap().len(), 2);
    }

    #[test]
    fn custom_merger_for_textish_followed_by_image() {
        let mut doc = document(vec![
            Node::text("p1", "paragraph", "caption"),
            Node::atomic("img", "image"),
        ]);
        let mut behavior = EditingBehavior::new();
        behavior.define_merge(crate::editing::TEXTISH, "image", |tx, merge| {
            tx.hide(&merge.container_id, &merge.second.id)?;
            tx.delete(&merge.second.id)?;
            let path = merge.first.text_path().unwrap_or_else(|| Path::new(["?"]));
            Ok(Selection::Property(PropertySelection::collapsed(path, 0)))
        });
        let ctx = EditContext::new().with_behavior(&behavior);

        let result = run(
            &mut doc,
            MergeArgs::new("body", text_path("p1"), Direction::Right),
            &ctx,
        )
        .unwrap();

        assert!(result.is_applied());
        assert_eq!(result.selection, cursor(text_path("p1"), 0));
        assert!(doc.get(&NodeId::from("img")).is_none());
    }

    #[test]
    fn behavior_without_matching_rule_falls_back_to_text_merge() {
        let mut doc = document(vec![
            Node::text("h1", "heading", "Title"),
            Node::text("p1", "paragraph", "!"),
        ]);
        let mut behavior = EditingBehavior::new();
        behavior.define_merge("figure", "image", |_, _| Ok(Selection::Null));
        let ctx = EditContext::new().with_behavior(&behavior);

        let result = run(
            &mut doc,
            MergeArgs::new("body", text_path("h1"), Direction::Right),
            &ctx,
        )
        .unwrap();

        assert_eq!(doc.text(&text_path("h1")).unwrap(), "Title!");
        assert_eq!(result.selection, cursor(text_path("h1"), 5));
    }

    #[test]
    fn components_of_one_node_use_the_component_merger() {
        let mut doc = document(vec![Node::composite(
            "list",
            "list",
            vec![TextComponent::new("i1", "one"), TextComponent::new("i2", "two")],
        )]);
        doc.add_annotation(Annotation::new(
            "a1",
            "strong",
            Path::new(["list", "i2"]),
            0,
            3,
        ));
        let mut behavior = EditingBehavior::new();
        behavior.define_component_merge("list", merge_text_components);
        let ctx = EditContext::new().with_behavior(&behavior);

        let result = run(
            &mut doc,
            MergeArgs::new("body", Path::new(["list", "i2"]), Direction::Left),
            &ctx,
        )
        .unwrap();

        assert_eq!(doc.text(&Path::new(["list", "i1"])).unwrap(), "onetwo");
        assert!(doc.text(&Path::new(["list", "i2"])).is_err());
        assert_eq!(result.selection, cursor(Path::new(["list", "i1"]), 3));
        let moved = &doc.annotations()[0];
        assert_eq!(
            (moved.path.clone(), moved.start, moved.end),
            (Path::new(["list", "i1"]), 3, 6)
        );
    }

    #[test]
    fn components_without_merger_are_left_alone() {
        let mut doc = document(vec![Node::composite(
            "list",
            "list",
            vec![TextComponent::new("i1", "one"), TextComponent::new("i2", "two")],
        )]);

        let result = run(
            &mut doc,
            MergeArgs::new("body", Path::new(["list", "i1"]), Direction::Right),
            &EditContext::new(),
        )
        .unwrap();

        assert_eq!(
            result.outcome,
            Outcome::NoStrategy {
                types: vec!["list".to_string()]
            }
        );
        assert_eq!(doc.version(), 0);
    }
}

mod common;

use common::{letter, render};
use pretty_assertions::assert_eq;
use quire_engine::{
    Annotation, BreakArgs, Cmd, Direction, EditContext, EditingBehavior, MergeArgs, NodeId,
    Outcome, Path, PropertySelection, Selection, TEXTISH,
};

fn sibling_after(doc: &quire_engine::Document, id: &str) -> NodeId {
    let body = doc.get(&NodeId::from("body")).unwrap();
    let children = body.children().unwrap();
    let index = children.iter().position(|c| c == &NodeId::from(id)).unwrap();
    children[index + 1].clone()
}

#[test]
fn break_then_merge_restores_the_document() {
    let mut doc = letter();
    let before = render(&doc);
    let path = Path::new(["p2", "content"]);

    let split = doc
        .apply(
            Cmd::Break(BreakArgs::new("body", path.clone(), 1)),
            &EditContext::new(),
        )
        .unwrap();
    let sibling = sibling_after(&doc, "p2");
    let sibling_path = Path::field(&sibling, "content");
    assert_eq!(
        split.selection,
        Some(Selection::Property(PropertySelection::collapsed(
            sibling_path.clone(),
            0
        )))
    );
    assert_eq!(doc.text(&path).unwrap(), "b");
    assert_eq!(doc.text(&sibling_path).unwrap(), "ar");

    let merged = doc
        .apply(
            Cmd::Merge(MergeArgs::new("body", sibling_path, Direction::Left)),
            &EditContext::new(),
        )
        .unwrap();

    assert_eq!(
        merged.selection,
        Some(Selection::Property(PropertySelection::collapsed(path, 1)))
    );
    assert_eq!(render(&doc), before);
    assert_eq!(doc.version(), 2);
}

#[test]
fn annotation_across_the_break_is_split() {
    let mut doc = letter();
    let path = Path::new(["p1", "content"]);
    doc.add_annotation(Annotation::new("a3", "emphasis", path.clone(), 1, 3));

    doc.apply(
        Cmd::Break(BreakArgs::new("body", path.clone(), 2)),
        &EditContext::new(),
    )
    .unwrap();

    let sibling_path = Path::field(&sibling_after(&doc, "p1"), "content");
    let head: Vec<_> = doc.annotations_on(&path).collect();
    let tail: Vec<_> = doc.annotations_on(&sibling_path).collect();
    assert_eq!((head[0].id.as_str(), head[0].start, head[0].end), ("a3", 1, 2));
    assert_eq!(tail.len(), 1);
    assert_ne!(tail[0].id, head[0].id);
    assert_eq!(
        (tail[0].annotation_type.as_str(), tail[0].start, tail[0].end),
        ("emphasis", 0, 1)
    );
}

#[test]
fn break_at_the_start_pushes_an_empty_node_before() {
    let mut doc = letter();

    let patch = doc
        .apply(
            Cmd::Break(BreakArgs::new("body", Path::new(["p2", "content"]), 0)),
            &EditContext::new(),
        )
        .unwrap();

    let inserted = sibling_after(&doc, "p1");
    assert_eq!(doc.text(&Path::field(&inserted, "content")).unwrap(), "");
    assert_eq!(sibling_after(&doc, inserted.as_str()), NodeId::from("p2"));
    assert_eq!(
        patch.selection,
        Some(Selection::Property(PropertySelection::collapsed(
            Path::new(["p2", "content"]),
            0
        )))
    );
}

#[test]
fn composite_nodes_report_no_strategy() {
    let mut doc = letter();

    let patch = doc
        .apply(
            Cmd::Break(BreakArgs::new("body", Path::new(["list", "i1"]), 2)),
            &EditContext::new(),
        )
        .unwrap();

    assert_eq!(
        patch.outcome,
        Outcome::NoStrategy {
            types: vec!["list".to_string()]
        }
    );
}

#[test]
fn textish_breaker_applies_to_headings() {
    let mut doc = letter();
    let mut behavior = EditingBehavior::new();
    behavior.define_break(TEXTISH, |_, split| {
        Ok(Selection::Property(PropertySelection::collapsed(
            split.path.clone(),
            split.offset,
        )))
    });

    let patch = doc
        .apply(
            Cmd::Break(BreakArgs::new("body", Path::new(["title", "content"]), 2)),
            &EditContext::new().with_behavior(&behavior),
        )
        .unwrap();

    assert_eq!(patch.outcome, Outcome::Applied);
    assert_eq!(doc.text(&Path::new(["title", "content"])).unwrap(), "Dear");
}

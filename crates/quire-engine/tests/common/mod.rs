use quire_engine::{Document, NodeId};

pub fn letter() -> Document {
    Document::from_json(include_str!("../data/letter.json")).unwrap()
}

/// One line per unit of the `body` container, annotations in brackets
pub fn render(doc: &Document) -> String {
    let layout = doc.layout(&NodeId::from("body")).unwrap();
    let (Some(first), Some(last)) = (layout.first_address(), layout.last_address()) else {
        return String::new();
    };
    layout
        .units_between(first, last)
        .map(|(_, path)| {
            let Ok(text) = doc.text(path) else {
                let node = path.node_id().and_then(|id| doc.get(&id).cloned()).unwrap();
                return format!("{path}: <{}>", node.node_type);
            };
            let annotations: Vec<String> = doc
                .annotations_on(path)
                .map(|a| format!(" [{} {}..{}]", a.annotation_type, a.start, a.end))
                .collect();
            format!("{path}: {text:?}{}", annotations.concat())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

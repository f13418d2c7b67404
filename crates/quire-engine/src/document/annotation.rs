use serde::{Deserialize, Serialize};
use xi_rope::delta::Transformer;
use xi_rope::{Delta, RopeInfo};

use crate::document::{DocumentError, Transaction};
use crate::model::{NodeId, Path};

/// Text-range metadata (emphasis, links, comments) anchored in one property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub annotation_type: String,
    pub path: Path,
    pub start: usize,
    pub end: usize,
}

impl Annotation {
    pub fn new(
        id: impl Into<NodeId>,
        annotation_type: impl Into<String>,
        path: Path,
        start: usize,
        end: usize,
    ) -> Self {
        Self {
            id: id.into(),
            annotation_type: annotation_type.into(),
            path,
            start,
            end,
        }
    }

    pub fn is_zero_width(&self) -> bool {
        self.start == self.end
    }
}

/// Shift the annotations on `path` through a text delta applied to it.
///
/// Insertions at an annotation's start push it forward, insertions at its end
/// leave it alone. Annotations deleted down to nothing are dropped.
pub(crate) fn transform_annotations(
    annotations: &mut Vec<Annotation>,
    path: &Path,
    delta: &Delta<RopeInfo>,
) {
    let mut transformer = Transformer::new(delta);
    let mut collapsed = Vec::new();
    for annotation in annotations.iter_mut().filter(|a| &a.path == path) {
        if annotation.is_zero_width() {
            let at = transformer.transform(annotation.start, false);
            annotation.start = at;
            annotation.end = at;
            continue;
        }
        let start = transformer.transform(annotation.start, true);
        let end = transformer.transform(annotation.end, false);
        if start >= end {
            collapsed.push(annotation.id.clone());
        } else {
            annotation.start = start;
            annotation.end = end;
        }
    }
    annotations.retain(|annotation| !collapsed.contains(&annotation.id));
}

/// Re-anchor every annotation on `source_path` that reaches into
/// `[source_offset, ∞)` onto `dest_path`, shifted by
/// `dest_offset - source_offset`.
///
/// Annotations lying entirely at or after `source_offset` move; one that
/// straddles it is split, its head staying behind and its tail created on the
/// destination under a fresh id.
pub fn transfer_annotations(
    tx: &mut Transaction<'_>,
    source_path: &Path,
    source_offset: usize,
    dest_path: &Path,
    dest_offset: usize,
) -> Result<(), DocumentError> {
    let affected: Vec<Annotation> = tx
        .annotations_on(source_path)
        .filter(|a| a.start >= source_offset || a.end > source_offset)
        .cloned()
        .collect();

    for annotation in affected {
        let shift = |offset: usize| offset - source_offset + dest_offset;
        if annotation.start >= source_offset {
            tx.set_annotation(Annotation {
                path: dest_path.clone(),
                start: shift(annotation.start),
                end: shift(annotation.end),
                ..annotation
            })?;
        } else {
            log::debug!(
                "splitting annotation {} at {}:{}",
                annotation.id,
                source_path,
                source_offset
            );
            tx.create_annotation(Annotation {
                id: NodeId::generate(),
                annotation_type: annotation.annotation_type.clone(),
                path: dest_path.clone(),
                start: dest_offset,
                end: shift(annotation.end),
            })?;
            tx.set_annotation(Annotation {
                end: source_offset,
                ..annotation
            })?;
        }
    }
    Ok(())
}

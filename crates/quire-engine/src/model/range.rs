use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::model::Path;
use crate::selection::SelectionError;

/// A single addressable point: byte offset into the text stored at `path`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub path: Path,
    pub offset: usize,
}

impl Coordinate {
    pub fn new(path: Path, offset: usize) -> Self {
        Self { path, offset }
    }

    pub fn is_same_property(&self, other: &Coordinate) -> bool {
        self.path == other.path
    }
}

/// Document order over coordinates.
///
/// Returns `None` when the two coordinates cannot be placed relative to each
/// other (e.g. one of them lives outside the structure doing the ordering).
pub trait CoordinateOrder {
    fn compare(&self, a: &Coordinate, b: &Coordinate) -> Option<Ordering>;
}

/// Orders coordinates that share a property by offset
#[derive(Debug, Clone, Copy, Default)]
pub struct SameProperty;

impl CoordinateOrder for SameProperty {
    fn compare(&self, a: &Coordinate, b: &Coordinate) -> Option<Ordering> {
        a.is_same_property(b).then(|| a.offset.cmp(&b.offset))
    }
}

/// Normalized span between two coordinates.
///
/// `start` never follows `end` in document order; `reverse` records that the
/// original anchor was after the focus so direction-sensitive consumers can
/// rebuild it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Range {
    start: Coordinate,
    end: Coordinate,
    reverse: bool,
}

impl Range {
    /// Build a range from coordinates that are already in document order
    pub fn new(start: Coordinate, end: Coordinate, reverse: bool) -> Self {
        Self {
            start,
            end,
            reverse,
        }
    }

    pub fn collapsed(at: Coordinate) -> Self {
        Self {
            start: at.clone(),
            end: at,
            reverse: false,
        }
    }

    /// Build a range from an anchor/focus pair, swapping them when the anchor
    /// comes after the focus
    pub fn normalize(
        anchor: Coordinate,
        focus: Coordinate,
        order: &impl CoordinateOrder,
    ) -> Result<Self, SelectionError> {
        match order.compare(&anchor, &focus) {
            Some(ordering) => Ok(Self::ordered(anchor, focus, ordering)),
            None => Err(SelectionError::Unordered {
                first: anchor.path,
                second: focus.path,
            }),
        }
    }

    /// [`normalize`](Self::normalize) for a pair whose order is already known
    pub fn ordered(anchor: Coordinate, focus: Coordinate, ordering: Ordering) -> Self {
        match ordering {
            Ordering::Greater => Self::new(focus, anchor, true),
            _ => Self::new(anchor, focus, false),
        }
    }

    pub fn start(&self) -> &Coordinate {
        &self.start
    }

    pub fn end(&self) -> &Coordinate {
        &self.end
    }

    pub fn is_reverse(&self) -> bool {
        self.reverse
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Where the user started the selection
    pub fn anchor(&self) -> &Coordinate {
        if self.reverse { &self.end } else { &self.start }
    }

    /// Where the user ended the selection
    pub fn focus(&self) -> &Coordinate {
        if self.reverse { &self.start } else { &self.end }
    }

    pub fn into_parts(self) -> (Coordinate, Coordinate, bool) {
        (self.start, self.end, self.reverse)
    }
}

//! Addressing primitives shared by the selection algebra and the edit engines.
//!
//! A [`Path`] names a text-bearing field inside a node, a [`Coordinate`] is a
//! byte offset into that text, and a [`Range`] is a normalized pair of
//! coordinates that remembers which way the user dragged.

mod path;
mod range;

pub use path::{CHILDREN_FIELD, COMPONENTS_FIELD, NodeId, Path, TEXT_FIELD};
pub use range::{Coordinate, CoordinateOrder, Range, SameProperty};

use serde::{Deserialize, Serialize};

/// Horizontal direction used by merges and collapses.
///
/// Anything other than `"left"` or `"right"` is kept verbatim in
/// [`Direction::Other`] so callers can decide whether to reject it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Direction {
    Left,
    Right,
    Other(String),
}

impl From<String> for Direction {
    fn from(value: String) -> Self {
        match value.as_str() {
            "left" => Direction::Left,
            "right" => Direction::Right,
            _ => Direction::Other(value),
        }
    }
}

impl From<&str> for Direction {
    fn from(value: &str) -> Self {
        Direction::from(value.to_string())
    }
}

impl From<Direction> for String {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Left => "left".to_string(),
            Direction::Right => "right".to_string(),
            Direction::Other(value) => value,
        }
    }
}

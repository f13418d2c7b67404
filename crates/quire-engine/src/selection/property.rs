use serde_json::Value;

use crate::model::{Coordinate, Direction, Path, Range};
use crate::selection::{Fragment, Selection, SelectionDescriptor, SelectionError};

/// Selection whose both ends live in the same text property
#[derive(Debug, Clone)]
pub struct PropertySelection {
    path: Path,
    start_offset: usize,
    end_offset: usize,
    reverse: bool,
    surface_id: Option<String>,
}

impl PropertySelection {
    /// Offsets given out of order are swapped and the swap is recorded in
    /// `reverse`
    pub fn new(path: Path, start_offset: usize, end_offset: usize, reverse: bool) -> Self {
        let range = Range::ordered(
            Coordinate::new(path.clone(), start_offset),
            Coordinate::new(path, end_offset),
            start_offset.cmp(&end_offset),
        );
        let (start, end, swapped) = range.into_parts();
        Self {
            path: start.path,
            start_offset: start.offset,
            end_offset: end.offset,
            reverse: reverse != swapped,
            surface_id: None,
        }
    }

    pub fn collapsed(path: Path, offset: usize) -> Self {
        Self::new(path, offset, offset, false)
    }

    pub fn from_range(range: &Range) -> Result<Self, SelectionError> {
        if !range.start().is_same_property(range.end()) {
            return Err(SelectionError::CrossProperty { operation: "select" });
        }
        Ok(Self::new(
            range.start().path.clone(),
            range.start().offset,
            range.end().offset,
            range.is_reverse(),
        ))
    }

    pub fn with_surface(mut self, surface_id: impl Into<String>) -> Self {
        self.surface_id = Some(surface_id.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn start_offset(&self) -> usize {
        self.start_offset
    }

    pub fn end_offset(&self) -> usize {
        self.end_offset
    }

    pub fn is_reverse(&self) -> bool {
        self.reverse
    }

    pub fn surface_id(&self) -> Option<&str> {
        self.surface_id.as_deref()
    }

    pub fn start(&self) -> Coordinate {
        Coordinate::new(self.path.clone(), self.start_offset)
    }

    pub fn end(&self) -> Coordinate {
        Coordinate::new(self.path.clone(), self.end_offset)
    }

    pub fn range(&self) -> Range {
        Range::new(self.start(), self.end(), self.reverse)
    }

    pub fn is_collapsed(&self) -> bool {
        self.start_offset == self.end_offset
    }

    pub fn is_inside_of(&self, other: &Selection, strict: bool) -> bool {
        match other {
            Selection::Null => false,
            Selection::Container(container) => {
                container.contains(&Selection::Property(self.clone()), strict)
            }
            Selection::Property(outer) => outer.encloses(self, strict),
        }
    }

    pub fn contains(&self, other: &Selection, strict: bool) -> bool {
        match other {
            Selection::Null => false,
            Selection::Container(container) => {
                container.is_inside_of(&Selection::Property(self.clone()), strict)
            }
            Selection::Property(inner) => self.encloses(inner, strict),
        }
    }

    /// Non-strict overlap counts touching boundaries, strict overlap does not
    pub fn overlaps(&self, other: &Selection, strict: bool) -> bool {
        match other {
            Selection::Null => false,
            Selection::Container(container) => {
                container.overlaps(&Selection::Property(self.clone()), strict)
            }
            Selection::Property(other) => {
                if self.path != other.path {
                    return false;
                }
                if strict {
                    !(self.start_offset >= other.end_offset
                        || self.end_offset <= other.start_offset)
                } else {
                    !(self.start_offset > other.end_offset || self.end_offset < other.start_offset)
                }
            }
        }
    }

    pub fn is_left_aligned_with(&self, other: &Selection) -> bool {
        match other {
            Selection::Null => false,
            Selection::Container(container) => {
                container.is_left_aligned_with(&Selection::Property(self.clone()))
            }
            Selection::Property(other) => {
                self.path == other.path && self.start_offset == other.start_offset
            }
        }
    }

    pub fn is_right_aligned_with(&self, other: &Selection) -> bool {
        match other {
            Selection::Null => false,
            Selection::Container(container) => {
                container.is_right_aligned_with(&Selection::Property(self.clone()))
            }
            Selection::Property(other) => {
                self.path == other.path && self.end_offset == other.end_offset
            }
        }
    }

    /// Smallest selection covering both `self` and `other`
    pub fn expand(&self, other: &Selection) -> Result<Selection, SelectionError> {
        match other {
            Selection::Null => Ok(Selection::Property(self.clone())),
            Selection::Container(container) => {
                container.expand(&Selection::Property(self.clone()))
            }
            Selection::Property(other) => {
                if self.path != other.path {
                    return Err(SelectionError::CrossProperty {
                        operation: "expand",
                    });
                }
                Ok(Selection::Property(self.derive(
                    self.start_offset.min(other.start_offset),
                    self.end_offset.max(other.end_offset),
                )))
            }
        }
    }

    /// Remove `other` from whichever boundary the two selections share.
    /// When `other` reaches past the opposite boundary the result collapses
    /// onto it.
    pub fn truncate(&self, other: &Selection) -> Result<Selection, SelectionError> {
        let Some((start, end)) = other.boundaries() else {
            return Ok(Selection::Property(self.clone()));
        };
        if start.path != self.path || end.path != self.path {
            return Err(SelectionError::CrossProperty {
                operation: "truncate",
            });
        }
        let truncated = if start.offset == self.start_offset {
            self.derive(end.offset.min(self.end_offset), self.end_offset)
        } else if end.offset == self.end_offset {
            self.derive(self.start_offset, start.offset.max(self.start_offset))
        } else {
            return Err(SelectionError::NoSharedBoundary);
        };
        Ok(Selection::Property(truncated))
    }

    /// `Left` collapses onto the start, every other direction onto the end
    pub fn collapse(&self, direction: &Direction) -> PropertySelection {
        let offset = match direction {
            Direction::Left => self.start_offset,
            _ => self.end_offset,
        };
        self.derive(offset, offset)
    }

    pub fn fragments(&self) -> Vec<Fragment> {
        if self.is_collapsed() {
            vec![Fragment::Cursor {
                path: self.path.clone(),
                offset: self.start_offset,
            }]
        } else {
            vec![Fragment::Span {
                path: self.path.clone(),
                start: self.start_offset,
                end: self.end_offset,
            }]
        }
    }

    pub fn to_descriptor(&self) -> SelectionDescriptor {
        SelectionDescriptor::Property {
            path: Some(self.path.clone()),
            start_offset: Some(self.start_offset),
            end_offset: Some(self.end_offset),
            reverse: self.reverse,
            surface_id: self.surface_id.clone(),
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self.to_descriptor()).unwrap_or(Value::Null)
    }

    /// Parse `{type: "property", ...}`; a missing `endOffset` yields a
    /// collapsed selection
    pub fn from_json(value: Value) -> Result<Self, SelectionError> {
        let descriptor: SelectionDescriptor = serde_json::from_value(value)?;
        match Selection::from_descriptor(&descriptor, None)? {
            Selection::Property(selection) => Ok(selection),
            _ => Err(SelectionError::InvalidArgument(
                "expected a property selection",
            )),
        }
    }

    fn derive(&self, start_offset: usize, end_offset: usize) -> Self {
        Self {
            path: self.path.clone(),
            start_offset,
            end_offset,
            reverse: self.reverse,
            surface_id: self.surface_id.clone(),
        }
    }

    fn encloses(&self, inner: &PropertySelection, strict: bool) -> bool {
        if self.path != inner.path {
            return false;
        }
        if strict {
            self.start_offset < inner.start_offset && inner.end_offset < self.end_offset
        } else {
            self.start_offset <= inner.start_offset && inner.end_offset <= self.end_offset
        }
    }
}

impl PartialEq for PropertySelection {
    fn eq(&self, other: &Self) -> bool {
        self.surface_id == other.surface_id
            && self.path == other.path
            && self.start_offset == other.start_offset
            && self.end_offset == other.end_offset
    }
}

use std::sync::Arc;

use crate::document::{Address, ContainerLayout};
use crate::model::{Coordinate, Direction, NodeId, Path, Range};
use crate::selection::{Fragment, PropertySelection, Selection, SelectionDescriptor, SelectionError};

type Position = (Address, usize);

/// Selection spanning several units of one container.
///
/// Holds the layout it was resolved against so that every comparison can be
/// made on `(address, offset)` positions without going back to the document.
#[derive(Debug, Clone)]
pub struct ContainerSelection {
    layout: Arc<ContainerLayout>,
    start: Coordinate,
    end: Coordinate,
    start_address: Address,
    end_address: Address,
    reverse: bool,
    surface_id: Option<String>,
}

impl ContainerSelection {
    pub fn new(layout: Arc<ContainerLayout>, range: Range) -> Result<Self, SelectionError> {
        let (start, end, reverse) = range.into_parts();
        Self::from_coordinates(layout, start, end, reverse, None)
    }

    fn from_coordinates(
        layout: Arc<ContainerLayout>,
        start: Coordinate,
        end: Coordinate,
        reverse: bool,
        surface_id: Option<String>,
    ) -> Result<Self, SelectionError> {
        let anchor_address = locate(&layout, &start)?;
        let focus_address = locate(&layout, &end)?;
        let ordering = (anchor_address, start.offset).cmp(&(focus_address, end.offset));
        let (start, end, swapped) = Range::ordered(start, end, ordering).into_parts();
        let (start_address, end_address) = if swapped {
            (focus_address, anchor_address)
        } else {
            (anchor_address, focus_address)
        };
        Ok(Self {
            layout,
            start,
            end,
            start_address,
            end_address,
            reverse: reverse != swapped,
            surface_id,
        })
    }

    pub fn with_surface(mut self, surface_id: impl Into<String>) -> Self {
        self.surface_id = Some(surface_id.into());
        self
    }

    pub fn container_id(&self) -> &NodeId {
        self.layout.container_id()
    }

    pub fn layout(&self) -> &ContainerLayout {
        &self.layout
    }

    pub fn start(&self) -> &Coordinate {
        &self.start
    }

    pub fn end(&self) -> &Coordinate {
        &self.end
    }

    pub fn start_address(&self) -> Address {
        self.start_address
    }

    pub fn end_address(&self) -> Address {
        self.end_address
    }

    pub fn is_reverse(&self) -> bool {
        self.reverse
    }

    pub fn surface_id(&self) -> Option<&str> {
        self.surface_id.as_deref()
    }

    pub fn range(&self) -> Range {
        Range::new(self.start.clone(), self.end.clone(), self.reverse)
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, other: &Selection, strict: bool) -> bool {
        self.span_of(other)
            .is_some_and(|inner| encloses(self.span(), inner, strict))
    }

    pub fn is_inside_of(&self, other: &Selection, strict: bool) -> bool {
        self.span_of(other)
            .is_some_and(|outer| encloses(outer, self.span(), strict))
    }

    pub fn overlaps(&self, other: &Selection, strict: bool) -> bool {
        let Some((other_start, other_end)) = self.span_of(other) else {
            return false;
        };
        let (start, end) = self.span();
        if strict {
            !(start >= other_end || end <= other_start)
        } else {
            !(start > other_end || end < other_start)
        }
    }

    pub fn is_left_aligned_with(&self, other: &Selection) -> bool {
        other
            .boundaries()
            .is_some_and(|(start, _)| start == self.start)
    }

    pub fn is_right_aligned_with(&self, other: &Selection) -> bool {
        other.boundaries().is_some_and(|(_, end)| end == self.end)
    }

    /// Grow to cover `other`, which must lie inside the same container
    pub fn expand(&self, other: &Selection) -> Result<Selection, SelectionError> {
        let Some((other_start, other_end)) = other.boundaries() else {
            return Ok(Selection::Container(self.clone()));
        };
        let start = if self.position(&other_start)? < self.position(&self.start)? {
            other_start
        } else {
            self.start.clone()
        };
        let end = if self.position(&other_end)? > self.position(&self.end)? {
            other_end
        } else {
            self.end.clone()
        };
        self.derive(start, end).map(Selection::Container)
    }

    /// Remove `other` from whichever boundary the two selections share,
    /// collapsing onto the opposite boundary when `other` reaches past it
    pub fn truncate(&self, other: &Selection) -> Result<Selection, SelectionError> {
        let Some((other_start, other_end)) = other.boundaries() else {
            return Ok(Selection::Container(self.clone()));
        };
        let (lower, upper) = self.span();
        let truncated = if other_start == self.start {
            let start = if self.position(&other_end)? > upper {
                self.end.clone()
            } else {
                other_end
            };
            self.derive(start, self.end.clone())?
        } else if other_end == self.end {
            let end = if self.position(&other_start)? < lower {
                self.start.clone()
            } else {
                other_start
            };
            self.derive(self.start.clone(), end)?
        } else {
            return Err(SelectionError::NoSharedBoundary);
        };
        Ok(Selection::Container(truncated))
    }

    pub fn collapse(&self, direction: &Direction) -> PropertySelection {
        let at = match direction {
            Direction::Left => &self.start,
            _ => &self.end,
        };
        let collapsed = PropertySelection::collapsed(at.path.clone(), at.offset);
        match &self.surface_id {
            Some(surface_id) => collapsed.with_surface(surface_id.clone()),
            None => collapsed,
        }
    }

    /// One fragment per covered unit; units whose text length is unknown
    /// (non-text nodes) yield [`Fragment::Node`] unless they hold the end.
    pub fn fragments_with(&self, text_len: impl Fn(&Path) -> Option<usize>) -> Vec<Fragment> {
        if self.is_collapsed() {
            return vec![Fragment::Cursor {
                path: self.start.path.clone(),
                offset: self.start.offset,
            }];
        }
        self.layout
            .units_between(self.start_address, self.end_address)
            .map(|(address, path)| {
                let start = if address == self.start_address {
                    self.start.offset
                } else {
                    0
                };
                let end = if address == self.end_address {
                    Some(self.end.offset)
                } else {
                    text_len(path)
                };
                match end {
                    Some(end) => Fragment::Span {
                        path: path.clone(),
                        start,
                        end,
                    },
                    None => Fragment::Node { path: path.clone() },
                }
            })
            .collect()
    }

    pub fn to_descriptor(&self) -> SelectionDescriptor {
        SelectionDescriptor::Container {
            container_id: Some(self.container_id().clone()),
            path: Some(self.start.path.clone()),
            start_offset: Some(self.start.offset),
            end_path: Some(self.end.path.clone()),
            end_offset: Some(self.end.offset),
            reverse: self.reverse,
            surface_id: self.surface_id.clone(),
        }
    }

    fn derive(&self, start: Coordinate, end: Coordinate) -> Result<Self, SelectionError> {
        Self::from_coordinates(
            Arc::clone(&self.layout),
            start,
            end,
            self.reverse,
            self.surface_id.clone(),
        )
    }

    fn span(&self) -> (Position, Position) {
        (
            (self.start_address, self.start.offset),
            (self.end_address, self.end.offset),
        )
    }

    fn position(&self, coordinate: &Coordinate) -> Result<Position, SelectionError> {
        Ok((locate(&self.layout, coordinate)?, coordinate.offset))
    }

    /// Positions of `other` in this container, `None` when it cannot be placed
    fn span_of(&self, other: &Selection) -> Option<(Position, Position)> {
        if let Selection::Container(other) = other
            && other.container_id() != self.container_id()
        {
            return None;
        }
        let (start, end) = other.boundaries()?;
        Some((self.position(&start).ok()?, self.position(&end).ok()?))
    }
}

impl PartialEq for ContainerSelection {
    fn eq(&self, other: &Self) -> bool {
        self.surface_id == other.surface_id
            && self.container_id() == other.container_id()
            && self.start == other.start
            && self.end == other.end
    }
}

fn locate(layout: &ContainerLayout, coordinate: &Coordinate) -> Result<Address, SelectionError> {
    layout
        .address_of(&coordinate.path)
        .ok_or_else(|| SelectionError::NotInContainer {
            path: coordinate.path.clone(),
            container_id: layout.container_id().clone(),
        })
}

fn encloses(outer: (Position, Position), inner: (Position, Position), strict: bool) -> bool {
    if strict {
        outer.0 < inner.0 && inner.1 < outer.1
    } else {
        outer.0 <= inner.0 && inner.1 <= outer.1
    }
}

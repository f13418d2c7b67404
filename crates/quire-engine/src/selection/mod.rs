//! Selection algebra over paths and coordinates.
//!
//! [`Selection`] is a closed sum of three variants:
//!
//! - **Null**: nothing selected. Every predicate against it is false and every
//!   combinator treats it as the identity.
//! - **Property**: both ends in the same text property.
//! - **Container**: ends in (possibly) different units of one container.
//!
//! Binary operations on a property selection first short-circuit on the null
//! selection, then hand over to the container implementation when the other
//! operand is container-scoped (with the operand roles swapped), and only
//! then compare offsets within the shared property.
//!
//! Selections are immutable values. Linking one to a document goes through
//! [`AttachedSelection`], which borrows the document alongside the value.

mod attached;
mod container;
mod descriptor;
mod property;

pub use attached::AttachedSelection;
pub use container::ContainerSelection;
pub use descriptor::SelectionDescriptor;
pub use property::PropertySelection;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::document::ContainerLayout;
use crate::model::{Coordinate, Direction, NodeId, Path, Range};

#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("cannot {operation} to a different property")]
    CrossProperty { operation: &'static str },
    #[error("selections do not share a boundary")]
    NoSharedBoundary,
    #[error("coordinates in {first} and {second} cannot be ordered")]
    Unordered { first: Path, second: Path },
    #[error("{path} is not part of container {container_id}")]
    NotInContainer { path: Path, container_id: NodeId },
    #[error("invalid selection: {0}")]
    InvalidArgument(&'static str),
    #[error("malformed selection: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Piece of a selection confined to one property, used by renderers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Fragment {
    /// Collapsed selection
    Cursor { path: Path, offset: usize },
    /// Selected text `[start, end)` of one property
    Span { path: Path, start: usize, end: usize },
    /// A fully selected unit without text
    Node { path: Path },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Selection {
    #[default]
    Null,
    Property(PropertySelection),
    Container(ContainerSelection),
}

impl Selection {
    /// Property selection when both ends share a path, container selection
    /// otherwise (which needs the container's layout)
    pub fn from_range(
        range: Range,
        layout: Option<Arc<ContainerLayout>>,
    ) -> Result<Self, SelectionError> {
        if range.start().is_same_property(range.end()) {
            return PropertySelection::from_range(&range).map(Selection::Property);
        }
        let layout = layout.ok_or(SelectionError::InvalidArgument(
            "a container is required to span several properties",
        ))?;
        ContainerSelection::new(layout, range).map(Selection::Container)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Selection::Null)
    }

    pub fn is_collapsed(&self) -> bool {
        match self {
            Selection::Null => false,
            Selection::Property(selection) => selection.is_collapsed(),
            Selection::Container(selection) => selection.is_collapsed(),
        }
    }

    pub fn surface_id(&self) -> Option<&str> {
        match self {
            Selection::Null => None,
            Selection::Property(selection) => selection.surface_id(),
            Selection::Container(selection) => selection.surface_id(),
        }
    }

    pub fn is_reverse(&self) -> bool {
        match self {
            Selection::Null => false,
            Selection::Property(selection) => selection.is_reverse(),
            Selection::Container(selection) => selection.is_reverse(),
        }
    }

    pub fn range(&self) -> Option<Range> {
        match self {
            Selection::Null => None,
            Selection::Property(selection) => Some(selection.range()),
            Selection::Container(selection) => Some(selection.range()),
        }
    }

    /// Start and end coordinates, `None` for the null selection
    pub fn boundaries(&self) -> Option<(Coordinate, Coordinate)> {
        match self {
            Selection::Null => None,
            Selection::Property(selection) => Some((selection.start(), selection.end())),
            Selection::Container(selection) => {
                Some((selection.start().clone(), selection.end().clone()))
            }
        }
    }

    pub fn contains(&self, other: &Selection, strict: bool) -> bool {
        match self {
            Selection::Null => false,
            Selection::Property(selection) => selection.contains(other, strict),
            Selection::Container(selection) => selection.contains(other, strict),
        }
    }

    pub fn is_inside_of(&self, other: &Selection, strict: bool) -> bool {
        match self {
            Selection::Null => false,
            Selection::Property(selection) => selection.is_inside_of(other, strict),
            Selection::Container(selection) => selection.is_inside_of(other, strict),
        }
    }

    pub fn overlaps(&self, other: &Selection, strict: bool) -> bool {
        match self {
            Selection::Null => false,
            Selection::Property(selection) => selection.overlaps(other, strict),
            Selection::Container(selection) => selection.overlaps(other, strict),
        }
    }

    pub fn is_left_aligned_with(&self, other: &Selection) -> bool {
        match self {
            Selection::Null => false,
            Selection::Property(selection) => selection.is_left_aligned_with(other),
            Selection::Container(selection) => selection.is_left_aligned_with(other),
        }
    }

    pub fn is_right_aligned_with(&self, other: &Selection) -> bool {
        match self {
            Selection::Null => false,
            Selection::Property(selection) => selection.is_right_aligned_with(other),
            Selection::Container(selection) => selection.is_right_aligned_with(other),
        }
    }

    pub fn expand(&self, other: &Selection) -> Result<Selection, SelectionError> {
        match self {
            Selection::Null => Ok(other.clone()),
            Selection::Property(selection) => selection.expand(other),
            Selection::Container(selection) => selection.expand(other),
        }
    }

    pub fn truncate(&self, other: &Selection) -> Result<Selection, SelectionError> {
        match self {
            Selection::Null => Ok(Selection::Null),
            Selection::Property(selection) => selection.truncate(other),
            Selection::Container(selection) => selection.truncate(other),
        }
    }

    pub fn collapse(&self, direction: &Direction) -> Selection {
        match self {
            Selection::Null => Selection::Null,
            Selection::Property(selection) => Selection::Property(selection.collapse(direction)),
            Selection::Container(selection) => Selection::Property(selection.collapse(direction)),
        }
    }

    pub fn to_descriptor(&self) -> SelectionDescriptor {
        match self {
            Selection::Null => SelectionDescriptor::Null,
            Selection::Property(selection) => selection.to_descriptor(),
            Selection::Container(selection) => selection.to_descriptor(),
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self.to_descriptor()).unwrap_or(Value::Null)
    }

    /// Build a selection from its serialized form.
    ///
    /// Container descriptors need the layout of the container they name;
    /// [`Document::create_selection`](crate::Document::create_selection)
    /// resolves it.
    pub fn from_descriptor(
        descriptor: &SelectionDescriptor,
        layout: Option<Arc<ContainerLayout>>,
    ) -> Result<Self, SelectionError> {
        match descriptor {
            SelectionDescriptor::Null => Ok(Selection::Null),
            SelectionDescriptor::Property {
                path,
                start_offset,
                end_offset,
                reverse,
                surface_id,
            } => {
                let path = path
                    .clone()
                    .ok_or(SelectionError::InvalidArgument("path is mandatory"))?;
                let start_offset = start_offset
                    .ok_or(SelectionError::InvalidArgument("startOffset is mandatory"))?;
                let end_offset = end_offset.unwrap_or(start_offset);
                let selection = PropertySelection::new(path, start_offset, end_offset, *reverse);
                Ok(Selection::Property(match surface_id {
                    Some(surface_id) => selection.with_surface(surface_id.clone()),
                    None => selection,
                }))
            }
            SelectionDescriptor::Container {
                container_id,
                path,
                start_offset,
                end_path,
                end_offset,
                reverse,
                surface_id,
            } => {
                let layout = layout
                    .ok_or(SelectionError::InvalidArgument("containerId is mandatory"))?;
                if container_id.as_ref() != Some(layout.container_id()) {
                    return Err(SelectionError::InvalidArgument(
                        "containerId does not match the container layout",
                    ));
                }
                let path = path
                    .clone()
                    .ok_or(SelectionError::InvalidArgument("path is mandatory"))?;
                let start_offset = start_offset
                    .ok_or(SelectionError::InvalidArgument("startOffset is mandatory"))?;
                let start = Coordinate::new(path.clone(), start_offset);
                let end = Coordinate::new(
                    end_path.clone().unwrap_or(path),
                    end_offset.unwrap_or(start_offset),
                );
                let selection = ContainerSelection::new(layout, Range::new(start, end, *reverse))?;
                Ok(Selection::Container(match surface_id {
                    Some(surface_id) => selection.with_surface(surface_id.clone()),
                    None => selection,
                }))
            }
        }
    }
}

impl From<PropertySelection> for Selection {
    fn from(selection: PropertySelection) -> Self {
        Selection::Property(selection)
    }
}

impl From<ContainerSelection> for Selection {
    fn from(selection: ContainerSelection) -> Self {
        Selection::Container(selection)
    }
}

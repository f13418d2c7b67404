//! Structural edit transformations.
//!
//! ## Flow
//!
//! A caller hands a command ([`Cmd`]) to [`Document::apply`](crate::Document::apply).
//! The command runs inside one [`Transaction`](crate::Transaction):
//!
//! 1. The engine resolves the container layout and the address of the given path
//! 2. It finds the structural unit(s) involved (for merges, the neighbour in the
//!    requested direction)
//! 3. It asks the [`EditingBehavior`] registry for a strategy, falling back to
//!    the built-in text strategies for textish nodes
//! 4. The strategy mutates the document and returns the follow-up selection
//!
//! Edge-of-container merges, unsupported directions and missing strategies are
//! not failures: they finish with an [`Outcome`] describing why nothing
//! happened.

mod behavior;
mod break_node;
pub(crate) mod commands;
mod merge;

pub use behavior::{ComponentMerge, EditingBehavior, NodeBreak, NodeMerge, TEXTISH};
pub use break_node::{BreakArgs, break_node, break_text_node};
pub use commands::{Cmd, Patch};
pub use merge::{MergeArgs, merge, merge_text_components, merge_text_nodes};

use serde::Serialize;

use crate::document::DocumentError;
use crate::selection::{Selection, SelectionError};

#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
}

/// What to do with a direction other than `left` or `right`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectionPolicy {
    /// Finish as a no-op
    #[default]
    Ignore,
    /// Fail with an invalid-argument error
    Reject,
}

/// Everything an edit needs besides its arguments and the write handle
#[derive(Clone, Copy, Default)]
pub struct EditContext<'b> {
    pub behavior: Option<&'b EditingBehavior>,
    pub direction_policy: DirectionPolicy,
}

impl<'b> EditContext<'b> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behavior(mut self, behavior: &'b EditingBehavior) -> Self {
        self.behavior = Some(behavior);
        self
    }

    pub fn with_direction_policy(mut self, direction_policy: DirectionPolicy) -> Self {
        self.direction_policy = direction_policy;
        self
    }
}

/// How an edit finished
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum Outcome {
    /// A strategy ran and produced the reported selection
    Applied,
    /// No neighbouring unit in the requested direction
    AtBoundary,
    /// Direction other than `left`/`right`
    UnsupportedDirection { direction: String },
    /// No strategy registered for these node types
    NoStrategy { types: Vec<String> },
}

/// Original arguments plus the selection the edit produced.
///
/// `selection` is `None` whenever nothing was changed.
#[derive(Debug, Clone, PartialEq)]
pub struct EditResult<A> {
    pub args: A,
    pub selection: Option<Selection>,
    pub outcome: Outcome,
}

impl<A> EditResult<A> {
    pub(crate) fn applied(args: A, selection: Selection) -> Self {
        Self {
            args,
            selection: Some(selection),
            outcome: Outcome::Applied,
        }
    }

    pub(crate) fn unchanged(args: A, outcome: Outcome) -> Self {
        Self {
            args,
            selection: None,
            outcome,
        }
    }

    pub fn is_applied(&self) -> bool {
        self.outcome == Outcome::Applied
    }
}

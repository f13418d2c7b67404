use serde::{Deserialize, Serialize};

use crate::document::{Change, Document, Transaction};
use crate::editing::{BreakArgs, EditContext, EditError, MergeArgs, Outcome, break_node, merge};
use crate::selection::Selection;

/// Edit commands accepted by [`Document::apply`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Cmd {
    /// Merge a unit with its neighbour
    Merge(MergeArgs),
    /// Split a unit at an offset
    Break(BreakArgs),
}

/// Result of applying a command
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    /// Everything the command changed, in order
    pub changes: Vec<Change>,
    /// Where the cursor goes next; `None` when nothing changed
    pub selection: Option<Selection>,
    pub outcome: Outcome,
    /// Document version after the command
    pub version: u64,
}

/// Run `cmd` in one transaction. A strategy that fails midway leaves the
/// document as it was before the command.
pub(crate) fn execute(
    doc: &mut Document,
    cmd: Cmd,
    ctx: &EditContext<'_>,
) -> Result<Patch, EditError> {
    log::debug!("applying {cmd:?}");
    let checkpoint = (doc.nodes.clone(), doc.annotations.clone());
    let mut tx = doc.transaction();
    match dispatch(&mut tx, cmd, ctx) {
        Ok((selection, outcome)) => {
            let changes = tx.commit();
            Ok(Patch {
                changes,
                selection,
                outcome,
                version: doc.version,
            })
        }
        Err(err) => {
            log::debug!("rolling back {} changes: {err}", tx.changes().len());
            drop(tx);
            (doc.nodes, doc.annotations) = checkpoint;
            Err(err)
        }
    }
}

fn dispatch(
    tx: &mut Transaction<'_>,
    cmd: Cmd,
    ctx: &EditContext<'_>,
) -> Result<(Option<Selection>, Outcome), EditError> {
    match cmd {
        Cmd::Merge(args) => {
            let result = merge(tx, args, ctx)?;
            Ok((result.selection, result.outcome))
        }
        Cmd::Break(args) => {
            let result = break_node(tx, args, ctx)?;
            Ok((result.selection, result.outcome))
        }
    }
}

use std::collections::HashMap;

use crate::document::{Address, Node, Transaction};
use crate::editing::{BreakArgs, EditError, MergeArgs};
use crate::model::{NodeId, Path};
use crate::selection::Selection;

/// Wildcard type tag matched by every textish node
pub const TEXTISH: &str = "textish";

/// Two distinct nodes being merged, `first` absorbing `second`
#[derive(Debug, Clone)]
pub struct NodeMerge {
    pub args: MergeArgs,
    pub container_id: NodeId,
    pub first: Node,
    pub second: Node,
}

/// Two components of the same composite node being merged
#[derive(Debug, Clone)]
pub struct ComponentMerge {
    pub args: MergeArgs,
    pub container_id: NodeId,
    pub node: Node,
    pub first_address: Address,
    pub second_address: Address,
    pub first_path: Path,
    pub second_path: Path,
}

/// A node being split at `offset` of its property `path`
#[derive(Debug, Clone)]
pub struct NodeBreak {
    pub args: BreakArgs,
    pub container_id: NodeId,
    pub node: Node,
    pub address: Address,
    pub path: Path,
    pub offset: usize,
}

pub type NodeMerger =
    dyn Fn(&mut Transaction<'_>, &NodeMerge) -> Result<Selection, EditError> + Send + Sync;
pub type ComponentMerger =
    dyn Fn(&mut Transaction<'_>, &ComponentMerge) -> Result<Selection, EditError> + Send + Sync;
pub type Breaker =
    dyn Fn(&mut Transaction<'_>, &NodeBreak) -> Result<Selection, EditError> + Send + Sync;

/// Lookup steps tried in order when two different nodes are merged
#[derive(Debug, Clone, Copy)]
enum MergeRule {
    /// `(first.type, second.type)` registered explicitly
    ExactPair,
    /// `(textish, second.type)`: how a custom node absorbs leading text
    TextishFirst,
    /// `(first.type, textish)`: how a custom node absorbs trailing text
    TextishSecond,
}

const MERGE_RULES: [MergeRule; 3] = [
    MergeRule::ExactPair,
    MergeRule::TextishFirst,
    MergeRule::TextishSecond,
];

/// Registry of per-type edit strategies.
///
/// ```rust
/// # use quire_engine::{EditingBehavior, PropertySelection, Selection, merge_text_components};
/// let mut behavior = EditingBehavior::new();
/// behavior.define_component_merge("list", merge_text_components);
/// behavior.define_merge("textish", "image", |_tx, merge| {
///     let path = merge.first.text_path().unwrap();
///     Ok(Selection::Property(PropertySelection::collapsed(path, 0)))
/// });
/// assert!(behavior.can_merge("textish", "image"));
/// ```
#[derive(Default)]
pub struct EditingBehavior {
    mergers: HashMap<String, HashMap<String, Box<NodeMerger>>>,
    component_mergers: HashMap<String, Box<ComponentMerger>>,
    breakers: HashMap<String, Box<Breaker>>,
}

impl EditingBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register how a `first_type` node absorbs a following `second_type`
    /// node. Either type may be [`TEXTISH`].
    pub fn define_merge<F>(
        &mut self,
        first_type: impl Into<String>,
        second_type: impl Into<String>,
        merger: F,
    ) -> &mut Self
    where
        F: Fn(&mut Transaction<'_>, &NodeMerge) -> Result<Selection, EditError>
            + Send
            + Sync
            + 'static,
    {
        self.mergers
            .entry(first_type.into())
            .or_default()
            .insert(second_type.into(), Box::new(merger));
        self
    }

    /// Register how two neighbouring components of one `node_type` node merge
    pub fn define_component_merge<F>(
        &mut self,
        node_type: impl Into<String>,
        merger: F,
    ) -> &mut Self
    where
        F: Fn(&mut Transaction<'_>, &ComponentMerge) -> Result<Selection, EditError>
            + Send
            + Sync
            + 'static,
    {
        self.component_mergers
            .insert(node_type.into(), Box::new(merger));
        self
    }

    /// Register how a `node_type` node splits. `node_type` may be [`TEXTISH`].
    pub fn define_break<F>(&mut self, node_type: impl Into<String>, breaker: F) -> &mut Self
    where
        F: Fn(&mut Transaction<'_>, &NodeBreak) -> Result<Selection, EditError>
            + Send
            + Sync
            + 'static,
    {
        self.breakers.insert(node_type.into(), Box::new(breaker));
        self
    }

    /// Whether a merger is registered for exactly this pair of tags
    pub fn can_merge(&self, first_type: &str, second_type: &str) -> bool {
        self.get_merger(first_type, second_type).is_some()
    }

    pub fn get_merger(&self, first_type: &str, second_type: &str) -> Option<&NodeMerger> {
        self.mergers
            .get(first_type)
            .and_then(|by_second| by_second.get(second_type))
            .map(|strategy| &**strategy)
    }

    pub fn get_component_merger(&self, node_type: &str) -> Option<&ComponentMerger> {
        self.component_mergers.get(node_type).map(|strategy| &**strategy)
    }

    pub fn get_breaker(&self, node_type: &str) -> Option<&Breaker> {
        self.breakers.get(node_type).map(|strategy| &**strategy)
    }

    /// Merger for two distinct nodes, trying each [`MergeRule`] in order
    pub(crate) fn find_merger(&self, first: &Node, second: &Node) -> Option<&NodeMerger> {
        MERGE_RULES.iter().find_map(|rule| match rule {
            MergeRule::ExactPair => self.get_merger(&first.node_type, &second.node_type),
            MergeRule::TextishFirst if first.is_textish() => {
                self.get_merger(TEXTISH, &second.node_type)
            }
            MergeRule::TextishSecond if second.is_textish() => {
                self.get_merger(&first.node_type, TEXTISH)
            }
            _ => None,
        })
    }

    /// Breaker for `node`: its own type first, then the textish wildcard
    pub(crate) fn find_breaker(&self, node: &Node) -> Option<&Breaker> {
        self.get_breaker(&node.node_type).or_else(|| {
            node.is_textish()
                .then(|| self.get_breaker(TEXTISH))
                .flatten()
        })
    }
}

pub mod document;
pub mod editing;
pub mod model;
pub mod selection;

// Re-export key types for easier usage
pub use document::{
    Address, Annotation, ArrayOp, Change, ContainerLayout, Document, DocumentError, Node,
    NodeContent, TextComponent, TextOp, Transaction, UpdateOp, transfer_annotations,
};
pub use editing::{
    BreakArgs, Cmd, ComponentMerge, DirectionPolicy, EditContext, EditError, EditResult,
    EditingBehavior, MergeArgs, NodeBreak, NodeMerge, Outcome, Patch, TEXTISH, break_node,
    break_text_node, merge, merge_text_components, merge_text_nodes,
};
pub use model::{Coordinate, Direction, NodeId, Path, Range};
pub use selection::{
    AttachedSelection, ContainerSelection, Fragment, PropertySelection, Selection,
    SelectionDescriptor, SelectionError,
};

use serde::{Deserialize, Serialize};

use crate::model::{NodeId, Path};

/// Serialized selection, as exchanged with adapters and stored in commands.
///
/// Mandatory fields are optional here so that their absence can be reported
/// as an invalid argument rather than a parse failure. `endOffset` defaults to
/// `startOffset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SelectionDescriptor {
    Null,
    #[serde(rename_all = "camelCase")]
    Property {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<Path>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start_offset: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end_offset: Option<usize>,
        #[serde(default)]
        reverse: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        surface_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Container {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        container_id: Option<NodeId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<Path>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start_offset: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end_path: Option<Path>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end_offset: Option<usize>,
        #[serde(default)]
        reverse: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        surface_id: Option<String>,
    },
}

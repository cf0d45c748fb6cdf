// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Serde model of the graph editor's workflow export.
//!
//! Only the fields the compiler reads are modelled; everything else in the
//! export (`links`, `groups`, `extra`, positions, sizes, ...) is ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ident::{LinkId, NodeId};

/// Free-form widget values attached to a node (module name, repeats, args, ...).
pub type WidgetValues = Vec<Value>;

/// Root of an editor export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    /// Every node placed in the editor, in export order.
    #[serde(default)]
    pub nodes: Vec<RawNode>,
}

/// One node as exported by the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    /// Execution order assigned by the editor; used as the node identifier.
    pub order: NodeId,
    /// Node type tag (e.g. `"NNModule"`, `"NNGroup"`, `"Reroute"`).
    #[serde(rename = "type")]
    pub ty: String,
    /// Widget values; absent for nodes without widgets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widgets_values: Option<WidgetValues>,
    /// Declared input slots, in declaration order.
    #[serde(default)]
    pub inputs: Vec<RawInput>,
    /// Declared output slots.
    #[serde(default)]
    pub outputs: Vec<RawOutput>,
}

/// Input slot of a [`RawNode`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInput {
    /// Slot label shown in the editor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Link feeding this slot, or `None` when unconnected.
    #[serde(default)]
    pub link: Option<LinkId>,
}

/// Output slot of a [`RawNode`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOutput {
    /// Slot label shown in the editor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Links leaving this slot; the editor writes `null` for an unconnected output.
    #[serde(default)]
    pub links: Option<Vec<LinkId>>,
}

impl RawOutput {
    /// Returns true when `link` leaves this output.
    pub fn feeds(&self, link: LinkId) -> bool {
        self.links.as_deref().is_some_and(|links| links.contains(&link))
    }
}

impl RawNode {
    /// Returns true when any output of this node carries `link`.
    pub fn produces(&self, link: LinkId) -> bool {
        self.outputs.iter().any(|output| output.feeds(link))
    }
}

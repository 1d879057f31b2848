//! Output contracts from the scene core.
//!
//! The core never touches a renderer. Every display mutation marks its node
//! dirty, and [`Scene::drain_outputs`](crate::scene::Scene::drain_outputs) hands
//! the accumulated changes and semantic events to the adapter, which applies
//! them to the host's display objects.

use serde::{Deserialize, Serialize};

use crate::display::{DisplayProps, Size};
use crate::ids::NodeId;

/// Latest display state of one node that changed since the last drain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub node: NodeId,
    pub name: String,
    pub props: DisplayProps,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextChange>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextChange {
    pub text: String,
    pub font_size: f64,
}

/// Discrete signals raised while the scene runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
#[non_exhaustive]
pub enum SceneEvent {
    CuePoint {
        timeline: NodeId,
        label: String,
        frame: u32,
    },
    TimelineEnded {
        timeline: NodeId,
        looping: bool,
    },
    StateChanged {
        state: NodeId,
        active: Option<NodeId>,
    },
    /// A parent's draw order changed; `children` is the new order.
    Reordered {
        parent: NodeId,
        children: Vec<NodeId>,
    },
    Resized {
        width: f64,
        height: f64,
        landscape: bool,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Outputs {
    pub changes: Vec<Change>,
    pub events: Vec<SceneEvent>,
}

impl Outputs {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.events.is_empty()
    }
}

//! Scene-graph nodes.
//!
//! A node is a display object plus optional capability components. Behavior
//! that a class hierarchy would mix in (orientation transform, timeline
//! playback, exclusive states, text fitting) is attached as data and queried
//! with `Option` accessors.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::display::{DisplayProps, Size};
use crate::ids::NodeId;
use crate::state::StateComponent;
use crate::text::{TextContent, TextFit};
use crate::timeline::Timeline;
use crate::transform::TransformComponent;

/// What the host should render for a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Container,
    Timeline,
    State,
    NineSlice,
    Text,
    Sprite,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::Timeline => "timeline",
            Self::State => "state",
            Self::NineSlice => "nineSlice",
            Self::Text => "text",
            Self::Sprite => "sprite",
        }
    }

    /// Kinds whose width/height set their own size instead of their scale.
    #[inline]
    pub fn owns_size(self) -> bool {
        matches!(self, Self::NineSlice)
    }
}

#[derive(Debug)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// Animatable-target lookup: child name to the child last attached under it.
    pub(crate) named: HashMap<String, NodeId>,
    pub(crate) display: DisplayProps,
    pub(crate) size: Option<Size>,
    pub(crate) transform: Option<TransformComponent>,
    /// Stretch to cover the viewport instead of applying the snapshot.
    pub(crate) fit_to_screen: bool,
    pub(crate) timeline: Option<Timeline>,
    pub(crate) state: Option<StateComponent>,
    pub(crate) text: Option<TextContent>,
    pub(crate) text_fit: Option<TextFit>,
}

impl Node {
    pub(crate) fn new(id: NodeId, kind: NodeKind, name: String, default_looping: bool) -> Self {
        Self {
            id,
            name,
            kind,
            parent: None,
            children: Vec::new(),
            named: HashMap::new(),
            display: DisplayProps::default(),
            size: None,
            transform: None,
            fit_to_screen: false,
            timeline: (kind == NodeKind::Timeline).then(|| Timeline::new(default_looping)),
            state: (kind == NodeKind::State).then(StateComponent::default),
            text: None,
            text_fit: None,
        }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
    /// Draw order, back to front.
    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
    pub fn named_child(&self, name: &str) -> Option<NodeId> {
        self.named.get(name).copied()
    }
    #[inline]
    pub fn display(&self) -> &DisplayProps {
        &self.display
    }
    #[inline]
    pub fn size(&self) -> Option<Size> {
        self.size
    }
    pub fn transform(&self) -> Option<&TransformComponent> {
        self.transform.as_ref()
    }
    #[inline]
    pub fn fit_to_screen(&self) -> bool {
        self.fit_to_screen
    }
    pub fn timeline(&self) -> Option<&Timeline> {
        self.timeline.as_ref()
    }
    pub fn state(&self) -> Option<&StateComponent> {
        self.state.as_ref()
    }
    pub fn text(&self) -> Option<&TextContent> {
        self.text.as_ref()
    }
    pub fn text_fit(&self) -> Option<&TextFit> {
        self.text_fit.as_ref()
    }
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.display.visible
    }
}

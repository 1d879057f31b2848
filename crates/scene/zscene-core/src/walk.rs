//! Typed tree walks over capability components.

use crate::ids::NodeId;
use crate::node::Node;
use crate::scene::Scene;
use crate::state::StateComponent;
use crate::text::TextContent;
use crate::timeline::Timeline;
use crate::transform::TransformComponent;

/// A component a node may carry.
pub trait Capability {
    type Component;
    fn component(node: &Node) -> Option<&Self::Component>;
}

pub struct HasTransform;
pub struct HasTimeline;
pub struct HasState;
pub struct HasText;

impl Capability for HasTransform {
    type Component = TransformComponent;
    fn component(node: &Node) -> Option<&TransformComponent> {
        node.transform()
    }
}

impl Capability for HasTimeline {
    type Component = Timeline;
    fn component(node: &Node) -> Option<&Timeline> {
        node.timeline()
    }
}

impl Capability for HasState {
    type Component = StateComponent;
    fn component(node: &Node) -> Option<&StateComponent> {
        node.state()
    }
}

impl Capability for HasText {
    type Component = TextContent;
    fn component(node: &Node) -> Option<&TextContent> {
        node.text()
    }
}

impl Scene {
    /// Depth-first descendants of `root` carrying `C`.
    pub fn descendants_with<C: Capability>(&self, root: NodeId) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&id| self.node(id).and_then(C::component).is_some())
            .collect()
    }

    /// Direct children carrying `C`, in draw order.
    pub fn children_with<C: Capability>(&self, parent: NodeId) -> Vec<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .filter(|&id| self.node(id).and_then(C::component).is_some())
            .collect()
    }

    pub fn component<C: Capability>(&self, id: NodeId) -> Option<&C::Component> {
        self.node(id).and_then(C::component)
    }
}

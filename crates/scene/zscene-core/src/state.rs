//! Mutually exclusive child visibility.

use log::debug;

use crate::ids::NodeId;
use crate::outputs::SceneEvent;
use crate::scene::Scene;

/// Name tried when the requested state does not exist.
pub const IDLE_STATE: &str = "idle";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StateComponent {
    current: Option<NodeId>,
}

impl StateComponent {
    pub fn current(&self) -> Option<NodeId> {
        self.current
    }
}

impl Scene {
    /// Show exactly one direct child: `name`, else `"idle"`, else the first
    /// child. Every child is hidden first and timeline children are stopped;
    /// the chosen one is shown, moved to the top of the draw order and played
    /// when it is a timeline.
    pub fn set_state(&mut self, id: NodeId, name: &str) -> Option<NodeId> {
        let children = self.children(id).to_vec();
        let chosen = self
            .child_by_name(id, name)
            .or_else(|| self.child_by_name(id, IDLE_STATE))
            .or_else(|| children.first().copied());

        for &child in &children {
            self.set_visible(child, false);
            if self.timeline(child).is_some() {
                self.stop(child);
            }
        }

        let chosen = chosen?;
        self.set_visible(chosen, true);
        if let Some(state) = self.node_mut(id).and_then(|n| n.state.as_mut()) {
            state.current = Some(chosen);
        }
        self.bring_to_top(chosen);
        if self.timeline(chosen).is_some() {
            self.play(chosen);
        }
        debug!("state: {id} -> {chosen} ({name:?} requested)");
        self.push_event(SceneEvent::StateChanged {
            state: id,
            active: Some(chosen),
        });
        Some(chosen)
    }

    /// Active child of a state node.
    pub fn get_current_state(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.state.as_ref()?.current
    }

    pub fn has_state(&self, id: NodeId, name: &str) -> bool {
        self.child_by_name(id, name).is_some()
    }

    /// Equivalent to `set_state(id, "idle")`.
    pub fn init_state(&mut self, id: NodeId) -> Option<NodeId> {
        self.set_state(id, IDLE_STATE)
    }

    /// Names of the direct children, in draw order.
    pub fn all_state_names(&self, id: NodeId) -> Vec<String> {
        self.children(id)
            .iter()
            .filter_map(|&c| self.name(c).map(str::to_string))
            .collect()
    }
}

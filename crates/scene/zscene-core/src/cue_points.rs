//! Cue point bus: named-event pub/sub that decouples "a timeline reached a
//! labeled frame" from whoever is interested.
//!
//! Listeners are reference-counted closures. Identity is the `Rc` allocation, so
//! removing a listener means passing back a clone of the same `Rc` that was
//! added. Registering the same `Rc` twice makes it fire twice.
//!
//! Dispatch iterates a snapshot of the listener list. A listener that adds or
//! removes listeners while a cue is firing only affects later triggers.

use std::rc::Rc;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::ids::NodeId;

/// Payload handed to every listener.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuePointEvent {
    /// The timeline whose playback reached the cue.
    pub timeline: NodeId,
    pub timeline_name: String,
    pub label: String,
    pub frame: u32,
}

/// Listener receiving the bus owner's context plus the event.
pub type CueCallback<C> = Rc<dyn Fn(&mut C, &CuePointEvent)>;

/// Compare two callbacks by allocation, ignoring vtable pointers.
#[inline]
pub fn same_callback<C>(a: &CueCallback<C>, b: &CueCallback<C>) -> bool {
    std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
}

pub struct CuePoints<C> {
    listeners: HashMap<String, Vec<CueCallback<C>>>,
}

impl<C> Default for CuePoints<C> {
    fn default() -> Self {
        Self {
            listeners: HashMap::new(),
        }
    }
}

impl<C> std::fmt::Debug for CuePoints<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (label, list) in &self.listeners {
            map.entry(label, &list.len());
        }
        map.finish()
    }
}

impl<C> CuePoints<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_cue_point_listener(&mut self, label: impl Into<String>, callback: CueCallback<C>) {
        self.listeners.entry(label.into()).or_default().push(callback);
    }

    /// Removes the first registration of `callback` under `label`.
    pub fn remove_cue_point_listener(&mut self, label: &str, callback: &CueCallback<C>) -> bool {
        let Some(list) = self.listeners.get_mut(label) else {
            return false;
        };
        match list.iter().position(|cb| same_callback(cb, callback)) {
            Some(idx) => {
                list.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Clone of the listener list for `label`, in call order.
    pub fn listeners(&self, label: &str) -> Vec<CueCallback<C>> {
        self.listeners.get(label).cloned().unwrap_or_default()
    }

    pub fn listener_count(&self, label: &str) -> usize {
        self.listeners.get(label).map_or(0, Vec::len)
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Fire every listener for `label`. Returns how many were called.
    ///
    /// Use this when the bus is owned outside of `ctx`; when the bus lives inside
    /// the context, take [`listeners`](Self::listeners) first and call them.
    pub fn trigger_cue_point(&self, ctx: &mut C, event: &CuePointEvent) -> usize {
        let listeners = self.listeners(&event.label);
        for cb in &listeners {
            cb(ctx, event);
        }
        listeners.len()
    }
}

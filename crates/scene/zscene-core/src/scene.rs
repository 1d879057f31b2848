//! Scene: node arena, tree operations, geometry and the per-tick driver.
//!
//! The scene is the explicit context that owns everything a host loop needs:
//! nodes, the update scheduler, the cue point bus, the viewport and the change
//! tracker. Capability-specific operations live next to their components
//! (`transform`, `timeline`, `state`, `text`) as further `impl Scene` blocks.

use std::collections::VecDeque;

use indexmap::IndexSet;
use kurbo::{Affine, Point, Rect};
use log::{debug, trace, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::{Config, Viewport};
use crate::cue_points::{CueCallback, CuePointEvent, CuePoints};
use crate::display::{DisplayProps, Prop, Size};
use crate::error::SceneError;
use crate::ids::{IdAllocator, NodeId};
use crate::node::{Node, NodeKind};
use crate::orientation::Orientation;
use crate::outputs::{Change, Outputs, SceneEvent, TextChange};
use crate::updatables::Updatables;
use crate::Result;

#[derive(Debug)]
pub struct Scene {
    cfg: Config,
    ids: IdAllocator,
    nodes: Vec<Option<Node>>,
    stage: NodeId,
    pub(crate) updatables: Updatables<NodeId>,
    pub(crate) cue_points: CuePoints<Scene>,
    pub(crate) viewport: Viewport,
    pub(crate) orientation: Orientation,
    dirty: IndexSet<NodeId>,
    pub(crate) events: Vec<SceneEvent>,
}

impl Scene {
    /// Create a scene ticking against the system clock.
    pub fn new(cfg: Config) -> Result<Self> {
        Self::with_clock(cfg, Box::new(SystemClock::new()))
    }

    /// Create a scene whose scheduler reads time from `clock`.
    pub fn with_clock(cfg: Config, clock: Box<dyn Clock>) -> Result<Self> {
        let mut updatables = Updatables::new(clock);
        updatables.init(cfg.fps)?;
        let viewport = cfg.initial_viewport;
        let mut scene = Self {
            ids: IdAllocator::new(),
            nodes: Vec::new(),
            stage: NodeId(0),
            updatables,
            cue_points: CuePoints::new(),
            viewport,
            orientation: Orientation::from_viewport(&viewport),
            dirty: IndexSet::new(),
            events: Vec::new(),
            cfg,
        };
        scene.stage = scene.create_node(NodeKind::Container, "stage");
        Ok(scene)
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Root container every scene node is usually attached under.
    #[inline]
    pub fn stage(&self) -> NodeId {
        self.stage
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn updatables(&self) -> &Updatables<NodeId> {
        &self.updatables
    }

    /// Re-initialise the scheduler rate and reset its baseline.
    pub fn set_fps(&mut self, fps: f64) -> Result<()> {
        self.updatables.init(fps)?;
        self.cfg.fps = fps;
        Ok(())
    }

    // --- arena -------------------------------------------------------------

    pub fn create_node(&mut self, kind: NodeKind, name: impl Into<String>) -> NodeId {
        let id = self.ids.alloc_node();
        let node = Node::new(id, kind, name.into(), self.cfg.default_looping);
        debug_assert_eq!(id.index(), self.nodes.len());
        self.nodes.push(Some(node));
        self.dirty.insert(id);
        id
    }

    /// Create a node with an intrinsic size (sprites, nine-slices).
    pub fn create_sized(&mut self, kind: NodeKind, name: impl Into<String>, size: Size) -> NodeId {
        let id = self.create_node(kind, name);
        if let Some(node) = self.node_mut(id) {
            node.size = Some(size);
        }
        id
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub(crate) fn require(&self, id: NodeId) -> Result<&Node> {
        self.node(id).ok_or(SceneError::UnknownNode(id))
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Live nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter_map(Option::as_ref)
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(Node::name)
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.node(id).map(Node::kind)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(Node::children).unwrap_or(&[])
    }

    pub fn display(&self, id: NodeId) -> Option<&DisplayProps> {
        self.node(id).map(Node::display)
    }

    /// Rename a node and keep its parent's name lookup in sync.
    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) {
        let name = name.into();
        let Some(node) = self.node_mut(id) else {
            warn!("scene: set_name on unknown node {id}");
            return;
        };
        let old = std::mem::replace(&mut node.name, name.clone());
        let parent = node.parent;
        self.dirty.insert(id);
        if let Some(parent) = parent {
            self.unlink_name(parent, id, &old);
            if let Some(p) = self.node_mut(parent) {
                p.named.insert(name, id);
            }
        }
    }

    // --- tree --------------------------------------------------------------

    /// Append `child` to `parent`'s children, detaching it from any previous
    /// parent first. Re-adding to the same parent moves it to the top.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.require(parent)?;
        self.require(child)?;
        if parent == child || self.is_ancestor(child, parent) {
            return Err(SceneError::InvalidHierarchy { parent, child });
        }
        if let Some(old) = self.parent(child) {
            self.detach(old, child);
        }
        let name = self.require(child)?.name.clone();
        if let Some(c) = self.node_mut(child) {
            c.parent = Some(parent);
        }
        if let Some(p) = self.node_mut(parent) {
            p.children.push(child);
            p.named.insert(name, child);
        }
        self.push_reorder(parent);
        Ok(())
    }

    /// Detach `child` from `parent`. Returns `false` when it was not a child.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.parent(child) != Some(parent) {
            return false;
        }
        self.detach(parent, child);
        self.push_reorder(parent);
        true
    }

    /// Detach and drop a node with its whole subtree. Dropped timelines stop
    /// ticking.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        if !self.contains(id) {
            return false;
        }
        if let Some(parent) = self.parent(id) {
            self.remove_child(parent, id);
        }
        let mut doomed = self.descendants(id);
        doomed.push(id);
        for n in doomed {
            self.updatables.remove_updatable(n);
            self.dirty.shift_remove(&n);
            if let Some(slot) = self.nodes.get_mut(n.index()) {
                *slot = None;
            }
        }
        true
    }

    fn detach(&mut self, parent: NodeId, child: NodeId) {
        let name = self.name(child).unwrap_or_default().to_string();
        if let Some(p) = self.node_mut(parent) {
            p.children.retain(|&c| c != child);
        }
        if let Some(c) = self.node_mut(child) {
            c.parent = None;
        }
        self.unlink_name(parent, child, &name);
    }

    /// Drop `name -> child` from `parent`'s lookup, falling back to the last
    /// remaining child attached under the same name.
    fn unlink_name(&mut self, parent: NodeId, child: NodeId, name: &str) {
        let fallback = self.children(parent).iter().rev().copied().find(|&c| {
            c != child && self.name(c) == Some(name)
        });
        let Some(p) = self.node_mut(parent) else {
            return;
        };
        if p.named.get(name) != Some(&child) {
            return;
        }
        match fallback {
            Some(other) => {
                p.named.insert(name.to_string(), other);
            }
            None => {
                p.named.remove(name);
            }
        }
    }

    /// Move `child` to the end of its parent's draw order.
    pub fn bring_to_top(&mut self, child: NodeId) {
        let Some(parent) = self.parent(child) else {
            return;
        };
        if let Some(p) = self.node_mut(parent) {
            p.children.retain(|&c| c != child);
            p.children.push(child);
        }
        self.push_reorder(parent);
    }

    /// Queue an event for the next drain, dropping the oldest past
    /// `Config::max_pending_events`.
    pub(crate) fn push_event(&mut self, event: SceneEvent) {
        self.events.push(event);
        let cap = self.cfg.max_pending_events;
        if self.events.len() > cap {
            let excess = self.events.len() - cap;
            trace!("scene: dropping {excess} undrained events");
            self.events.drain(..excess);
        }
    }

    fn push_reorder(&mut self, parent: NodeId) {
        let children = self.children(parent).to_vec();
        self.push_event(SceneEvent::Reordered { parent, children });
    }

    /// Whether `ancestor` is a strict ancestor of `id`.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cur = self.parent(id);
        while let Some(p) = cur {
            if p == ancestor {
                return true;
            }
            cur = self.parent(p);
        }
        false
    }

    /// First direct child named `name`, in draw order.
    pub fn child_by_name(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&c| self.name(c) == Some(name))
    }

    /// Depth-first pre-order descendants of `root`, excluding `root`.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    fn breadth_first(&self, root: NodeId, mut visit: impl FnMut(NodeId, &Node) -> bool) {
        let mut queue: VecDeque<NodeId> = self.children(root).iter().copied().collect();
        while let Some(id) = queue.pop_front() {
            let Some(node) = self.node(id) else {
                continue;
            };
            if !visit(id, node) {
                return;
            }
            queue.extend(node.children.iter().copied());
        }
    }

    /// Breadth-first search for the first descendant named `name`.
    pub fn get(&self, root: NodeId, name: &str) -> Option<NodeId> {
        let mut found = None;
        self.breadth_first(root, |id, node| {
            if node.name == name {
                found = Some(id);
                return false;
            }
            true
        });
        found
    }

    /// Every descendant named `name`, breadth-first.
    pub fn get_all(&self, root: NodeId, name: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.breadth_first(root, |id, node| {
            if node.name == name {
                found.push(id);
            }
            true
        });
        found
    }

    /// Every descendant of `kind`, breadth-first.
    pub fn get_all_of_kind(&self, root: NodeId, kind: NodeKind) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.breadth_first(root, |id, node| {
            if node.kind == kind {
                found.push(id);
            }
            true
        });
        found
    }

    // --- geometry ----------------------------------------------------------

    pub fn local_transform(&self, id: NodeId) -> Affine {
        self.node(id)
            .map(|n| n.display.local_affine())
            .unwrap_or(Affine::IDENTITY)
    }

    /// Transform from `id`'s local space to global (viewport) space.
    pub fn world_transform(&self, id: NodeId) -> Affine {
        let mut affine = Affine::IDENTITY;
        let mut cur = Some(id);
        while let Some(c) = cur {
            let Some(node) = self.node(c) else {
                break;
            };
            affine = node.display.local_affine() * affine;
            cur = node.parent;
        }
        affine
    }

    /// Map a global point into `id`'s local space.
    pub fn to_local(&self, id: NodeId, global: Point) -> Point {
        self.world_transform(id).inverse() * global
    }

    pub fn to_global(&self, id: NodeId, local: Point) -> Point {
        self.world_transform(id) * local
    }

    /// Union of own content and visible children, in `id`'s local space.
    pub fn local_bounds(&self, id: NodeId) -> Rect {
        self.content_bounds(id).unwrap_or(Rect::ZERO)
    }

    fn content_bounds(&self, id: NodeId) -> Option<Rect> {
        let node = self.node(id)?;
        let mut acc = node.size.map(Size::to_rect);
        for &c in &node.children {
            let Some(child) = self.node(c) else {
                continue;
            };
            if !child.display.visible {
                continue;
            }
            let Some(r) = self.content_bounds(c) else {
                continue;
            };
            let r = child.display.local_affine().transform_rect_bbox(r);
            acc = Some(match acc {
                Some(a) => a.union(r),
                None => r,
            });
        }
        acc
    }

    /// Displayed width in parent units. Nine-slices report their own size.
    pub fn width(&self, id: NodeId) -> f64 {
        match self.node(id) {
            Some(n) if n.kind.owns_size() => n.size.map_or(0.0, |s| s.width),
            Some(n) => n.display.scale_x * self.local_bounds(id).width(),
            None => 0.0,
        }
    }

    pub fn height(&self, id: NodeId) -> f64 {
        match self.node(id) {
            Some(n) if n.kind.owns_size() => n.size.map_or(0.0, |s| s.height),
            Some(n) => n.display.scale_y * self.local_bounds(id).height(),
            None => 0.0,
        }
    }

    /// Set the displayed width. Containers derive a new `scale_x` from their
    /// bounds and mirror it; nine-slices resize themselves.
    pub fn set_width(&mut self, id: NodeId, value: f64) {
        self.set_extent(id, value, true);
    }

    pub fn set_height(&mut self, id: NodeId, value: f64) {
        self.set_extent(id, value, false);
    }

    fn set_extent(&mut self, id: NodeId, value: f64, horizontal: bool) {
        let Some(kind) = self.kind(id) else {
            warn!("scene: set size on unknown node {id}");
            return;
        };
        if kind.owns_size() {
            if let Some(node) = self.node_mut(id) {
                let size = node.size.get_or_insert_with(Size::default);
                if horizontal {
                    size.width = value;
                } else {
                    size.height = value;
                }
            }
            self.dirty.insert(id);
            return;
        }
        let bounds = self.local_bounds(id);
        let extent = if horizontal { bounds.width() } else { bounds.height() };
        let scale = if extent != 0.0 { value / extent } else { 1.0 };
        let prop = if horizontal { Prop::ScaleX } else { Prop::ScaleY };
        self.set_prop(id, prop, scale);
    }

    // --- display setters ---------------------------------------------------

    /// Write a display property and mirror it into the node's current
    /// orientation snapshot when it has one.
    pub fn set_prop(&mut self, id: NodeId, prop: Prop, value: f64) {
        let Some(node) = self.node_mut(id) else {
            warn!("scene: set {prop:?} on unknown node {id}");
            return;
        };
        prop.set(&mut node.display, value);
        if let Some(t) = node.transform.as_mut() {
            prop.mirror(t.current_mut(), value);
        }
        self.dirty.insert(id);
    }

    /// Write a display property without touching the snapshot.
    pub fn write_prop(&mut self, id: NodeId, prop: Prop, value: f64) {
        let Some(node) = self.node_mut(id) else {
            warn!("scene: write {prop:?} on unknown node {id}");
            return;
        };
        prop.set(&mut node.display, value);
        self.dirty.insert(id);
    }

    pub fn prop(&self, id: NodeId, prop: Prop) -> Option<f64> {
        self.display(id).map(|d| prop.get(d))
    }

    pub fn set_x(&mut self, id: NodeId, v: f64) {
        self.set_prop(id, Prop::X, v);
    }
    pub fn set_y(&mut self, id: NodeId, v: f64) {
        self.set_prop(id, Prop::Y, v);
    }
    pub fn set_position(&mut self, id: NodeId, x: f64, y: f64) {
        self.set_prop(id, Prop::X, x);
        self.set_prop(id, Prop::Y, y);
    }
    pub fn set_rotation(&mut self, id: NodeId, v: f64) {
        self.set_prop(id, Prop::Rotation, v);
    }
    pub fn set_scale_x(&mut self, id: NodeId, v: f64) {
        self.set_prop(id, Prop::ScaleX, v);
    }
    pub fn set_scale_y(&mut self, id: NodeId, v: f64) {
        self.set_prop(id, Prop::ScaleY, v);
    }
    pub fn set_pivot_x(&mut self, id: NodeId, v: f64) {
        self.set_prop(id, Prop::PivotX, v);
    }
    pub fn set_pivot_y(&mut self, id: NodeId, v: f64) {
        self.set_prop(id, Prop::PivotY, v);
    }

    /// Opacity, mirrored into the snapshot.
    pub fn set_alpha(&mut self, id: NodeId, v: f64) {
        self.set_prop(id, Prop::Alpha, v);
    }

    /// Visibility, mirrored into the snapshot.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        let Some(node) = self.node_mut(id) else {
            warn!("scene: set_visible on unknown node {id}");
            return;
        };
        node.display.visible = visible;
        if let Some(t) = node.transform.as_mut() {
            t.current_mut().visible = Some(visible);
        }
        self.dirty.insert(id);
    }

    /// Visibility on the display object only.
    pub fn set_display_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(node) = self.node_mut(id) {
            node.display.visible = visible;
            self.dirty.insert(id);
        }
    }

    pub(crate) fn set_size(&mut self, id: NodeId, size: Size) {
        if let Some(node) = self.node_mut(id) {
            node.size = Some(size);
            self.dirty.insert(id);
        }
    }

    pub(crate) fn mark_dirty(&mut self, id: NodeId) {
        self.dirty.insert(id);
    }

    // --- cue point bus -----------------------------------------------------

    pub fn add_cue_point_listener(&mut self, label: impl Into<String>, callback: CueCallback<Scene>) {
        self.cue_points.add_cue_point_listener(label, callback);
    }

    pub fn remove_cue_point_listener(&mut self, label: &str, callback: &CueCallback<Scene>) -> bool {
        self.cue_points.remove_cue_point_listener(label, callback)
    }

    /// Call every listener for `event.label` with this scene. Listeners run on
    /// a snapshot of the list.
    pub fn trigger_cue_point(&mut self, event: &CuePointEvent) -> usize {
        let listeners = self.cue_points.listeners(&event.label);
        for cb in &listeners {
            cb(&mut *self, event);
        }
        listeners.len()
    }

    pub fn cue_points(&self) -> &CuePoints<Scene> {
        &self.cue_points
    }

    // --- driver ------------------------------------------------------------

    /// Host per-frame entry point. Ticks every playing timeline once when the
    /// scheduler accepts the frame.
    pub fn update(&mut self) -> bool {
        let now = self.updatables.now_ms();
        self.update_at(now)
    }

    /// Same as [`update`](Self::update) against an explicit host timestamp.
    pub fn update_at(&mut self, now_ms: f64) -> bool {
        if !self.updatables.poll_at(now_ms) {
            return false;
        }
        for id in self.updatables.snapshot() {
            // a previous consumer may have stopped or dropped this one
            if self.updatables.contains(id) {
                self.update_timeline(id);
            }
        }
        true
    }

    /// Resize the viewport: pick the orientation, fit the stage to the design
    /// resolution, then re-apply every transform-bearing node parents first.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport = Viewport::new(width, height);
        self.orientation = Orientation::from_viewport(&self.viewport);
        debug!(
            "scene: resize {width}x{height} orientation={}",
            self.orientation
        );
        if let Some(res) = self.cfg.design_resolution {
            if res.x > 0.0 && res.y > 0.0 {
                let scale = (width / res.x).min(height / res.y);
                let stage = self.stage;
                if let Some(node) = self.node_mut(stage) {
                    node.display.scale_x = scale;
                    node.display.scale_y = scale;
                    node.display.x = (width - res.x * scale) / 2.0;
                    node.display.y = (height - res.y * scale) / 2.0;
                }
                self.dirty.insert(stage);
            }
        }
        let roots: Vec<NodeId> = self
            .nodes()
            .filter(|n| n.parent.is_none())
            .map(Node::id)
            .collect();
        let orientation = self.orientation;
        for root in roots {
            let mut order = vec![root];
            order.extend(self.descendants(root));
            for id in order {
                let resizable = self
                    .node(id)
                    .is_some_and(|n| n.transform.is_some() || n.fit_to_screen);
                if resizable {
                    self.resize_node(id, orientation);
                }
            }
        }
        self.push_event(SceneEvent::Resized {
            width,
            height,
            landscape: self.orientation == Orientation::Landscape,
        });
    }

    // --- outputs -----------------------------------------------------------

    /// Take every change and event accumulated since the last drain.
    pub fn drain_outputs(&mut self) -> Outputs {
        let dirty: Vec<NodeId> = self.dirty.drain(..).collect();
        let changes = dirty
            .into_iter()
            .filter_map(|id| self.node(id).map(change_for))
            .collect();
        let events = std::mem::take(&mut self.events);
        trace!("scene: drained {} events", events.len());
        Outputs { changes, events }
    }

    /// Changes only; events stay queued.
    pub fn drain_changes(&mut self) -> Vec<Change> {
        let dirty: Vec<NodeId> = self.dirty.drain(..).collect();
        dirty
            .into_iter()
            .filter_map(|id| self.node(id).map(change_for))
            .collect()
    }

    pub fn pending_events(&self) -> &[SceneEvent] {
        &self.events
    }
}

fn change_for(node: &Node) -> Change {
    Change {
        node: node.id,
        name: node.name.clone(),
        props: node.display,
        size: node.size,
        text: node.text.as_ref().map(|t| TextChange {
            text: t.text.clone(),
            font_size: t.font_size,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn approx(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    fn scene() -> Scene {
        Scene::with_clock(Config::default(), Box::new(ManualClock::new(0.0))).unwrap()
    }

    #[test]
    fn add_child_rejects_cycles() {
        let mut s = scene();
        let a = s.create_node(NodeKind::Container, "a");
        let b = s.create_node(NodeKind::Container, "b");
        s.add_child(a, b).unwrap();
        assert_eq!(
            s.add_child(b, a),
            Err(SceneError::InvalidHierarchy { parent: b, child: a })
        );
        assert!(s.add_child(a, a).is_err());
        assert_eq!(s.add_child(a, NodeId(99)), Err(SceneError::UnknownNode(NodeId(99))));
    }

    #[test]
    fn reparenting_moves_the_name_lookup() {
        let mut s = scene();
        let a = s.create_node(NodeKind::Container, "a");
        let b = s.create_node(NodeKind::Container, "b");
        let c = s.create_node(NodeKind::Sprite, "hero");
        s.add_child(a, c).unwrap();
        assert_eq!(s.node(a).unwrap().named_child("hero"), Some(c));
        s.add_child(b, c).unwrap();
        assert_eq!(s.node(a).unwrap().named_child("hero"), None);
        assert_eq!(s.node(b).unwrap().named_child("hero"), Some(c));
        assert!(s.children(a).is_empty());
    }

    #[test]
    fn name_lookup_falls_back_after_removal() {
        let mut s = scene();
        let p = s.create_node(NodeKind::Container, "p");
        let first = s.create_node(NodeKind::Sprite, "dup");
        let second = s.create_node(NodeKind::Sprite, "dup");
        s.add_child(p, first).unwrap();
        s.add_child(p, second).unwrap();
        assert_eq!(s.node(p).unwrap().named_child("dup"), Some(second));
        assert_eq!(s.child_by_name(p, "dup"), Some(first));
        assert!(s.remove_child(p, second));
        assert_eq!(s.node(p).unwrap().named_child("dup"), Some(first));
        assert!(!s.remove_child(p, second));
    }

    #[test]
    fn rename_updates_parent_lookup() {
        let mut s = scene();
        let p = s.create_node(NodeKind::Container, "p");
        let c = s.create_node(NodeKind::Sprite, "old");
        s.add_child(p, c).unwrap();
        s.set_name(c, "new");
        assert_eq!(s.node(p).unwrap().named_child("old"), None);
        assert_eq!(s.node(p).unwrap().named_child("new"), Some(c));
    }

    #[test]
    fn breadth_first_lookups() {
        let mut s = scene();
        let root = s.stage();
        let a = s.create_node(NodeKind::Container, "a");
        let deep = s.create_node(NodeKind::Sprite, "x");
        let shallow = s.create_node(NodeKind::Sprite, "x");
        s.add_child(root, a).unwrap();
        s.add_child(a, deep).unwrap();
        s.add_child(root, shallow).unwrap();
        assert_eq!(s.get(root, "x"), Some(shallow));
        assert_eq!(s.get_all(root, "x"), vec![shallow, deep]);
        assert_eq!(s.get_all_of_kind(root, NodeKind::Sprite), vec![shallow, deep]);
        assert_eq!(s.get(root, "missing"), None);
    }

    #[test]
    fn bounds_and_width_follow_children() {
        let mut s = scene();
        let c = s.create_node(NodeKind::Container, "c");
        let sprite = s.create_sized(NodeKind::Sprite, "s", Size::new(100.0, 40.0));
        s.add_child(c, sprite).unwrap();
        s.set_x(sprite, 10.0);
        let b = s.local_bounds(c);
        assert!(approx(b.x0, 10.0, 1e-9) && approx(b.width(), 100.0, 1e-9));
        s.set_width(c, 50.0);
        assert!(approx(s.display(c).unwrap().scale_x, 0.5, 1e-9));
        assert!(approx(s.width(c), 50.0, 1e-9));
        s.set_display_visible(sprite, false);
        assert_eq!(s.local_bounds(c), Rect::ZERO);
        s.set_width(c, 80.0);
        assert_eq!(s.display(c).unwrap().scale_x, 1.0);
    }

    #[test]
    fn nine_slice_width_sets_size() {
        let mut s = scene();
        let n = s.create_sized(NodeKind::NineSlice, "panel", Size::new(10.0, 10.0));
        s.set_scale_x(n, 3.0);
        s.set_width(n, 64.0);
        assert_eq!(s.width(n), 64.0);
        assert_eq!(s.display(n).unwrap().scale_x, 3.0);
    }

    #[test]
    fn to_local_inverts_world() {
        let mut s = scene();
        let parent = s.create_node(NodeKind::Container, "p");
        s.set_position(parent, 100.0, 50.0);
        s.set_scale_x(parent, 2.0);
        s.set_scale_y(parent, 2.0);
        let local = s.to_local(parent, Point::new(120.0, 70.0));
        assert!(approx(local.x, 10.0, 1e-9) && approx(local.y, 10.0, 1e-9));
        let back = s.to_global(parent, local);
        assert!(approx(back.x, 120.0, 1e-9) && approx(back.y, 70.0, 1e-9));
    }

    #[test]
    fn remove_node_drops_subtree() {
        let mut s = scene();
        let p = s.create_node(NodeKind::Container, "p");
        let c = s.create_node(NodeKind::Timeline, "t");
        s.add_child(s.stage(), p).unwrap();
        s.add_child(p, c).unwrap();
        s.play(c);
        assert!(s.remove_node(p));
        assert!(!s.contains(c));
        assert!(!s.updatables().contains(c));
        assert!(s.children(s.stage()).is_empty());
        assert!(!s.remove_node(p));
    }

    #[test]
    fn drain_outputs_reports_each_dirty_node_once() {
        let mut s = scene();
        s.drain_outputs();
        let n = s.create_node(NodeKind::Sprite, "s");
        s.set_x(n, 1.0);
        s.set_x(n, 2.0);
        let out = s.drain_outputs();
        assert_eq!(out.changes.len(), 1);
        assert_eq!(out.changes[0].props.x, 2.0);
        assert!(s.drain_outputs().is_empty());
    }
}

//! Dual-orientation transform model.
//!
//! A node without a [`TransformComponent`] has no transform set and ignores
//! `apply_transform`. `set_instance_data` installs one, selecting the current
//! orientation snapshot. A resize swaps the selector (hard cut, no blending)
//! and re-applies. While fit-to-screen is on, applying a transform stretches
//! the node over the viewport instead.

use kurbo::Point;
use log::{debug, trace, warn};

use crate::ids::NodeId;
use crate::node::NodeKind;
use crate::orientation::{InstanceAttrs, InstanceData, Orientation, OrientationData};
use crate::scene::Scene;
use crate::text::TextFit;
use crate::Result;

#[derive(Clone, Debug, PartialEq)]
pub struct TransformComponent {
    pub portrait: OrientationData,
    pub landscape: OrientationData,
    pub current: Orientation,
    /// Cleared nodes keep their live display values across resizes.
    pub resizeable: bool,
    pub(crate) instance_name: String,
    pub(crate) attrs: Option<InstanceAttrs>,
}

impl TransformComponent {
    pub fn new(data: InstanceData, current: Orientation) -> Self {
        Self {
            portrait: data.portrait,
            landscape: data.landscape,
            current,
            resizeable: true,
            instance_name: data.instance_name,
            attrs: data.attrs,
        }
    }

    pub fn snapshot(&self, orientation: Orientation) -> &OrientationData {
        match orientation {
            Orientation::Portrait => &self.portrait,
            Orientation::Landscape => &self.landscape,
        }
    }

    pub fn current(&self) -> &OrientationData {
        self.snapshot(self.current)
    }

    pub fn current_mut(&mut self) -> &mut OrientationData {
        match self.current {
            Orientation::Portrait => &mut self.portrait,
            Orientation::Landscape => &mut self.landscape,
        }
    }

    /// The instance data as it stands now, snapshots included.
    pub fn props(&self) -> InstanceData {
        InstanceData {
            portrait: self.portrait.clone(),
            landscape: self.landscape.clone(),
            instance_name: self.instance_name.clone(),
            attrs: self.attrs.clone(),
        }
    }
}

impl Scene {
    /// Install both orientation snapshots, select `orientation`, apply it,
    /// take the instance name and honour the `fitToScreen` attribute.
    pub fn set_instance_data(
        &mut self,
        id: NodeId,
        data: InstanceData,
        orientation: Orientation,
    ) -> Result<()> {
        self.require(id)?;
        let name = data.instance_name.clone();
        let fit = data.fit_to_screen();
        if let Some(node) = self.node_mut(id) {
            let resizeable = node.transform.as_ref().map_or(true, |t| t.resizeable);
            let mut transform = TransformComponent::new(data, orientation);
            transform.resizeable = resizeable;
            node.transform = Some(transform);
        }
        self.apply_transform(id);
        if !name.is_empty() {
            self.set_name(id, name);
        }
        if let Some(fit) = fit {
            self.set_fit_to_screen(id, fit);
        }
        self.capture_text_metrics(id);
        Ok(())
    }

    /// Retained instance data of a node, if any was applied.
    pub fn props(&self, id: NodeId) -> Option<InstanceData> {
        self.node(id)?.transform.as_ref().map(TransformComponent::props)
    }

    pub fn is_anchored(&self, id: NodeId) -> bool {
        self.node(id)
            .and_then(|n| n.transform.as_ref())
            .is_some_and(|t| t.current().is_anchored)
    }

    pub fn set_resizeable(&mut self, id: NodeId, resizeable: bool) {
        if let Some(t) = self.node_mut(id).and_then(|n| n.transform.as_mut()) {
            t.resizeable = resizeable;
        }
    }

    /// Copy the current snapshot onto the display object, then resolve the
    /// anchor.
    ///
    /// Skipped while the parent timeline is past frame 0, so playback owns the
    /// children it animates.
    pub fn apply_transform(&mut self, id: NodeId) {
        let Some(node) = self.node(id) else {
            warn!("transform: apply on unknown node {id}");
            return;
        };
        if node.fit_to_screen {
            self.execute_fit_to_screen(id);
            return;
        }
        let Some(t) = node.transform.as_ref() else {
            return;
        };
        if !t.resizeable {
            return;
        }
        let parent_frame = node
            .parent
            .and_then(|p| self.node(p))
            .and_then(|p| p.timeline.as_ref())
            .map_or(0, |tl| tl.current_frame());
        if parent_frame > 0 {
            trace!("transform: {id} skipped, parent timeline at frame {parent_frame}");
            return;
        }
        let snap = t.current().clone();
        let owns_size = node.kind.owns_size();

        if let Some(node) = self.node_mut(id) {
            let (sx, sy) = snap.effective_scale();
            let d = &mut node.display;
            d.x = snap.x;
            d.y = snap.y;
            d.rotation = snap.rotation;
            d.alpha = snap.alpha;
            d.scale_x = sx;
            d.scale_y = sy;
            d.pivot_x = snap.pivot_x;
            d.pivot_y = snap.pivot_y;
            d.visible = snap.is_visible();
            if owns_size {
                let size = node.size.get_or_insert_with(Default::default);
                if let Some(w) = snap.width {
                    size.width = w;
                }
                if let Some(h) = snap.height {
                    size.height = h;
                }
            }
        }
        self.mark_dirty(id);
        self.apply_anchor(id);
    }

    /// Place an anchored node at its viewport-percentage point, converted
    /// into the parent's space. No-op when not anchored or detached.
    pub fn apply_anchor(&mut self, id: NodeId) {
        let Some(node) = self.node(id) else {
            return;
        };
        let (Some(t), Some(parent)) = (node.transform.as_ref(), node.parent) else {
            return;
        };
        let Some((gx, gy)) = t.current().anchor_point(&self.viewport) else {
            return;
        };
        let local = self.to_local(parent, Point::new(gx, gy));
        self.set_x(id, local.x);
        self.set_y(id, local.y);
    }

    /// Switch to `orientation`'s snapshot and re-apply.
    pub fn resize_node(&mut self, id: NodeId, orientation: Orientation) {
        if let Some(t) = self.node_mut(id).and_then(|n| n.transform.as_mut()) {
            t.current = orientation;
        }
        self.apply_transform(id);
    }

    /// Enabling stretches the node immediately; disabling re-applies the
    /// current snapshot.
    pub fn set_fit_to_screen(&mut self, id: NodeId, fit: bool) {
        let Some(node) = self.node_mut(id) else {
            warn!("transform: fit_to_screen on unknown node {id}");
            return;
        };
        node.fit_to_screen = fit;
        if fit {
            self.execute_fit_to_screen(id);
        } else {
            self.apply_transform(id);
        }
    }

    pub fn fit_to_screen(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|n| n.fit_to_screen)
    }

    /// Stretch the node, or its first child when that child is a nine-slice,
    /// over the whole viewport. The pivot is reset to the top-left.
    ///
    /// Landscape viewports match the width and copy `scale_x` into `scale_y`;
    /// portrait viewports match the height and copy the other way. The node is
    /// then centered. Nodes without children or without a parent are left
    /// alone.
    pub fn execute_fit_to_screen(&mut self, id: NodeId) {
        let Some(node) = self.node(id) else {
            return;
        };
        let (Some(&first), Some(parent)) = (node.children.first(), node.parent) else {
            return;
        };
        let vp = self.viewport;
        debug!("transform: fit {id} to {}x{}", vp.width, vp.height);

        self.set_pivot_x(id, 0.0);
        self.set_pivot_y(id, 0.0);
        let origin = self.to_local(parent, Point::ZERO);
        self.set_x(id, origin.x);
        self.set_y(id, origin.y);

        if self.kind(first) == Some(NodeKind::NineSlice) {
            let corner = self.to_local(parent, Point::new(vp.width, vp.height));
            self.set_width(first, corner.x - origin.x);
            self.set_height(first, corner.y - origin.y);
            return;
        }

        if vp.is_landscape() {
            let right = self.to_local(parent, Point::new(vp.width, 0.0));
            self.set_width(id, right.x - origin.x);
            let sx = self.display(id).map_or(1.0, |d| d.scale_x);
            self.set_scale_y(id, sx);
        } else {
            let bottom = self.to_local(parent, Point::new(0.0, vp.height));
            self.set_height(id, bottom.y - origin.y);
            let sy = self.display(id).map_or(1.0, |d| d.scale_y);
            self.set_scale_x(id, sy);
        }
        let mid = self.to_local(parent, Point::new(vp.width / 2.0, vp.height / 2.0));
        let (w, h) = (self.width(id), self.height(id));
        self.set_x(id, mid.x - w / 2.0);
        self.set_y(id, mid.y - h / 2.0);
    }

    /// Record the text field's current box and font size as the reference
    /// for shrink-to-fit. Fixed-box mode starts off.
    pub fn capture_text_metrics(&mut self, id: NodeId) {
        let Some(tf) = self.text_field(id) else {
            return;
        };
        let fit = TextFit {
            fixed_box_size: false,
            original_width: Some(self.width(tf)),
            original_height: Some(self.height(tf)),
            original_font_size: self.node(tf).and_then(|n| n.text.as_ref()).map(|t| t.font_size),
        };
        if let Some(node) = self.node_mut(id) {
            node.text_fit = Some(fit);
        }
    }
}

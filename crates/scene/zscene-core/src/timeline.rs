//! Frame-indexed timeline playback.
//!
//! A timeline snaps named children to sparse per-frame entries; there is no
//! interpolation between frames. Playing means being registered with the
//! scene's scheduler, so each accepted tick runs [`Scene::update_timeline`]:
//! apply the current frame, fire its cue label, advance, then wrap or stop
//! past the last frame. Frame indices run over `0..=total_frames`.

use std::collections::BTreeMap;
use std::rc::Rc;

use indexmap::IndexMap;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::cue_points::CuePointEvent;
use crate::display::{DisplayProps, Prop};
use crate::ids::NodeId;
use crate::outputs::SceneEvent;
use crate::scene::Scene;

/// Sparse partial transform for one child at one frame. Absent fields leave
/// the child's current value alone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pivot_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
}

impl FrameEntry {
    /// Write every defined field onto `target`.
    pub fn apply_to<A: Animatable + ?Sized>(&self, target: &mut A) {
        if let Some(v) = self.x {
            target.set_x(v);
        }
        if let Some(v) = self.y {
            target.set_y(v);
        }
        if let Some(v) = self.scale_x {
            target.set_scale_x(v);
        }
        if let Some(v) = self.scale_y {
            target.set_scale_y(v);
        }
        if let Some(v) = self.rotation {
            target.set_rotation(v);
        }
        if let Some(v) = self.pivot_x {
            target.set_pivot_x(v);
        }
        if let Some(v) = self.pivot_y {
            target.set_pivot_y(v);
        }
        if let Some(v) = self.alpha {
            target.set_alpha(v);
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One child's frames. `None` entries are gaps.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameTrack(pub Vec<Option<FrameEntry>>);

impl FrameTrack {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entry at `frame`, skipping gaps and empty entries.
    pub fn get(&self, frame: u32) -> Option<FrameEntry> {
        self.0
            .get(frame as usize)
            .copied()
            .flatten()
            .filter(|e| !e.is_empty())
    }
}

impl FromIterator<Option<FrameEntry>> for FrameTrack {
    fn from_iter<I: IntoIterator<Item = Option<FrameEntry>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Child name to track, in authoring order.
pub type FrameMap = IndexMap<String, FrameTrack>;

/// Frame index to cue label; at most one label per frame.
pub type CuePointMap = BTreeMap<u32, String>;

/// Fired when playback runs past the last frame.
pub type EndCallback = Rc<dyn Fn(&mut Scene, NodeId)>;

/// Longest track length.
pub fn total_frames(frames: &FrameMap) -> u32 {
    frames.values().map(FrameTrack::len).max().unwrap_or(0) as u32
}

/// Named write target for frame entries.
pub trait Animatable {
    fn set_x(&mut self, v: f64);
    fn set_y(&mut self, v: f64);
    fn set_scale_x(&mut self, v: f64);
    fn set_scale_y(&mut self, v: f64);
    fn set_rotation(&mut self, v: f64);
    fn set_pivot_x(&mut self, v: f64);
    fn set_pivot_y(&mut self, v: f64);
    fn set_alpha(&mut self, v: f64);
}

impl Animatable for DisplayProps {
    fn set_x(&mut self, v: f64) {
        self.x = v;
    }
    fn set_y(&mut self, v: f64) {
        self.y = v;
    }
    fn set_scale_x(&mut self, v: f64) {
        self.scale_x = v;
    }
    fn set_scale_y(&mut self, v: f64) {
        self.scale_y = v;
    }
    fn set_rotation(&mut self, v: f64) {
        self.rotation = v;
    }
    fn set_pivot_x(&mut self, v: f64) {
        self.pivot_x = v;
    }
    fn set_pivot_y(&mut self, v: f64) {
        self.pivot_y = v;
    }
    fn set_alpha(&mut self, v: f64) {
        self.alpha = v;
    }
}

/// A scene node addressed for animation. Transform writes go through the
/// mirroring setters; alpha lands on the display object only.
pub struct NodeMut<'a> {
    scene: &'a mut Scene,
    id: NodeId,
}

impl NodeMut<'_> {
    pub fn id(&self) -> NodeId {
        self.id
    }
}

impl Animatable for NodeMut<'_> {
    fn set_x(&mut self, v: f64) {
        self.scene.set_prop(self.id, Prop::X, v);
    }
    fn set_y(&mut self, v: f64) {
        self.scene.set_prop(self.id, Prop::Y, v);
    }
    fn set_scale_x(&mut self, v: f64) {
        self.scene.set_prop(self.id, Prop::ScaleX, v);
    }
    fn set_scale_y(&mut self, v: f64) {
        self.scene.set_prop(self.id, Prop::ScaleY, v);
    }
    fn set_rotation(&mut self, v: f64) {
        self.scene.set_prop(self.id, Prop::Rotation, v);
    }
    fn set_pivot_x(&mut self, v: f64) {
        self.scene.set_prop(self.id, Prop::PivotX, v);
    }
    fn set_pivot_y(&mut self, v: f64) {
        self.scene.set_prop(self.id, Prop::PivotY, v);
    }
    fn set_alpha(&mut self, v: f64) {
        self.scene.write_prop(self.id, Prop::Alpha, v);
    }
}

/// Playback component of a timeline node.
pub struct Timeline {
    frames: Option<FrameMap>,
    total_frames: u32,
    current_frame: u32,
    looping: bool,
    cue_points: CuePointMap,
    on_end: Option<EndCallback>,
}

impl std::fmt::Debug for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeline")
            .field("tracks", &self.frames.as_ref().map_or(0, IndexMap::len))
            .field("total_frames", &self.total_frames)
            .field("current_frame", &self.current_frame)
            .field("looping", &self.looping)
            .field("cue_points", &self.cue_points)
            .field("on_end", &self.on_end.is_some())
            .finish()
    }
}

impl Timeline {
    pub(crate) fn new(looping: bool) -> Self {
        Self {
            frames: None,
            total_frames: 0,
            current_frame: 0,
            looping,
            cue_points: CuePointMap::new(),
            on_end: None,
        }
    }

    pub fn frames(&self) -> Option<&FrameMap> {
        self.frames.as_ref()
    }
    /// Zero until frames are set.
    #[inline]
    pub fn total_frames(&self) -> u32 {
        self.total_frames
    }
    #[inline]
    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }
    #[inline]
    pub fn is_looping(&self) -> bool {
        self.looping
    }
    pub fn cue_points(&self) -> &CuePointMap {
        &self.cue_points
    }
    pub fn has_end_listener(&self) -> bool {
        self.on_end.is_some()
    }
}

impl Scene {
    pub(crate) fn timeline_mut(&mut self, id: NodeId) -> Option<&mut Timeline> {
        self.node_mut(id).and_then(|n| n.timeline.as_mut())
    }

    pub fn timeline(&self, id: NodeId) -> Option<&Timeline> {
        self.node(id).and_then(|n| n.timeline.as_ref())
    }

    /// Mutable handle that writes frame entries onto `id`.
    pub fn animatable(&mut self, id: NodeId) -> NodeMut<'_> {
        NodeMut { scene: self, id }
    }

    /// Store frames and recompute the frame count. Does not restart playback.
    pub fn set_frames(&mut self, id: NodeId, frames: FrameMap) {
        let Some(tl) = self.timeline_mut(id) else {
            warn!("timeline: set_frames on non-timeline {id}");
            return;
        };
        tl.total_frames = total_frames(&frames);
        tl.frames = Some(frames);
        debug!("timeline: {id} frames set, total={}", tl.total_frames);
    }

    pub fn set_cue_points(&mut self, id: NodeId, cue_points: CuePointMap) {
        if let Some(tl) = self.timeline_mut(id) {
            tl.cue_points = cue_points;
        }
    }

    pub fn set_looping(&mut self, id: NodeId, looping: bool) {
        if let Some(tl) = self.timeline_mut(id) {
            tl.looping = looping;
        }
    }

    pub fn add_state_end_event_listener(&mut self, id: NodeId, callback: EndCallback) {
        if let Some(tl) = self.timeline_mut(id) {
            tl.on_end = Some(callback);
        }
    }

    pub fn remove_state_end_event_listener(&mut self, id: NodeId) {
        if let Some(tl) = self.timeline_mut(id) {
            tl.on_end = None;
        }
    }

    #[inline]
    pub fn is_playing(&self, id: NodeId) -> bool {
        self.updatables.contains(id)
    }

    /// Register with the scheduler, then play direct timeline children.
    pub fn play(&mut self, id: NodeId) {
        if self.timeline(id).is_none() {
            warn!("timeline: play on non-timeline {id}");
            return;
        }
        if self.updatables.add_updatable(id) {
            debug!("timeline: play {id}");
        }
        for child in self.children(id).to_vec() {
            if self.timeline(child).is_some() {
                self.play(child);
            }
        }
    }

    /// Unregister, then stop direct timeline children.
    pub fn stop(&mut self, id: NodeId) {
        if self.updatables.remove_updatable(id) {
            debug!("timeline: stop {id}");
        }
        for child in self.children(id).to_vec() {
            if self.timeline(child).is_some() {
                self.stop(child);
            }
        }
    }

    pub fn goto_and_play(&mut self, id: NodeId, frame: u32) {
        let Some(tl) = self.timeline_mut(id) else {
            warn!("timeline: goto_and_play on non-timeline {id}");
            return;
        };
        tl.current_frame = frame;
        self.updatables.remove_updatable(id);
        self.play(id);
    }

    /// Set the current frame and snap every tracked, attached child to its
    /// entry at that frame.
    pub fn goto_and_stop(&mut self, id: NodeId, frame: u32) {
        let Some(tl) = self.timeline_mut(id) else {
            warn!("timeline: goto_and_stop on non-timeline {id}");
            return;
        };
        tl.current_frame = frame;
        let Some(node) = self.node(id) else {
            return;
        };
        let Some(frames) = node.timeline.as_ref().and_then(|tl| tl.frames.as_ref()) else {
            return;
        };
        let writes: Vec<(NodeId, FrameEntry)> = frames
            .iter()
            .filter_map(|(name, track)| {
                let entry = track.get(frame)?;
                match node.named.get(name) {
                    Some(&target) => Some((target, entry)),
                    None => {
                        trace!("timeline: {id} has no child {name:?}");
                        None
                    }
                }
            })
            .collect();
        for (target, entry) in writes {
            entry.apply_to(&mut self.animatable(target));
        }
    }

    /// One scheduler tick of playback.
    pub fn update_timeline(&mut self, id: NodeId) {
        let Some(frame) = self.timeline(id).map(Timeline::current_frame) else {
            return;
        };
        self.goto_and_stop(id, frame);

        let label = self
            .timeline(id)
            .and_then(|tl| tl.cue_points.get(&frame).cloned());
        if let Some(label) = label {
            let event = CuePointEvent {
                timeline: id,
                timeline_name: self.name(id).unwrap_or_default().to_string(),
                label: label.clone(),
                frame,
            };
            self.push_event(SceneEvent::CuePoint {
                timeline: id,
                label,
                frame,
            });
            self.trigger_cue_point(&event);
        }

        // listeners may have dropped or rewound the timeline
        let Some(tl) = self.timeline_mut(id) else {
            return;
        };
        tl.current_frame = tl.current_frame.saturating_add(1);
        if tl.current_frame <= tl.total_frames {
            return;
        }
        let looping = tl.looping;
        let on_end = tl.on_end.clone();
        if looping {
            tl.current_frame = 0;
        } else {
            self.updatables.remove_updatable(id);
        }
        debug!("timeline: {id} reached end, looping={looping}");
        self.push_event(SceneEvent::TimelineEnded {
            timeline: id,
            looping,
        });
        if let Some(cb) = on_end {
            cb(self, id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_x(x: f64) -> Option<FrameEntry> {
        Some(FrameEntry {
            x: Some(x),
            ..FrameEntry::default()
        })
    }

    #[test]
    fn total_frames_is_longest_track() {
        let mut frames = FrameMap::new();
        frames.insert("a".into(), FrameTrack(vec![entry_x(1.0); 3]));
        frames.insert("b".into(), FrameTrack(vec![None; 7]));
        assert_eq!(total_frames(&frames), 7);
        assert_eq!(total_frames(&FrameMap::new()), 0);
    }

    #[test]
    fn gaps_and_empty_entries_read_as_absent() {
        let track: FrameTrack = vec![entry_x(1.0), None, Some(FrameEntry::default())]
            .into_iter()
            .collect();
        assert!(track.get(0).is_some());
        assert!(track.get(1).is_none());
        assert!(track.get(2).is_none());
        assert!(track.get(9).is_none());
    }

    #[test]
    fn apply_to_writes_only_defined_fields() {
        let mut props = DisplayProps {
            y: 7.0,
            ..DisplayProps::default()
        };
        let entry = FrameEntry {
            x: Some(3.0),
            alpha: Some(0.25),
            ..FrameEntry::default()
        };
        entry.apply_to(&mut props);
        assert_eq!((props.x, props.y, props.alpha), (3.0, 7.0, 0.25));
    }

    #[test]
    fn track_parses_editor_json_with_nulls() {
        let track: FrameTrack = serde_json::from_str(
            r#"[{ "x": 1, "keyFrame": true, "easing": "none" }, null, { "scaleX": 2 }]"#,
        )
        .unwrap();
        assert_eq!(track.len(), 3);
        assert_eq!(track.get(0).unwrap().x, Some(1.0));
        assert_eq!(track.get(2).unwrap().scale_x, Some(2.0));
    }

    #[test]
    fn last_representable_frame_ends_the_track() {
        use crate::clock::ManualClock;
        use crate::config::Config;
        use crate::node::NodeKind;

        let clock = ManualClock::new(0.0);
        let mut s = Scene::with_clock(Config::default(), Box::new(clock.clone())).unwrap();
        let tl = s.create_node(NodeKind::Timeline, "tl");
        s.goto_and_play(tl, u32::MAX);
        clock.advance(20.0);
        assert!(s.update());
        // looping by default: wraps to the start instead of overflowing
        assert_eq!(s.timeline(tl).unwrap().current_frame(), 0);
        assert!(s.is_playing(tl));

        s.set_looping(tl, false);
        s.goto_and_play(tl, u32::MAX);
        clock.advance(20.0);
        assert!(s.update());
        assert!(!s.is_playing(tl));
        assert_eq!(s.timeline(tl).unwrap().current_frame(), u32::MAX);
    }
}

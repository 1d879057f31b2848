//! Editor scene export: resolution, templates, animation tracks and cue
//! points.
//!
//! Tracks are stored under `"<childInstanceName>_<templateName>"` so they are
//! unique across the file; a timeline looks its children up by the bare
//! instance name, which is what [`SceneData::children_frames`] keys by.

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::Resolution;
use crate::ids::NodeId;
use crate::orientation::{InstanceData, Orientation};
use crate::scene::Scene;
use crate::timeline::{CuePointMap, FrameMap, FrameTrack};
use crate::Result;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneData {
    pub resolution: Resolution,
    #[serde(default)]
    pub anim_tracks: IndexMap<String, FrameTrack>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<TemplateData>,
    #[serde(default)]
    pub templates: IndexMap<String, TemplateData>,
    /// Template name to its cue map.
    #[serde(default)]
    pub cue_points: IndexMap<String, CuePointMap>,
    #[serde(default)]
    pub fonts: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateData {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub children: Vec<ChildData>,
}

/// One placed child inside a template.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChildData {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(flatten)]
    pub instance: InstanceData,
}

pub fn parse_scene_json(json: &str) -> Result<SceneData> {
    let data: SceneData = serde_json::from_str(json)?;
    debug!(
        "scene_data: {} templates, {} tracks",
        data.templates.len(),
        data.anim_tracks.len()
    );
    Ok(data)
}

/// Key under which a template child's track is exported.
pub fn combined_track_name(child_instance_name: &str, template: &str) -> String {
    format!("{child_instance_name}_{template}")
}

impl SceneData {
    /// Frame map for a template's children, keyed by child instance name.
    /// Empty when the template is unknown or nothing in it is animated.
    pub fn children_frames(&self, template: &str) -> FrameMap {
        let mut frames = FrameMap::new();
        let Some(base) = self.templates.get(template) else {
            return frames;
        };
        for child in &base.children {
            let name = &child.instance.instance_name;
            if let Some(track) = self.anim_tracks.get(&combined_track_name(name, template)) {
                frames.insert(name.clone(), track.clone());
            }
        }
        frames
    }

    pub fn cue_points_for(&self, template: &str) -> CuePointMap {
        self.cue_points.get(template).cloned().unwrap_or_default()
    }

    /// Whether instancing `template` should produce a timeline.
    pub fn is_animated(&self, template: &str) -> bool {
        !self.children_frames(template).is_empty()
    }

    pub fn template_child(&self, template: &str, instance_name: &str) -> Option<&ChildData> {
        self.templates
            .get(template)?
            .children
            .iter()
            .find(|c| c.instance.instance_name == instance_name)
    }
}

impl Scene {
    /// Load a template's frames and cue points into a timeline and snap it to
    /// frame 0.
    pub fn load_template_timeline(&mut self, id: NodeId, data: &SceneData, template: &str) {
        self.set_frames(id, data.children_frames(template));
        self.set_cue_points(id, data.cue_points_for(template));
        self.goto_and_stop(id, 0);
    }

    /// Apply each template child's instance data to the same-named child of
    /// `id`. Returns how many children were matched.
    pub fn apply_template_instances(
        &mut self,
        id: NodeId,
        data: &SceneData,
        template: &str,
        orientation: Orientation,
    ) -> Result<usize> {
        let Some(base) = data.templates.get(template) else {
            return Ok(0);
        };
        let mut applied = 0;
        for child in &base.children {
            let Some(target) = self.child_by_name(id, &child.instance.instance_name) else {
                continue;
            };
            self.set_instance_data(target, child.instance.clone(), orientation)?;
            applied += 1;
        }
        Ok(applied)
    }
}

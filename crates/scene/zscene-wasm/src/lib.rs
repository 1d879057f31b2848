use js_sys::{Function, Object, JSON};
use log::warn;
use serde::de::DeserializeOwned;
use serde_wasm_bindgen as swb;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

use zscene_core::{
    parse_scene_json, Clock, Config, CueCallback, CuePointEvent, CuePointMap, EndCallback,
    FrameMap, InstanceData, NodeId, NodeKind, Prop, Scene, SceneData, SceneError, Size,
    TextMeasurer,
};

/// Scene playback and layout for JS hosts.
///
/// Listener callbacks run while the scene is mutably borrowed, so they must
/// not call back into this object synchronously. The same cue points and
/// timeline ends are reported as events by `drain_outputs`.
#[wasm_bindgen]
pub struct ZScene {
    core: Scene,
    data: Option<SceneData>,
    cue_listeners: Vec<(String, Function, CueCallback<Scene>)>,
}

#[derive(Debug)]
struct JsClock;

impl Clock for JsClock {
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }
}

struct JsMeasurer {
    f: Function,
}

impl TextMeasurer for JsMeasurer {
    // measure(text, fontSize) -> { width, height }
    fn measure(&self, text: &str, font_size: f64) -> Size {
        let res = self.f.call2(
            &JsValue::UNDEFINED,
            &JsValue::from_str(text),
            &JsValue::from_f64(font_size),
        );
        match res.map(swb::from_value::<Size>) {
            Ok(Ok(size)) => size,
            Ok(Err(e)) => {
                warn!("zscene-wasm: measurer returned a bad size: {e}");
                Size::default()
            }
            Err(e) => {
                warn!("zscene-wasm: measurer threw: {e:?}");
                Size::default()
            }
        }
    }
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn scene_err(context: &str, err: SceneError) -> JsError {
    JsError::new(&format!("{context}: {err}"))
}

/// Round-trip through JSON so integer-keyed maps (cue points) parse the same
/// way they do from a file.
fn from_js_json<T: DeserializeOwned>(what: &str, value: &JsValue) -> Result<T, JsError> {
    if let Some(text) = value.as_string() {
        return serde_json::from_str(&text)
            .map_err(|e| JsError::new(&format!("{what} parse error: {e}")));
    }
    let text = JSON::stringify(value)
        .map_err(|e| JsError::new(&format!("{what} stringify error: {e:?}")))?
        .as_string()
        .ok_or_else(|| JsError::new(&format!("{what}: stringify produced non-string")))?;
    serde_json::from_str(&text).map_err(|e| JsError::new(&format!("{what} parse error: {e}")))
}

fn parse_name<T: DeserializeOwned>(what: &str, name: &str) -> Result<T, JsError> {
    serde_json::from_value(serde_json::Value::String(name.to_string()))
        .map_err(|_| JsError::new(&format!("unknown {what}: {name}")))
}

#[wasm_bindgen]
impl ZScene {
    /// Create a scene. Pass a config object or undefined/null for defaults.
    ///   new ZScene({ fps: 30, design_resolution: { x: 1080, y: 1920 } })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<ZScene, JsError> {
        console_error_panic_hook::set_once();

        let cfg: Config = if jsvalue_is_undefined_or_null(&config) {
            Config::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };
        let core = Scene::with_clock(cfg, Box::new(JsClock)).map_err(|e| scene_err("config", e))?;
        Ok(ZScene {
            core,
            data: None,
            cue_listeners: Vec::new(),
        })
    }

    #[wasm_bindgen]
    pub fn stage(&self) -> u32 {
        self.core.stage().0
    }

    /// `kind` is one of container, timeline, state, nineSlice, text, sprite.
    #[wasm_bindgen(js_name = create_node)]
    pub fn create_node(&mut self, kind: String, name: String) -> Result<u32, JsError> {
        let kind: NodeKind = parse_name("node kind", &kind)?;
        Ok(self.core.create_node(kind, name).0)
    }

    #[wasm_bindgen(js_name = create_sized)]
    pub fn create_sized(
        &mut self,
        kind: String,
        name: String,
        width: f64,
        height: f64,
    ) -> Result<u32, JsError> {
        let kind: NodeKind = parse_name("node kind", &kind)?;
        Ok(self
            .core
            .create_sized(kind, name, Size::new(width, height))
            .0)
    }

    /// `measure(text, fontSize)` must return `{ width, height }`.
    #[wasm_bindgen(js_name = create_text)]
    pub fn create_text(&mut self, name: String, text: String, font_size: f64, measure: Function) -> u32 {
        let measurer = JsMeasurer { f: measure };
        self.core.create_text(name, text, font_size, &measurer).0
    }

    #[wasm_bindgen(js_name = add_child)]
    pub fn add_child(&mut self, parent: u32, child: u32) -> Result<(), JsError> {
        self.core
            .add_child(NodeId(parent), NodeId(child))
            .map_err(|e| scene_err("add_child", e))
    }

    #[wasm_bindgen(js_name = remove_node)]
    pub fn remove_node(&mut self, id: u32) -> bool {
        self.core.remove_node(NodeId(id))
    }

    #[wasm_bindgen(js_name = child_by_name)]
    pub fn child_by_name(&self, parent: u32, name: String) -> Option<u32> {
        self.core.child_by_name(NodeId(parent), &name).map(|id| id.0)
    }

    /// Breadth-first search below `root`.
    #[wasm_bindgen]
    pub fn get(&self, root: u32, name: String) -> Option<u32> {
        self.core.get(NodeId(root), &name).map(|id| id.0)
    }

    /// Apply `{ portrait, landscape, instanceName?, attrs? }` for the current
    /// orientation.
    #[wasm_bindgen(js_name = set_instance_data)]
    pub fn set_instance_data(&mut self, id: u32, data: JsValue) -> Result<(), JsError> {
        let data: InstanceData = from_js_json("instance data", &data)?;
        let orientation = self.core.orientation();
        self.core
            .set_instance_data(NodeId(id), data, orientation)
            .map_err(|e| scene_err("set_instance_data", e))
    }

    /// Load an exported scene (JSON string or object) for `apply_template`.
    #[wasm_bindgen(js_name = load_scene)]
    pub fn load_scene(&mut self, data: JsValue) -> Result<(), JsError> {
        if jsvalue_is_undefined_or_null(&data) {
            return Err(JsError::new("load_scene: data is null/undefined"));
        }
        let parsed = match data.as_string() {
            Some(text) => parse_scene_json(&text).map_err(|e| scene_err("load_scene", e))?,
            None => from_js_json("load_scene", &data)?,
        };
        self.data = Some(parsed);
        Ok(())
    }

    /// Apply a loaded template's child instance data below `id`; timelines
    /// also receive the template's frames and cue points. Returns the number
    /// of children matched.
    #[wasm_bindgen(js_name = apply_template)]
    pub fn apply_template(&mut self, id: u32, template: String) -> Result<u32, JsError> {
        let data = self
            .data
            .as_ref()
            .ok_or_else(|| JsError::new("apply_template: no scene loaded"))?;
        let id = NodeId(id);
        let orientation = self.core.orientation();
        let applied = self
            .core
            .apply_template_instances(id, data, &template, orientation)
            .map_err(|e| scene_err("apply_template", e))?;
        if self.core.timeline(id).is_some() && data.is_animated(&template) {
            self.core.load_template_timeline(id, data, &template);
        }
        Ok(applied as u32)
    }

    /// `frames` maps child names to per-frame entries (null for gaps).
    #[wasm_bindgen(js_name = set_frames)]
    pub fn set_frames(&mut self, id: u32, frames: JsValue) -> Result<(), JsError> {
        let frames: FrameMap = from_js_json("frames", &frames)?;
        self.core.set_frames(NodeId(id), frames);
        Ok(())
    }

    /// `cue_points` maps frame numbers to labels.
    #[wasm_bindgen(js_name = set_cue_points)]
    pub fn set_cue_points(&mut self, id: u32, cue_points: JsValue) -> Result<(), JsError> {
        let cues: CuePointMap = from_js_json("cue points", &cue_points)?;
        self.core.set_cue_points(NodeId(id), cues);
        Ok(())
    }

    #[wasm_bindgen(js_name = set_looping)]
    pub fn set_looping(&mut self, id: u32, looping: bool) {
        self.core.set_looping(NodeId(id), looping);
    }

    #[wasm_bindgen]
    pub fn play(&mut self, id: u32) {
        self.core.play(NodeId(id));
    }

    #[wasm_bindgen]
    pub fn stop(&mut self, id: u32) {
        self.core.stop(NodeId(id));
    }

    #[wasm_bindgen(js_name = goto_and_play)]
    pub fn goto_and_play(&mut self, id: u32, frame: u32) {
        self.core.goto_and_play(NodeId(id), frame);
    }

    #[wasm_bindgen(js_name = goto_and_stop)]
    pub fn goto_and_stop(&mut self, id: u32, frame: u32) {
        self.core.goto_and_stop(NodeId(id), frame);
    }

    #[wasm_bindgen(js_name = is_playing)]
    pub fn is_playing(&self, id: u32) -> bool {
        self.core.is_playing(NodeId(id))
    }

    #[wasm_bindgen(js_name = current_frame)]
    pub fn current_frame(&self, id: u32) -> Option<u32> {
        self.core.timeline(NodeId(id)).map(|tl| tl.current_frame())
    }

    /// `callback(timelineId)` runs each time the timeline passes its end.
    /// Replaces any previous end listener.
    #[wasm_bindgen(js_name = add_state_end_event_listener)]
    pub fn add_state_end_event_listener(&mut self, id: u32, callback: Function) {
        let cb: EndCallback = Rc::new(move |_: &mut Scene, timeline: NodeId| {
            if let Err(e) = callback.call1(&JsValue::UNDEFINED, &JsValue::from(timeline.0)) {
                warn!("zscene-wasm: end listener threw: {e:?}");
            }
        });
        self.core.add_state_end_event_listener(NodeId(id), cb);
    }

    #[wasm_bindgen(js_name = remove_state_end_event_listener)]
    pub fn remove_state_end_event_listener(&mut self, id: u32) {
        self.core.remove_state_end_event_listener(NodeId(id));
    }

    /// `callback({ timeline, timelineName, label, frame })` runs whenever any
    /// timeline reaches a cue with this label.
    #[wasm_bindgen(js_name = add_cue_point_listener)]
    pub fn add_cue_point_listener(&mut self, label: String, callback: Function) {
        let js = callback.clone();
        let cb: CueCallback<Scene> = Rc::new(move |_: &mut Scene, event: &CuePointEvent| {
            let arg = match swb::to_value(event) {
                Ok(v) => v,
                Err(e) => {
                    warn!("zscene-wasm: cue event error: {e}");
                    return;
                }
            };
            if let Err(e) = js.call1(&JsValue::UNDEFINED, &arg) {
                warn!("zscene-wasm: cue listener threw: {e:?}");
            }
        });
        self.core.add_cue_point_listener(label.clone(), cb.clone());
        self.cue_listeners.push((label, callback, cb));
    }

    /// Remove one registration of `callback` under `label`.
    #[wasm_bindgen(js_name = remove_cue_point_listener)]
    pub fn remove_cue_point_listener(&mut self, label: String, callback: Function) -> bool {
        let Some(pos) = self
            .cue_listeners
            .iter()
            .position(|(l, f, _)| *l == label && Object::is(f, &callback))
        else {
            return false;
        };
        let (_, _, cb) = self.cue_listeners.remove(pos);
        self.core.remove_cue_point_listener(&label, &cb)
    }

    /// Show the named child of a state node. Returns the chosen child.
    #[wasm_bindgen(js_name = set_state)]
    pub fn set_state(&mut self, id: u32, name: String) -> Option<u32> {
        self.core.set_state(NodeId(id), &name).map(|c| c.0)
    }

    #[wasm_bindgen(js_name = get_current_state)]
    pub fn get_current_state(&self, id: u32) -> Option<u32> {
        self.core.get_current_state(NodeId(id)).map(|c| c.0)
    }

    /// `prop` is one of x, y, rotation, scaleX, scaleY, pivotX, pivotY, alpha.
    #[wasm_bindgen(js_name = set_prop)]
    pub fn set_prop(&mut self, id: u32, prop: String, value: f64) -> Result<(), JsError> {
        let prop: Prop = parse_name("prop", &prop)?;
        self.core.set_prop(NodeId(id), prop, value);
        Ok(())
    }

    #[wasm_bindgen(js_name = set_visible)]
    pub fn set_visible(&mut self, id: u32, visible: bool) {
        self.core.set_visible(NodeId(id), visible);
    }

    #[wasm_bindgen(js_name = set_fit_to_screen)]
    pub fn set_fit_to_screen(&mut self, id: u32, fit: bool) {
        self.core.set_fit_to_screen(NodeId(id), fit);
    }

    #[wasm_bindgen(js_name = set_fixed_box_size)]
    pub fn set_fixed_box_size(&mut self, id: u32, fixed: bool) {
        self.core.set_fixed_box_size(NodeId(id), fixed);
    }

    #[wasm_bindgen(js_name = set_text)]
    pub fn set_text(&mut self, id: u32, text: String, measure: Function) {
        let measurer = JsMeasurer { f: measure };
        self.core.set_text(NodeId(id), &text, &measurer);
    }

    /// Report a new viewport size; re-lays out every transform node.
    #[wasm_bindgen]
    pub fn resize(&mut self, width: f64, height: f64) {
        self.core.resize(width, height);
    }

    #[wasm_bindgen(js_name = set_fps)]
    pub fn set_fps(&mut self, fps: f64) -> Result<(), JsError> {
        self.core.set_fps(fps).map_err(|e| scene_err("set_fps", e))
    }

    /// Call once per host frame. Returns whether a tick ran.
    #[wasm_bindgen]
    pub fn update(&mut self) -> bool {
        self.core.update()
    }

    /// Same as `update` with an explicit timestamp in milliseconds.
    #[wasm_bindgen(js_name = update_at)]
    pub fn update_at(&mut self, now_ms: f64) -> bool {
        self.core.update_at(now_ms)
    }

    /// Returns `{ changes, events }` accumulated since the last drain.
    #[wasm_bindgen(js_name = drain_outputs)]
    pub fn drain_outputs(&mut self) -> Result<JsValue, JsError> {
        let out = self.core.drain_outputs();
        swb::to_value(&out).map_err(|e| JsError::new(&format!("outputs error: {e}")))
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}

#![cfg(target_arch = "wasm32")]
use js_sys::{Array, Function, Reflect};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;
use zscene_wasm::{abi_version, ZScene};

wasm_bindgen_test_configure!(run_in_browser);

fn get(obj: &JsValue, key: &str) -> JsValue {
    Reflect::get(obj, &JsValue::from_str(key)).unwrap()
}

#[wasm_bindgen_test]
fn abi_is_1() {
    assert_eq!(abi_version(), 1);
}

#[wasm_bindgen_test]
fn construct_with_defaults() {
    assert!(ZScene::new(JsValue::UNDEFINED).is_ok());
}

#[wasm_bindgen_test]
fn unknown_kind_is_rejected() {
    let mut scene = ZScene::new(JsValue::NULL).unwrap();
    assert!(scene.create_node("widget".into(), "w".into()).is_err());
}

#[wasm_bindgen_test]
fn frames_and_cues_drive_outputs() {
    let mut scene = ZScene::new(JsValue::NULL).unwrap();
    let tl = scene.create_node("timeline".into(), "tl".into()).unwrap();
    let dot = scene.create_node("sprite".into(), "dot".into()).unwrap();
    scene.add_child(scene.stage(), tl).unwrap();
    scene.add_child(tl, dot).unwrap();

    scene
        .set_frames(tl, JsValue::from_str(r#"{ "dot": [ { "x": 1 }, null, { "x": 3 } ] }"#))
        .unwrap();
    scene
        .set_cue_points(tl, JsValue::from_str(r#"{ "1": "mid" }"#))
        .unwrap();
    scene.set_looping(tl, false);

    let hits = Array::new();
    let sink = hits.clone();
    let listener = Function::new_with_args("e", "this.push(e.label);").bind(&sink);
    scene.add_cue_point_listener("mid".into(), listener.clone());
    scene.play(tl);

    // the scheduler baseline is the wall clock at construction
    let mut now = js_sys::Date::now() + 1_000.0;
    for _ in 0..4 {
        now += 20.0;
        assert!(scene.update_at(now));
    }
    assert_eq!(hits.length(), 1);
    assert!(!scene.is_playing(tl));
    assert!(scene.remove_cue_point_listener("mid".into(), listener.clone()));
    assert!(!scene.remove_cue_point_listener("mid".into(), listener));

    let out = scene.drain_outputs().unwrap();
    let changes = Array::from(&get(&out, "changes"));
    let events = Array::from(&get(&out, "events"));
    assert!(changes.length() > 0);
    let kinds: Vec<String> = events
        .iter()
        .filter_map(|e| get(&e, "type").as_string())
        .collect();
    assert!(kinds.iter().any(|k| k == "cuePoint"));
    assert!(kinds.iter().any(|k| k == "timelineEnded"));
}

#[wasm_bindgen_test]
fn state_switch_reports_the_chosen_child() {
    let mut scene = ZScene::new(JsValue::NULL).unwrap();
    let st = scene.create_node("state".into(), "st".into()).unwrap();
    let idle = scene.create_node("container".into(), "idle".into()).unwrap();
    let win = scene.create_node("timeline".into(), "win".into()).unwrap();
    scene.add_child(st, idle).unwrap();
    scene.add_child(st, win).unwrap();
    assert_eq!(scene.set_state(st, "win".into()), Some(win));
    assert!(scene.is_playing(win));
    assert_eq!(scene.set_state(st, "nope".into()), Some(idle));
    assert_eq!(scene.get_current_state(st), Some(idle));
}

#[wasm_bindgen_test]
fn get_prefers_the_shallowest_match() {
    let mut scene = ZScene::new(JsValue::NULL).unwrap();
    let root = scene.stage();
    let a = scene.create_node("container".into(), "a".into()).unwrap();
    let deep = scene.create_node("sprite".into(), "x".into()).unwrap();
    let shallow = scene.create_node("sprite".into(), "x".into()).unwrap();
    scene.add_child(root, a).unwrap();
    scene.add_child(a, deep).unwrap();
    scene.add_child(root, shallow).unwrap();
    assert_eq!(scene.get(root, "x".into()), Some(shallow));
}

use zscene_core::clock::ManualClock;
use zscene_core::config::Config;
use zscene_core::ids::NodeId;
use zscene_core::node::NodeKind;
use zscene_core::orientation::{InstanceData, Orientation};
use zscene_core::outputs::SceneEvent;
use zscene_core::scene::Scene;

fn scene() -> Scene {
    Scene::with_clock(Config::default(), Box::new(ManualClock::new(0.0))).unwrap()
}

struct Machine {
    state: NodeId,
    idle: NodeId,
    win: NodeId,
    lose: NodeId,
    lose_inner: NodeId,
}

fn machine(s: &mut Scene) -> Machine {
    let state = s.create_node(NodeKind::State, "result");
    let idle = s.create_node(NodeKind::Container, "idle");
    let win = s.create_node(NodeKind::Timeline, "win");
    let lose = s.create_node(NodeKind::Timeline, "lose");
    let lose_inner = s.create_node(NodeKind::Timeline, "tears");
    for child in [idle, win, lose] {
        s.add_child(state, child).unwrap();
    }
    s.add_child(lose, lose_inner).unwrap();
    Machine {
        state,
        idle,
        win,
        lose,
        lose_inner,
    }
}

fn visible_children(s: &Scene, id: NodeId) -> Vec<NodeId> {
    s.children(id)
        .iter()
        .copied()
        .filter(|&c| s.node(c).unwrap().is_visible())
        .collect()
}

#[test]
fn exactly_one_child_visible_and_only_it_plays() {
    let mut s = scene();
    let m = machine(&mut s);

    assert_eq!(s.set_state(m.state, "win"), Some(m.win));
    assert_eq!(visible_children(&s, m.state), vec![m.win]);
    assert!(s.is_playing(m.win));
    assert!(!s.is_playing(m.lose) && !s.is_playing(m.lose_inner));

    assert_eq!(s.set_state(m.state, "lose"), Some(m.lose));
    assert_eq!(visible_children(&s, m.state), vec![m.lose]);
    assert!(!s.is_playing(m.win));
    assert!(s.is_playing(m.lose) && s.is_playing(m.lose_inner));
    assert_eq!(s.get_current_state(m.state), Some(m.lose));

    assert_eq!(s.set_state(m.state, "idle"), Some(m.idle));
    assert_eq!(visible_children(&s, m.state), vec![m.idle]);
    assert!(s.updatables().is_empty());
}

#[test]
fn unknown_state_falls_back_to_idle_then_first() {
    let mut s = scene();
    let m = machine(&mut s);
    assert_eq!(s.set_state(m.state, "bogus"), Some(m.idle));
    assert_eq!(s.init_state(m.state), Some(m.idle));

    let plain = s.create_node(NodeKind::State, "plain");
    let a = s.create_node(NodeKind::Container, "a");
    let b = s.create_node(NodeKind::Container, "b");
    s.add_child(plain, a).unwrap();
    s.add_child(plain, b).unwrap();
    assert_eq!(s.set_state(plain, "bogus"), Some(a));
    assert_eq!(visible_children(&s, plain), vec![a]);
}

#[test]
fn empty_state_resolves_to_none() {
    let mut s = scene();
    let empty = s.create_node(NodeKind::State, "empty");
    assert_eq!(s.set_state(empty, "idle"), None);
    assert_eq!(s.get_current_state(empty), None);
}

#[test]
fn chosen_state_moves_to_top() {
    let mut s = scene();
    let m = machine(&mut s);
    s.set_state(m.state, "idle");
    assert_eq!(s.children(m.state), &[m.win, m.lose, m.idle]);
    assert_eq!(s.all_state_names(m.state), vec!["win", "lose", "idle"]);
    let reorders = s
        .drain_outputs()
        .events
        .into_iter()
        .filter(|e| matches!(e, SceneEvent::Reordered { parent, .. } if *parent == m.state))
        .count();
    assert!(reorders >= 1);
}

#[test]
fn has_state_checks_direct_children() {
    let mut s = scene();
    let m = machine(&mut s);
    assert!(s.has_state(m.state, "lose"));
    assert!(!s.has_state(m.state, "tears"));
}

#[test]
fn hidden_state_is_mirrored_into_its_snapshot() {
    let mut s = scene();
    let m = machine(&mut s);
    s.set_instance_data(m.win, InstanceData::default(), Orientation::Landscape)
        .unwrap();
    s.set_state(m.state, "idle");
    let t = s.node(m.win).unwrap().transform().unwrap();
    assert_eq!(t.landscape.visible, Some(false));
    // resizing keeps it hidden
    s.resize_node(m.win, Orientation::Landscape);
    assert!(!s.node(m.win).unwrap().is_visible());
}

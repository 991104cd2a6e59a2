use std::time::Duration;

use egui::Vec2;
use storygraph::{
    solve, Animator, CommunitySettings, FilterSpec, FocusSet, ForceConfig, GraphEdge, GraphNode,
    GraphSnapshot, Layout, LayoutInstruction, NarrativeStep, NavigationSettings,
    SimulationSettings, TransitionSettings,
};

#[test]
fn test_snapshot_round_trip() {
    let g = GraphSnapshot::from_json(
        r#"{
            "nodes": [
                {"id": "a", "name": "Ada", "label": "Person", "properties": {"born": "1815-12-10"}},
                {"id": "b", "name": "Babbage", "label": "Person"}
            ],
            "edges": [{"id": "ab", "type": "WORKED_WITH", "sourceId": "a", "targetId": "b"}]
        }"#,
    )
    .expect("parse snapshot");
    let json = serde_json::to_string(&g).expect("serialize snapshot");
    assert!(json.contains(r#""sourceId":"a""#));
    assert!(json.contains(r#""type":"WORKED_WITH""#));

    let back = GraphSnapshot::from_json(&json).expect("parse serialized snapshot");
    assert_eq!(back.nodes(), g.nodes());
    assert_eq!(back.edges(), g.edges());
}

#[test]
fn test_instruction_round_trip() {
    let instruction = LayoutInstruction::from_json(
        r#"{
            "x_axis": {"type": "timeline", "attribute": "born", "strength": 0.4},
            "y_axis": {"type": "category_separation", "attribute": "label",
                       "groups": {"Person": "top", "Company": 0.7}},
            "charge": -300,
            "focus_nodes": {"node_ids": ["a"], "multiplier": 3},
            "center_nodes": ["b"],
            "highlight_nodes": {"node_ids": ["a"], "color": "red"},
            "filter": {"centerNodeIds": ["a"], "maxHops": 1, "includeNeighbors": true}
        }"#,
    )
    .expect("parse instruction");
    let json = serde_json::to_value(&instruction).expect("serialize instruction");
    let back = LayoutInstruction::from_value(&json).expect("parse serialized instruction");
    assert_eq!(back, instruction);
}

#[test]
fn test_partial_settings_use_defaults() {
    let s: SimulationSettings = serde_json::from_str(r#"{"iterations": 50}"#).unwrap();
    assert_eq!(s.iterations, 50);
    assert_eq!(s.velocity_decay, SimulationSettings::default().velocity_decay);

    let c: CommunitySettings = serde_json::from_str(r#"{"min_size": 1}"#).unwrap();
    assert_eq!(c.min_size, 1);
    assert_eq!(c.internal_edge_cap, CommunitySettings::default().internal_edge_cap);

    let t: TransitionSettings = serde_json::from_str("{}").unwrap();
    assert_eq!(t.tiers, TransitionSettings::default().tiers);

    let n: NavigationSettings = serde_json::from_str(r#"{"mode": "FreeExplore"}"#).unwrap();
    assert_eq!(n.max_scale, NavigationSettings::default().max_scale);
}

#[test]
fn test_narrative_and_filter_contracts() {
    let steps: Vec<NarrativeStep> = serde_json::from_str(
        r#"[{"communityId": 2, "order": 0, "transitionText": "It begins"},
            {"communityId": 0, "order": 1}]"#,
    )
    .unwrap();
    assert_eq!(steps[0].community_id, 2);
    assert_eq!(steps[1].transition_text, "");

    let spec = FilterSpec::from_json(r#"{"centerNodeIds": ["a"]}"#).unwrap();
    assert_eq!(spec.max_hops, 2);
    assert!(!spec.include_neighbors);
}

#[test]
fn test_layout_round_trip_keeps_lookup() {
    let g = GraphSnapshot::new(
        ["n0", "n1", "n2"].map(GraphNode::new).to_vec(),
        vec![
            GraphEdge::new("a", "r", "n0", "n1"),
            GraphEdge::new("b", "r", "n1", "n2"),
        ],
    );
    let settings = SimulationSettings::default();
    let layout = solve(&g, &ForceConfig::standard(&settings), &settings);

    let json = serde_json::to_string(&layout).expect("serialize layout");
    let back: Layout = serde_json::from_str(&json).expect("parse layout");
    assert_eq!(back.nodes, layout.nodes);
    assert_eq!(back.ticks, layout.ticks);
    assert_eq!(back.position("n0"), layout.position("n0"));
    assert_eq!(back.bounds(), layout.bounds());

    let mut animator = Animator::new(back, Vec2::new(800.0, 600.0), TransitionSettings::default());
    animator.set_focus(FocusSet::nodes(["n0"]), Duration::ZERO);
    let end = animator.tick(Duration::from_secs(5));
    assert_eq!(end.opacity("n0"), 1.0);
    assert_eq!(end.opacity("n2"), 0.05);
}

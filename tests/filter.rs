use std::collections::BTreeSet;

use storygraph::{
    filter_subgraph, hop_distances, Condition, FilterSpec, GraphEdge, GraphNode, GraphSnapshot,
    Operator,
};

fn ids(g: &GraphSnapshot) -> BTreeSet<String> {
    g.nodes().iter().map(|n| n.id.clone()).collect()
}

/// Deterministic graph: a chain plus some chords, with dangling edges mixed in.
fn tangled(n: usize) -> GraphSnapshot {
    let nodes = (0..n)
        .map(|i| {
            GraphNode::new(format!("n{i}"))
                .with_label(if i % 2 == 0 { "Person" } else { "Company" })
        })
        .collect();
    let mut edges = Vec::new();
    for i in 1..n {
        edges.push(GraphEdge::new(
            format!("c{i}"),
            "chain",
            format!("n{}", i - 1),
            format!("n{i}"),
        ));
    }
    for i in 0..n {
        let j = (i * 7 + 3) % n;
        if i != j {
            edges.push(GraphEdge::new(
                format!("x{i}"),
                "chord",
                format!("n{i}"),
                format!("n{j}"),
            ));
        }
        edges.push(GraphEdge::new(
            format!("d{i}"),
            "dangling",
            format!("n{i}"),
            "nowhere",
        ));
    }
    GraphSnapshot::new(nodes, edges)
}

#[test]
fn filter_scenario_center_one_hop() {
    let g = GraphSnapshot::from_json(
        r#"{
            "nodes": [
                {"id": "A", "name": "A", "label": "X"},
                {"id": "B", "name": "B", "label": "X"},
                {"id": "C", "name": "C", "label": "X"},
                {"id": "D", "name": "D", "label": "X"}
            ],
            "edges": [
                {"id": "A-B", "type": "r", "sourceId": "A", "targetId": "B"},
                {"id": "B-C", "type": "r", "sourceId": "B", "targetId": "C"}
            ]
        }"#,
    )
    .unwrap();
    let spec = FilterSpec::from_json(r#"{"centerNodeIds": ["A"], "maxHops": 1}"#).unwrap();

    let out = filter_subgraph(&g, &spec);

    assert_eq!(ids(&out), BTreeSet::from(["A".to_string(), "B".to_string()]));
    assert_eq!(out.edge_count(), 1);
    assert_eq!(out.edges()[0].id, "A-B");
}

#[test]
fn no_filtered_edge_dangles() {
    let g = tangled(40);
    let specs = [
        FilterSpec::around(["n0"], 1),
        FilterSpec::around(["n5", "n30"], 3),
        FilterSpec::around(["n7"], 2).with_neighbors(true),
        FilterSpec::around(["n1"], 4).with_condition(Condition::leaf(
            "label",
            Operator::Equals,
            "Person",
        )),
        FilterSpec::from_json(r#"{"condition": {"field": "label", "operator": "equals", "value": "Company"}}"#)
            .unwrap(),
    ];
    for spec in &specs {
        let out = filter_subgraph(&g, spec);
        let present = ids(&out);
        for e in out.edges() {
            assert!(present.contains(&e.source_id), "{spec:?}: {} dangles", e.id);
            assert!(present.contains(&e.target_id), "{spec:?}: {} dangles", e.id);
        }
    }
}

#[test]
fn returned_nodes_are_within_max_hops() {
    let g = tangled(60);
    let adj = g.adjacency();
    for seed in [0usize, 13, 42] {
        for k in 0..4 {
            let seed_id = format!("n{seed}");
            let out = filter_subgraph(&g, &FilterSpec::around([seed_id.as_str()], k));
            let dist = hop_distances(&adj, seed, usize::MAX);

            assert!(out.node(&seed_id).is_some(), "seed {seed_id} missing for k={k}");
            for n in out.nodes() {
                let i = g.node_index(&n.id).unwrap();
                let d = dist[i].expect("returned node is reachable");
                assert!(d <= k, "{} at distance {d} > {k}", n.id);
            }
        }
    }
}

#[test]
fn condition_on_missing_field_excludes() {
    let g = tangled(10);
    let spec = FilterSpec {
        center_node_ids: None,
        max_hops: 2,
        condition: Some(Condition::leaf("properties.missing", Operator::Equals, 1)),
        include_neighbors: false,
    };
    assert!(filter_subgraph(&g, &spec).is_empty());
}

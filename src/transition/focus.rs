use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{layouts::Layout, settings::OpacityTiers};

/// Nodes and edges the viewer is looking at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSet {
    #[serde(default)]
    pub node_ids: Vec<String>,
    #[serde(default)]
    pub edge_ids: Vec<String>,
}

impl FocusSet {
    pub fn nodes<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            node_ids: ids.into_iter().map(Into::into).collect(),
            edge_ids: Vec::new(),
        }
    }

    pub fn with_edges<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.edge_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.node_ids.is_empty() && self.edge_ids.is_empty()
    }
}

/// Step of a scroll-driven story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: String,
    #[serde(default)]
    pub node_ids: Vec<String>,
    #[serde(default)]
    pub edge_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community_title: Option<String>,
}

impl From<&Segment> for FocusSet {
    fn from(segment: &Segment) -> Self {
        Self {
            node_ids: segment.node_ids.clone(),
            edge_ids: segment.edge_ids.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    Focus,
    Neighbor,
    Rest,
}

impl Tier {
    pub fn opacity(self, tiers: &OpacityTiers) -> f32 {
        match self {
            Self::Focus => tiers.focus,
            Self::Neighbor => tiers.neighbor,
            Self::Rest => tiers.rest,
        }
    }
}

/// How a node takes part in the focus edges of a transition target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FadeRole {
    /// Not an endpoint of any focus edge.
    Plain,
    SourceOnly,
    TargetOnly,
    Both,
}

/// Focus membership resolved against a layout.
#[derive(Debug, Clone, Default)]
pub(crate) struct Resolved {
    pub focus: HashSet<String>,
    pub roles: HashMap<String, FadeRole>,
}

impl Resolved {
    /// Focus nodes are the listed nodes plus the endpoints of the listed
    /// edges. Ids missing from the layout are dropped.
    pub fn new(focus: &FocusSet, layout: &Layout) -> Self {
        let mut nodes: HashSet<String> = focus
            .node_ids
            .iter()
            .filter(|id| layout.position(id).is_some())
            .cloned()
            .collect();
        let mut is_source = HashSet::new();
        let mut is_target = HashSet::new();
        let edges: HashSet<&str> = focus.edge_ids.iter().map(String::as_str).collect();
        for e in layout.edges.iter().filter(|e| edges.contains(e.id.as_str())) {
            let source = &layout.nodes[e.source].id;
            let target = &layout.nodes[e.target].id;
            nodes.insert(source.clone());
            nodes.insert(target.clone());
            is_source.insert(source.clone());
            is_target.insert(target.clone());
        }

        let roles = nodes
            .iter()
            .map(|id| {
                let role = match (is_source.contains(id), is_target.contains(id)) {
                    (true, true) => FadeRole::Both,
                    (true, false) => FadeRole::SourceOnly,
                    (false, true) => FadeRole::TargetOnly,
                    (false, false) => FadeRole::Plain,
                };
                (id.clone(), role)
            })
            .collect();
        Self {
            focus: nodes,
            roles,
        }
    }

    #[cfg(test)]
    pub fn role(&self, id: &str) -> FadeRole {
        self.roles.get(id).copied().unwrap_or(FadeRole::Plain)
    }
}

/// Tier of every layout node. Without any focus every node is in focus.
pub(crate) fn classify(resolved: &Resolved, layout: &Layout) -> HashMap<String, Tier> {
    if resolved.focus.is_empty() {
        return layout
            .nodes
            .iter()
            .map(|n| (n.id.clone(), Tier::Focus))
            .collect();
    }
    let mut tiers: HashMap<String, Tier> = layout
        .nodes
        .iter()
        .map(|n| {
            let tier = if resolved.focus.contains(&n.id) {
                Tier::Focus
            } else {
                Tier::Rest
            };
            (n.id.clone(), tier)
        })
        .collect();
    for e in &layout.edges {
        let source = &layout.nodes[e.source].id;
        let target = &layout.nodes[e.target].id;
        for (a, b) in [(source, target), (target, source)] {
            if resolved.focus.contains(a) {
                if let Some(tier @ Tier::Rest) = tiers.get_mut(b) {
                    *tier = Tier::Neighbor;
                }
            }
        }
    }
    tiers
}

#[cfg(test)]
mod tests {
    use egui::Pos2;

    use super::*;
    use crate::layouts::force_directed::{PositionedEdge, PositionedNode};

    fn chain() -> Layout {
        let nodes = ["a", "b", "c", "d"]
            .iter()
            .enumerate()
            .map(|(i, id)| PositionedNode {
                id: (*id).to_string(),
                position: Pos2::new(i as f32 * 10.0, 0.0),
            })
            .collect();
        let edges = vec![
            PositionedEdge {
                id: "ab".into(),
                source: 0,
                target: 1,
            },
            PositionedEdge {
                id: "bc".into(),
                source: 1,
                target: 2,
            },
            PositionedEdge {
                id: "cd".into(),
                source: 2,
                target: 3,
            },
        ];
        Layout::new(nodes, edges, 0)
    }

    #[test]
    fn tiers_follow_hops() {
        let layout = chain();
        let tiers = classify(&Resolved::new(&FocusSet::nodes(["a"]), &layout), &layout);
        assert_eq!(tiers["a"], Tier::Focus);
        assert_eq!(tiers["b"], Tier::Neighbor);
        assert_eq!(tiers["c"], Tier::Rest);
        assert_eq!(tiers["d"], Tier::Rest);
    }

    #[test]
    fn empty_focus_shows_everything() {
        let layout = chain();
        let tiers = classify(&Resolved::new(&FocusSet::default(), &layout), &layout);
        assert!(tiers.values().all(|t| *t == Tier::Focus));
    }

    #[test]
    fn edge_endpoints_get_roles() {
        let layout = chain();
        let focus = FocusSet::default().with_edges(["ab", "bc"]);
        let resolved = Resolved::new(&focus, &layout);
        assert_eq!(resolved.role("a"), FadeRole::SourceOnly);
        assert_eq!(resolved.role("b"), FadeRole::Both);
        assert_eq!(resolved.role("c"), FadeRole::TargetOnly);
        assert_eq!(resolved.role("d"), FadeRole::Plain);
        assert!(resolved.focus.contains("c"));
    }

    #[test]
    fn unknown_ids_are_dropped() {
        let layout = chain();
        let resolved = Resolved::new(&FocusSet::nodes(["ghost", "a"]), &layout);
        assert_eq!(resolved.focus.len(), 1);
    }

    #[test]
    fn segment_becomes_focus_set() {
        let segment: Segment = serde_json::from_str(
            r#"{"id": "s1", "nodeIds": ["a"], "edgeIds": ["ab"], "communityTitle": "Founders"}"#,
        )
        .unwrap();
        let focus = FocusSet::from(&segment);
        assert_eq!(focus.node_ids, vec!["a".to_string()]);
        assert_eq!(focus.edge_ids, vec!["ab".to_string()]);
    }
}

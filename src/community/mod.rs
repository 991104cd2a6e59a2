mod louvain;
mod nested;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use egui::Pos2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use louvain::detect;
pub use nested::{community_anchors, nested_layout, DetailNode, NestedLayout};

use crate::{graph::GraphSnapshot, settings::CommunitySettings, Result};

pub type CommunityId = usize;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommunityError {
    #[error("edge weights are not finite")]
    NonFiniteWeight,
    #[error("modularity became non-finite")]
    NonFiniteModularity,
}

/// Total, disjoint assignment of node ids to communities.
///
/// Community ids are dense, ordered by size (largest first) and then by the
/// position of their first member in the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    assignment: HashMap<String, CommunityId>,
    members: Vec<Vec<String>>,
    modularity: f64,
}

impl Partition {
    pub(crate) fn from_membership(g: &GraphSnapshot, membership: &[usize], modularity: f64) -> Self {
        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (node, &c) in membership.iter().enumerate() {
            groups.entry(c).or_default().push(node);
        }
        let mut groups: Vec<Vec<usize>> = groups.into_values().collect();
        groups.sort_by(|a, b| b.len().cmp(&a.len()).then(a[0].cmp(&b[0])));

        let mut assignment = HashMap::with_capacity(membership.len());
        let members = groups
            .into_iter()
            .enumerate()
            .map(|(cid, nodes)| {
                nodes
                    .into_iter()
                    .map(|i| {
                        let id = g.nodes()[i].id.clone();
                        assignment.insert(id.clone(), cid);
                        id
                    })
                    .collect()
            })
            .collect();
        Self {
            assignment,
            members,
            modularity,
        }
    }

    /// Builds a partition from explicit groups. Ids absent from `g` are skipped,
    /// an id listed twice stays in its first group.
    pub fn from_groups(g: &GraphSnapshot, groups: &[Vec<&str>]) -> Self {
        let mut assignment = HashMap::new();
        let mut members = Vec::new();
        for group in groups {
            let cid = members.len();
            let mut kept = Vec::with_capacity(group.len());
            for &id in group {
                if g.node(id).is_some() && !assignment.contains_key(id) {
                    assignment.insert(id.to_string(), cid);
                    kept.push(id.to_string());
                }
            }
            if !kept.is_empty() {
                members.push(kept);
            }
        }
        Self {
            assignment,
            members,
            modularity: 0.0,
        }
    }

    /// `None` means unassigned.
    pub fn community_of(&self, node_id: &str) -> Option<CommunityId> {
        self.assignment.get(node_id).copied()
    }

    pub fn assignment(&self) -> &HashMap<String, CommunityId> {
        &self.assignment
    }

    pub fn members(&self, id: CommunityId) -> &[String] {
        self.members.get(id).map_or(&[], Vec::as_slice)
    }

    pub fn count(&self) -> usize {
        self.members.len()
    }

    pub fn modularity(&self) -> f64 {
        self.modularity
    }
}

/// Crossing edges from one community to another.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalConnection {
    pub count: usize,
    pub types: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Community {
    pub id: CommunityId,
    pub members: Vec<String>,
    /// Ids of edges with both ends inside, capped for downstream consumers.
    pub internal_edges: Vec<String>,
    /// Uncapped count of internal edges.
    pub internal_edge_count: usize,
    pub external: BTreeMap<CommunityId, ExternalConnection>,
    /// Position in the narrative, if the story visits this community.
    pub order: Option<u32>,
}

impl Community {
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

/// One node of the coarse graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaNode {
    pub community_id: CommunityId,
    pub size: usize,
    pub order: Option<u32>,
    /// Anchor computed by the meta pass of the nested layout.
    pub position: Option<Pos2>,
}

/// Aggregate of every edge crossing between two communities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaEdge {
    pub source: CommunityId,
    pub target: CommunityId,
    pub count: usize,
    pub types: BTreeSet<String>,
}

/// Step of an externally produced story over communities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeStep {
    pub community_id: CommunityId,
    pub order: u32,
    #[serde(default)]
    pub transition_text: String,
}

/// Partition plus coarse graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaGraph {
    pub partition: Partition,
    /// Every community, including the ones hidden from the coarse view.
    pub communities: Vec<Community>,
    pub nodes: Vec<MetaNode>,
    pub edges: Vec<MetaEdge>,
}

impl MetaGraph {
    /// Classifies every edge as internal or external and derives the coarse graph.
    ///
    /// A community gets a meta-node when it has external connections or at
    /// least `min_size` members; the threshold is inclusive.
    pub fn from_partition(
        g: &GraphSnapshot,
        partition: Partition,
        settings: &CommunitySettings,
    ) -> Self {
        let mut communities: Vec<Community> = (0..partition.count())
            .map(|id| Community {
                id,
                members: partition.members(id).to_vec(),
                internal_edges: Vec::new(),
                internal_edge_count: 0,
                external: BTreeMap::new(),
                order: None,
            })
            .collect();

        let mut crossing: BTreeMap<(CommunityId, CommunityId), ExternalConnection> =
            BTreeMap::new();
        for e in g.edges() {
            let (Some(cs), Some(ct)) = (
                partition.community_of(&e.source_id),
                partition.community_of(&e.target_id),
            ) else {
                continue;
            };
            if cs == ct {
                let c = &mut communities[cs];
                c.internal_edge_count += 1;
                if c.internal_edges.len() < settings.internal_edge_cap {
                    c.internal_edges.push(e.id.clone());
                }
                continue;
            }
            for (from, to) in [(cs, ct), (ct, cs)] {
                let conn = communities[from].external.entry(to).or_default();
                conn.count += 1;
                conn.types.insert(e.kind.clone());
            }
            let pair = crossing.entry((cs.min(ct), cs.max(ct))).or_default();
            pair.count += 1;
            pair.types.insert(e.kind.clone());
        }

        let nodes = communities
            .iter()
            .filter(|c| !c.external.is_empty() || c.size() >= settings.min_size)
            .map(|c| MetaNode {
                community_id: c.id,
                size: c.size(),
                order: c.order,
                position: None,
            })
            .collect();
        let edges = crossing
            .into_iter()
            .map(|((source, target), conn)| MetaEdge {
                source,
                target,
                count: conn.count,
                types: conn.types,
            })
            .collect();

        Self {
            partition,
            communities,
            nodes,
            edges,
        }
    }

    /// Community of a node; `None` means unassigned.
    pub fn community_of(&self, node_id: &str) -> Option<CommunityId> {
        self.partition.community_of(node_id)
    }

    pub fn is_empty(&self) -> bool {
        self.communities.is_empty()
    }

    pub fn meta_node(&self, id: CommunityId) -> Option<&MetaNode> {
        self.nodes.iter().find(|n| n.community_id == id)
    }

    /// Assigns narrative order to communities. Steps naming unknown communities are ignored.
    pub fn apply_narrative(&mut self, steps: &[NarrativeStep]) {
        for step in steps {
            let Some(c) = self.communities.get_mut(step.community_id) else {
                log::warn!("narrative names unknown community {}", step.community_id);
                continue;
            };
            c.order = Some(step.order);
        }
        for n in &mut self.nodes {
            n.order = self.communities[n.community_id].order;
        }
    }
}

/// Detects communities and builds the coarse graph.
pub fn try_build_meta_graph(g: &GraphSnapshot, settings: &CommunitySettings) -> Result<MetaGraph> {
    let partition = detect(g, settings)?;
    log::debug!(
        "detected {} communities, modularity {:.4}",
        partition.count(),
        partition.modularity()
    );
    Ok(MetaGraph::from_partition(g, partition, settings))
}

/// Like [`try_build_meta_graph`], but a failing detection degrades to an
/// empty meta-graph so the detail view keeps working.
pub fn build_meta_graph(g: &GraphSnapshot, settings: &CommunitySettings) -> MetaGraph {
    try_build_meta_graph(g, settings).unwrap_or_else(|err| {
        log::warn!("continuing without communities: {err}");
        MetaGraph::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphEdge, GraphNode};

    fn graph() -> GraphSnapshot {
        let nodes = ["a", "b", "c", "d", "e", "f", "lonely"]
            .iter()
            .map(|id| GraphNode::new(*id))
            .collect();
        GraphSnapshot::new(
            nodes,
            vec![
                GraphEdge::new("ab", "in", "a", "b"),
                GraphEdge::new("bc", "in", "b", "c"),
                GraphEdge::new("de", "in", "d", "e"),
                GraphEdge::new("cd", "X", "c", "d"),
                GraphEdge::new("ef", "in", "e", "f"),
            ],
        )
    }

    #[test]
    fn classifies_internal_and_external() {
        let g = graph();
        let p = Partition::from_groups(&g, &[vec!["a", "b", "c"], vec!["d", "e", "f"], vec!["lonely"]]);
        let meta = MetaGraph::from_partition(&g, p, &CommunitySettings::default());
        assert_eq!(meta.communities[0].internal_edge_count, 2);
        assert_eq!(meta.communities[1].internal_edge_count, 2);
        assert_eq!(meta.communities[0].external[&1].count, 1);
        assert_eq!(meta.communities[1].external[&0].count, 1);
        assert_eq!(meta.edges.len(), 1);
        assert_eq!(meta.edges[0].types, BTreeSet::from(["X".to_string()]));
    }

    #[test]
    fn small_isolated_communities_are_hidden() {
        let g = graph();
        let p = Partition::from_groups(&g, &[vec!["a", "b", "c"], vec!["d", "e", "f"], vec!["lonely"]]);
        let meta = MetaGraph::from_partition(&g, p, &CommunitySettings::default());
        assert_eq!(meta.communities.len(), 3);
        let shown: Vec<_> = meta.nodes.iter().map(|n| n.community_id).collect();
        assert_eq!(shown, vec![0, 1]);
        assert_eq!(meta.community_of("lonely"), Some(2));
    }

    #[test]
    fn small_connected_community_is_kept() {
        let g = graph();
        let p = Partition::from_groups(&g, &[vec!["a", "b"], vec!["c", "d", "e", "f"]]);
        let meta = MetaGraph::from_partition(&g, p, &CommunitySettings::default());
        assert!(meta.meta_node(0).is_some());
        assert_eq!(meta.community_of("lonely"), None);
    }

    #[test]
    fn size_threshold_is_inclusive() {
        let g = graph();
        let p = Partition::from_groups(&g, &[vec!["a", "b", "c", "d", "e", "f"], vec!["lonely"]]);
        let settings = CommunitySettings {
            min_size: 1,
            ..Default::default()
        };
        let meta = MetaGraph::from_partition(&g, p.clone(), &settings);
        assert!(meta.meta_node(1).is_some());

        let settings = CommunitySettings {
            min_size: 2,
            ..Default::default()
        };
        let meta = MetaGraph::from_partition(&g, p, &settings);
        assert!(meta.meta_node(1).is_none());
    }

    #[test]
    fn groups_skip_unknown_and_repeated_ids() {
        let g = graph();
        let p = Partition::from_groups(&g, &[vec!["a", "ghost", "b"], vec!["b", "c"], vec!["ghost"]]);
        assert_eq!(p.count(), 2);
        assert_eq!(p.members(0), ["a".to_string(), "b".to_string()]);
        assert_eq!(p.members(1), ["c".to_string()]);
        assert_eq!(p.community_of("b"), Some(0));
        assert_eq!(p.community_of("ghost"), None);
    }

    #[test]
    fn internal_edges_are_capped() {
        let g = graph();
        let p = Partition::from_groups(&g, &[vec!["a", "b", "c"]]);
        let settings = CommunitySettings {
            internal_edge_cap: 1,
            ..Default::default()
        };
        let meta = MetaGraph::from_partition(&g, p, &settings);
        assert_eq!(meta.communities[0].internal_edges.len(), 1);
        assert_eq!(meta.communities[0].internal_edge_count, 2);
    }

    #[test]
    fn narrative_sets_order() {
        let g = graph();
        let p = Partition::from_groups(&g, &[vec!["a", "b", "c"], vec!["d", "e", "f"]]);
        let mut meta = MetaGraph::from_partition(&g, p, &CommunitySettings::default());
        meta.apply_narrative(&[
            NarrativeStep {
                community_id: 1,
                order: 0,
                transition_text: "start here".into(),
            },
            NarrativeStep {
                community_id: 42,
                order: 1,
                transition_text: String::new(),
            },
        ]);
        assert_eq!(meta.communities[1].order, Some(0));
        assert_eq!(meta.communities[0].order, None);
        assert_eq!(meta.meta_node(1).unwrap().order, Some(0));
    }

    #[test]
    fn partition_is_total_and_disjoint() {
        let g = graph();
        let meta = build_meta_graph(&g, &CommunitySettings::default());
        let mut seen = 0;
        for c in &meta.communities {
            seen += c.size();
        }
        assert_eq!(seen, g.node_count());
        for n in g.nodes() {
            assert!(meta.community_of(&n.id).is_some());
        }
    }
}

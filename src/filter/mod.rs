mod condition;

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

pub use condition::{Condition, Logic, Operator};

use crate::{graph::GraphSnapshot, Result};

pub const DEFAULT_MAX_HOPS: usize = 2;

fn default_max_hops() -> usize {
    DEFAULT_MAX_HOPS
}

/// Describes which part of a graph survives before layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    /// Seeds for the hop-bounded neighborhood. `None` keeps every node as a candidate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center_node_ids: Option<Vec<String>>,
    #[serde(default = "default_max_hops")]
    pub max_hops: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    /// Adds one hop of neighbors around the surviving set, bypassing the condition.
    #[serde(default)]
    pub include_neighbors: bool,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            center_node_ids: None,
            max_hops: DEFAULT_MAX_HOPS,
            condition: None,
            include_neighbors: false,
        }
    }
}

impl FilterSpec {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn around(seeds: impl IntoIterator<Item = impl Into<String>>, max_hops: usize) -> Self {
        Self {
            center_node_ids: Some(seeds.into_iter().map(Into::into).collect()),
            max_hops,
            ..Default::default()
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_neighbors(mut self, include: bool) -> Self {
        self.include_neighbors = include;
        self
    }
}

/// Hop distance from `root` to every node reachable within `max_hops`,
/// indexed like `adj`. Unreached nodes are `None`.
pub fn hop_distances(adj: &[Vec<usize>], root: usize, max_hops: usize) -> Vec<Option<usize>> {
    let mut dist = vec![None; adj.len()];
    if root >= adj.len() {
        return dist;
    }
    dist[root] = Some(0);
    let mut queue = VecDeque::from([root]);
    while let Some(curr) = queue.pop_front() {
        let Some(d) = dist[curr] else { continue };
        if d >= max_hops {
            continue;
        }
        for &next in &adj[curr] {
            if dist[next].is_none() {
                dist[next] = Some(d + 1);
                queue.push_back(next);
            }
        }
    }
    dist
}

/// Reduces `g` to the nodes selected by `spec`. The result never holds a
/// dangling edge.
///
/// Seeds always survive, even when the condition would reject them.
pub fn filter_subgraph(g: &GraphSnapshot, spec: &FilterSpec) -> GraphSnapshot {
    let adj = g.adjacency();

    let mut seeds = HashSet::new();
    let mut candidates: HashSet<usize> = match &spec.center_node_ids {
        Some(ids) => {
            let mut reached = HashSet::new();
            for id in ids {
                let Some(root) = g.node_index(id) else {
                    log::warn!("filter seed {id} is not in the graph");
                    continue;
                };
                seeds.insert(root);
                reached.extend(
                    hop_distances(&adj, root, spec.max_hops)
                        .iter()
                        .enumerate()
                        .filter_map(|(i, d)| d.map(|_| i)),
                );
            }
            reached
        }
        None => (0..g.node_count()).collect(),
    };

    if let Some(condition) = &spec.condition {
        candidates.retain(|&i| seeds.contains(&i) || condition.matches(&g.nodes()[i]));
    }

    if spec.include_neighbors {
        let dilation: Vec<usize> = candidates
            .iter()
            .flat_map(|&i| adj[i].iter().copied())
            .collect();
        candidates.extend(dilation);
    }

    log::debug!(
        "filter kept {} of {} nodes",
        candidates.len(),
        g.node_count()
    );

    g.retain_indices(&candidates)
}

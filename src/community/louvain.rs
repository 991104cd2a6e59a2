use std::collections::HashMap;

use petgraph::graphmap::UnGraphMap;

use super::{CommunityError, Partition};
use crate::{graph::GraphSnapshot, settings::CommunitySettings};

/// Weighted undirected graph of one aggregation level.
#[derive(Debug, Clone)]
struct Level {
    adj: Vec<Vec<(usize, f64)>>,
    loops: Vec<f64>,
}

impl Level {
    /// Multi-edges collapse into one edge of weight 1; self-loops are ignored.
    fn from_snapshot(g: &GraphSnapshot) -> Self {
        let mut map = UnGraphMap::<usize, f64>::with_capacity(g.node_count(), g.edge_count());
        for i in 0..g.node_count() {
            map.add_node(i);
        }
        for e in g.edges() {
            let Some((s, t)) = g.endpoints(e) else {
                continue;
            };
            if s != t {
                map.add_edge(s, t, 1.0);
            }
        }
        let adj = (0..g.node_count())
            .map(|i| map.edges(i).map(|(_, other, w)| (other, *w)).collect())
            .collect();
        Self {
            adj,
            loops: vec![0.0; g.node_count()],
        }
    }

    fn len(&self) -> usize {
        self.adj.len()
    }

    fn degrees(&self) -> Vec<f64> {
        self.adj
            .iter()
            .zip(&self.loops)
            .map(|(edges, l)| edges.iter().map(|(_, w)| w).sum::<f64>() + 2.0 * l)
            .collect()
    }

    fn modularity(&self, comm: &[usize], m2: f64) -> f64 {
        if m2 == 0.0 {
            return 0.0;
        }
        let k = self.degrees();
        let count = comm.iter().max().map_or(0, |c| c + 1);
        let mut inner = vec![0.0; count];
        let mut tot = vec![0.0; count];
        for i in 0..self.len() {
            tot[comm[i]] += k[i];
            inner[comm[i]] += 2.0 * self.loops[i];
            for &(j, w) in &self.adj[i] {
                if comm[j] == comm[i] {
                    inner[comm[i]] += w;
                }
            }
        }
        inner
            .iter()
            .zip(&tot)
            .map(|(i, t)| i / m2 - (t / m2) * (t / m2))
            .sum()
    }

    /// Local moving phase. Returns compact community labels and whether any node moved.
    fn local_moves(&self, m2: f64, max_passes: usize) -> (Vec<usize>, bool) {
        let n = self.len();
        let k = self.degrees();
        let mut comm: Vec<usize> = (0..n).collect();
        let mut tot = k.clone();
        let mut any_move = false;

        let mut weight_to = vec![0.0; n];
        let mut touched: Vec<usize> = Vec::new();

        for _ in 0..max_passes.max(1) {
            let mut moved = false;
            for i in 0..n {
                let ci = comm[i];
                for &c in &touched {
                    weight_to[c] = 0.0;
                }
                touched.clear();
                for &(j, w) in &self.adj[i] {
                    let cj = comm[j];
                    if weight_to[cj] == 0.0 {
                        touched.push(cj);
                    }
                    weight_to[cj] += w;
                }

                tot[ci] -= k[i];
                let mut best = ci;
                let mut best_gain = weight_to[ci] - tot[ci] * k[i] / m2;
                for &c in &touched {
                    let gain = weight_to[c] - tot[c] * k[i] / m2;
                    if gain > best_gain + 1e-12 {
                        best = c;
                        best_gain = gain;
                    }
                }
                tot[best] += k[i];
                if best != ci {
                    comm[i] = best;
                    moved = true;
                    any_move = true;
                }
            }
            if !moved {
                break;
            }
        }

        (renumber(&comm), any_move)
    }

    /// Collapses each community into one node.
    fn aggregate(&self, comm: &[usize]) -> Self {
        let count = comm.iter().max().map_or(0, |c| c + 1);
        let mut weights: Vec<HashMap<usize, f64>> = vec![HashMap::new(); count];
        let mut loops = vec![0.0; count];
        for i in 0..self.len() {
            let ci = comm[i];
            loops[ci] += self.loops[i];
            for &(j, w) in &self.adj[i] {
                let cj = comm[j];
                if ci == cj {
                    // every internal edge is seen from both ends
                    loops[ci] += w / 2.0;
                } else {
                    *weights[ci].entry(cj).or_insert(0.0) += w;
                }
            }
        }
        let adj = weights
            .into_iter()
            .map(|m| {
                let mut v: Vec<(usize, f64)> = m.into_iter().collect();
                v.sort_by_key(|(c, _)| *c);
                v
            })
            .collect();
        Self { adj, loops }
    }
}

/// Relabels communities 0.. in order of first appearance.
fn renumber(comm: &[usize]) -> Vec<usize> {
    let mut map = HashMap::new();
    comm.iter()
        .map(|c| {
            let next = map.len();
            *map.entry(*c).or_insert(next)
        })
        .collect()
}

/// Modularity-maximizing partition (Louvain method).
///
/// Iteration order is the node order of the snapshot, so identical input
/// yields an identical partition.
pub fn detect(g: &GraphSnapshot, settings: &CommunitySettings) -> Result<Partition, CommunityError> {
    let mut level = Level::from_snapshot(g);
    let m2: f64 = level.degrees().iter().sum();
    if !m2.is_finite() {
        return Err(CommunityError::NonFiniteWeight);
    }

    // membership of every input node in the current level's nodes
    let mut membership: Vec<usize> = (0..g.node_count()).collect();
    let mut modularity = level.modularity(&membership, m2);

    if m2 > 0.0 {
        for _ in 0..settings.max_passes.max(1) {
            let (comm, moved) = level.local_moves(m2, settings.max_passes);
            if !moved {
                break;
            }
            let next_membership: Vec<usize> = membership.iter().map(|&m| comm[m]).collect();
            let next = level.aggregate(&comm);
            let identity: Vec<usize> = (0..next.len()).collect();
            let q = next.modularity(&identity, m2);
            if !q.is_finite() {
                return Err(CommunityError::NonFiniteModularity);
            }
            let gain = q - modularity;
            membership = next_membership;
            level = next;
            modularity = q;
            if gain < settings.min_modularity_gain {
                break;
            }
        }
    }

    Ok(Partition::from_membership(g, &membership, modularity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphEdge, GraphNode};

    fn two_cliques() -> GraphSnapshot {
        let nodes = (0..10).map(|i| GraphNode::new(format!("n{i}"))).collect();
        let mut edges = Vec::new();
        for base in [0, 5] {
            for a in base..base + 5 {
                for b in (a + 1)..base + 5 {
                    edges.push(GraphEdge::new(format!("e{a}-{b}"), "in", format!("n{a}"), format!("n{b}")));
                }
            }
        }
        edges.push(GraphEdge::new("x1", "A", "n0", "n5"));
        edges.push(GraphEdge::new("x2", "B", "n1", "n6"));
        edges.push(GraphEdge::new("x3", "A", "n2", "n7"));
        GraphSnapshot::new(nodes, edges)
    }

    #[test]
    fn finds_two_cliques() {
        let p = detect(&two_cliques(), &CommunitySettings::default()).unwrap();
        assert_eq!(p.count(), 2);
        let left = p.community_of("n0").unwrap();
        let right = p.community_of("n5").unwrap();
        assert_ne!(left, right);
        for i in 0..5 {
            assert_eq!(p.community_of(&format!("n{i}")), Some(left));
            assert_eq!(p.community_of(&format!("n{}", i + 5)), Some(right));
        }
        assert!(p.modularity() > 0.3);
    }

    #[test]
    fn edgeless_graph_gives_singletons() {
        let g = GraphSnapshot::new(vec![GraphNode::new("a"), GraphNode::new("b")], vec![]);
        let p = detect(&g, &CommunitySettings::default()).unwrap();
        assert_eq!(p.count(), 2);
        assert_ne!(p.community_of("a"), p.community_of("b"));
    }

    #[test]
    fn multi_edges_collapse() {
        let g = GraphSnapshot::new(
            vec![GraphNode::new("a"), GraphNode::new("b")],
            vec![
                GraphEdge::new("1", "r", "a", "b"),
                GraphEdge::new("2", "s", "b", "a"),
            ],
        );
        let level = Level::from_snapshot(&g);
        assert_eq!(level.adj[0], vec![(1, 1.0)]);
    }

    #[test]
    fn renumber_is_first_seen() {
        assert_eq!(renumber(&[7, 7, 3, 9, 3]), vec![0, 0, 1, 2, 1]);
    }
}

use std::collections::{BTreeMap, HashMap, HashSet};

use egui::Pos2;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

pub type Properties = BTreeMap<String, Value>;

/// Fixed coordinates for a node. A set axis is excluded from force-driven movement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fx: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fy: Option<f32>,
}

impl Pin {
    pub fn at(pos: Pos2) -> Self {
        Self {
            fx: Some(pos.x),
            fy: Some(pos.y),
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.fx.is_some() || self.fy.is_some()
    }
}

/// A node of a graph snapshot. Identity is immutable, position is not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Category of the node.
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Pos2>,
    /// `fx`/`fy` sit on the node itself in the serialized form.
    #[serde(flatten)]
    pub pin: Option<Pin>,

    #[serde(skip)]
    neighbor_link_count: usize,
}

impl GraphNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            label: String::new(),
            properties: Properties::new(),
            position: None,
            pin: None,
            neighbor_link_count: 0,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_position(mut self, pos: Pos2) -> Self {
        self.position = Some(pos);
        self
    }

    /// Number of edges touching this node. Derived when the snapshot is built.
    pub fn neighbor_link_count(&self) -> usize {
        self.neighbor_link_count
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub source_id: String,
    pub target_id: String,
    #[serde(default)]
    pub properties: Properties,
}

impl GraphEdge {
    pub fn new(
        id: impl Into<String>,
        kind: impl Into<String>,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            source_id: source_id.into(),
            target_id: target_id.into(),
            properties: Properties::new(),
        }
    }
}

#[derive(Deserialize)]
struct RawSnapshot {
    nodes: Vec<GraphNode>,
    #[serde(default)]
    edges: Vec<GraphEdge>,
}

/// Self-consistent node/edge set: unique node ids, no dangling edges.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphSnapshot {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,

    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl GraphSnapshot {
    /// Builds a snapshot, keeping the first node for duplicated ids and
    /// dropping every edge whose endpoint does not exist.
    pub fn new(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        let mut index = HashMap::with_capacity(nodes.len());
        let mut kept = Vec::with_capacity(nodes.len());
        for mut n in nodes {
            if index.contains_key(&n.id) {
                log::warn!("duplicate node id {}, keeping first occurrence", n.id);
                continue;
            }
            n.neighbor_link_count = 0;
            n.pin = n.pin.filter(Pin::is_pinned);
            index.insert(n.id.clone(), kept.len());
            kept.push(n);
        }

        let mut valid_edges = Vec::with_capacity(edges.len());
        for e in edges {
            let (Some(&s), Some(&t)) = (index.get(&e.source_id), index.get(&e.target_id)) else {
                log::warn!(
                    "dropping edge {}: dangling endpoint {} -> {}",
                    e.id,
                    e.source_id,
                    e.target_id
                );
                continue;
            };
            kept[s].neighbor_link_count += 1;
            kept[t].neighbor_link_count += 1;
            valid_edges.push(e);
        }

        Self {
            nodes: kept,
            edges: valid_edges,
            index,
        }
    }

    /// Parses `{ "nodes": [...], "edges": [...] }`.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::InvalidInput(
                "graph snapshot must be a json object".to_string(),
            ));
        }
        let raw: RawSnapshot = serde_json::from_value(value)?;
        Ok(Self::new(raw.nodes, raw.edges))
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [GraphNode] {
        &mut self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.node_index(id).map(|i| &self.nodes[i])
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
        self.node_index(id).map(move |i| &mut self.nodes[i])
    }

    /// Endpoint indices of an edge. Every edge held by the snapshot resolves.
    pub fn endpoints(&self, edge: &GraphEdge) -> Option<(usize, usize)> {
        Some((
            self.node_index(&edge.source_id)?,
            self.node_index(&edge.target_id)?,
        ))
    }

    /// Undirected adjacency list indexed like `nodes()`.
    pub fn adjacency(&self) -> Vec<Vec<usize>> {
        let mut adj = vec![Vec::new(); self.nodes.len()];
        for e in &self.edges {
            if let Some((s, t)) = self.endpoints(e) {
                adj[s].push(t);
                if s != t {
                    adj[t].push(s);
                }
            }
        }
        adj
    }

    /// Restricts the snapshot to the given node indices. Edges survive only
    /// when both endpoints do.
    pub fn retain_indices(&self, keep: &HashSet<usize>) -> Self {
        let nodes = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(i, _)| keep.contains(i))
            .map(|(_, n)| n.clone())
            .collect();
        let edges = self
            .edges
            .iter()
            .filter(|e| {
                self.endpoints(e)
                    .is_some_and(|(s, t)| keep.contains(&s) && keep.contains(&t))
            })
            .cloned()
            .collect();
        Self::new(nodes, edges)
    }

    /// Directed petgraph copy of the snapshot. Node indices follow `nodes()`.
    pub fn to_stable_graph(&self) -> StableGraph<GraphNode, GraphEdge> {
        let mut g = StableGraph::with_capacity(self.nodes.len(), self.edges.len());
        for n in &self.nodes {
            g.add_node(n.clone());
        }
        for e in &self.edges {
            if let Some((s, t)) = self.endpoints(e) {
                g.add_edge(NodeIndex::new(s), NodeIndex::new(t), e.clone());
            }
        }
        g
    }
}

impl From<&StableGraph<GraphNode, GraphEdge>> for GraphSnapshot {
    /// Endpoint ids are taken from the connected nodes, not from the edge weights.
    fn from(g: &StableGraph<GraphNode, GraphEdge>) -> Self {
        let nodes = g.node_weights().cloned().collect();
        let edges = g
            .edge_indices()
            .filter_map(|idx| {
                let (s, t) = g.edge_endpoints(idx)?;
                let mut e = g.edge_weight(idx)?.clone();
                e.source_id.clone_from(&g[s].id);
                e.target_id.clone_from(&g[t].id);
                Some(e)
            })
            .collect();
        Self::new(nodes, edges)
    }
}

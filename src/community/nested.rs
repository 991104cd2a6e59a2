use std::collections::HashMap;

use egui::Pos2;
use serde::{Deserialize, Serialize};

use super::{CommunityId, MetaGraph, MetaNode};
use crate::{
    graph::GraphSnapshot,
    layouts::{
        force_directed::{
            AxisForce, AxisTarget, ForceConfig, Layout, SimLink, SimNode, Simulation,
        },
        instruction::normalize,
    },
    settings::{CommunitySettings, SimulationSettings},
};

/// Share of the canvas left free on both ends of the narrative axis.
const ORDER_PADDING: f32 = 0.1;

/// Secondary-axis offset of zig-zagging anchors, as a share of the canvas.
const ZIG_ZAG: f32 = 0.15;

/// Where unordered communities go, as a share of the canvas height.
const PERIPHERY_BANDS: [f32; 2] = [0.05, 0.95];

/// Node of the detail pass, tagged with its community.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailNode {
    pub id: String,
    pub community: Option<CommunityId>,
    pub position: Pos2,
}

/// Result of the two-pass solve.
#[derive(Debug, Clone, Default)]
pub struct NestedLayout {
    pub anchors: HashMap<CommunityId, Pos2>,
    pub nodes: Vec<DetailNode>,
    /// Detail layout over every node of the graph.
    pub layout: Layout,
}

impl From<&MetaNode> for SimNode {
    fn from(meta: &MetaNode) -> Self {
        let mut node = SimNode::at(meta.community_id.to_string(), meta.position.unwrap_or(Pos2::ZERO));
        node.radius = (meta.size as f32).sqrt();
        node
    }
}

/// Target anchor of every community.
///
/// Communities with a narrative order are spread along x in order, each
/// reserving a slot proportional to its size, alternating above and below
/// the middle. Communities without an order go to the top and bottom bands.
/// Without any order at all the anchors come from a force pass over the
/// meta-graph.
pub fn community_anchors(
    meta: &MetaGraph,
    settings: &SimulationSettings,
) -> HashMap<CommunityId, Pos2> {
    let canvas = settings.canvas;
    let mut ordered: Vec<_> = meta
        .communities
        .iter()
        .filter_map(|c| c.order.map(|o| (o, c.id, c.size())))
        .collect();
    if ordered.is_empty() {
        return meta_pass(meta, settings);
    }
    ordered.sort_unstable();

    let total: usize = ordered.iter().map(|(_, _, size)| size).sum();
    let span = 1.0 - 2.0 * ORDER_PADDING;
    let mid = canvas.y / 2.0;
    let mut anchors = HashMap::with_capacity(meta.communities.len());
    let mut cumulative = 0usize;
    for (i, (_, id, size)) in ordered.iter().enumerate() {
        let slot_center = cumulative as f64 + *size as f64 / 2.0;
        cumulative += size;
        let frac = normalize(slot_center, 0.0, total as f64) as f32;
        let x = canvas.x * (ORDER_PADDING + frac * span);
        let y = if ordered.len() == 1 {
            mid
        } else if i % 2 == 0 {
            mid - canvas.y * ZIG_ZAG
        } else {
            mid + canvas.y * ZIG_ZAG
        };
        anchors.insert(*id, Pos2::new(x, y));
    }

    let unordered: Vec<_> = meta
        .communities
        .iter()
        .filter(|c| c.order.is_none())
        .map(|c| c.id)
        .collect();
    for (i, id) in unordered.iter().enumerate() {
        let band = PERIPHERY_BANDS[i % 2];
        let column = i / 2;
        let columns = unordered.len().div_ceil(2);
        let frac = (column as f32 + 0.5) / columns as f32;
        anchors.insert(*id, Pos2::new(canvas.x * frac, canvas.y * band));
    }
    anchors
}

/// First pass over the coarse graph. Communities repel in proportion to their size.
fn meta_pass(meta: &MetaGraph, settings: &SimulationSettings) -> HashMap<CommunityId, Pos2> {
    let center = (settings.canvas / 2.0).to_pos2();
    if meta.communities.len() <= 1 {
        return meta.communities.iter().map(|c| (c.id, center)).collect();
    }

    let nodes: Vec<SimNode> = meta
        .communities
        .iter()
        .map(|c| {
            SimNode::from(&MetaNode {
                community_id: c.id,
                size: c.size(),
                order: c.order,
                position: None,
            })
        })
        .collect();
    let links = meta
        .edges
        .iter()
        .map(|e| SimLink {
            id: format!("{}-{}", e.source, e.target),
            source: e.source,
            target: e.target,
        })
        .collect();
    let seeded = vec![false; nodes.len()];

    let mut config = ForceConfig::standard(settings);
    config.collide = None;
    if let Some(link) = config.link.as_mut() {
        link.distance = settings.link_distance * 5.0;
    }
    if let Some(charge) = config.charge.as_mut() {
        charge.strength *= 10.0;
        for c in &meta.communities {
            charge
                .multipliers
                .insert(c.id.to_string(), (c.size() as f32).sqrt().max(1.0));
        }
    }

    let mut sim = Simulation::new(nodes, links, &seeded, settings);
    sim.configure(&config);
    sim.run();
    sim.nodes()
        .iter()
        .zip(&meta.communities)
        .map(|(n, c)| (c.id, n.pos))
        .collect()
}

/// Forces of the detail pass: strong links inside a community, weak links
/// across, and a per-node pull toward the community anchor.
fn detail_config(
    g: &GraphSnapshot,
    meta: &MetaGraph,
    anchors: &HashMap<CommunityId, Pos2>,
    settings: &SimulationSettings,
    community: &CommunitySettings,
) -> ForceConfig {
    let mut config = ForceConfig::standard(settings);
    if let Some(link) = config.link.as_mut() {
        for e in g.edges() {
            let same = match (meta.community_of(&e.source_id), meta.community_of(&e.target_id)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            };
            let strength = if same {
                community.intra_link_strength
            } else {
                community.cross_link_strength
            };
            link.per_link.insert(e.id.clone(), strength);
        }
    }
    let center = settings.canvas / 2.0;
    let mut x = AxisForce::uniform(center.x, settings.center_strength);
    let mut y = AxisForce::uniform(center.y, settings.center_strength);
    for n in g.nodes() {
        let Some(anchor) = meta.community_of(&n.id).and_then(|c| anchors.get(&c)) else {
            continue;
        };
        x.per_node.insert(
            n.id.clone(),
            AxisTarget {
                target: anchor.x,
                strength: community.anchor_strength,
            },
        );
        y.per_node.insert(
            n.id.clone(),
            AxisTarget {
                target: anchor.y,
                strength: community.anchor_strength,
            },
        );
    }
    config.x = Some(x);
    config.y = Some(y);
    config
}

/// Two-pass nested layout: anchors from the coarse graph first, then the
/// detail solve over every node of `g`, pulled toward its community anchor.
///
/// Meta-node positions of `meta` are updated with the anchors.
pub fn nested_layout(
    g: &GraphSnapshot,
    meta: &mut MetaGraph,
    settings: &SimulationSettings,
    community: &CommunitySettings,
) -> NestedLayout {
    if g.is_empty() {
        return NestedLayout::default();
    }
    let anchors = community_anchors(meta, settings);
    for n in &mut meta.nodes {
        n.position = anchors.get(&n.community_id).copied();
    }

    let config = detail_config(g, meta, &anchors, settings, community);
    // positions left over from an earlier flat solve must not freeze the detail pass
    let mut sim = Simulation::from_graph(g, settings);
    sim.reheat(settings.alpha);
    sim.configure(&config);
    let ticks = sim.run();
    let layout = sim.into_layout(ticks);
    let nodes = layout
        .nodes
        .iter()
        .map(|n| DetailNode {
            id: n.id.clone(),
            community: meta.community_of(&n.id),
            position: n.position,
        })
        .collect();
    log::debug!(
        "nested layout of {} nodes around {} anchors",
        layout.nodes.len(),
        anchors.len()
    );
    NestedLayout {
        anchors,
        nodes,
        layout,
    }
}

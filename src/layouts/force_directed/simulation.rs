use std::collections::HashMap;

use egui::{Pos2, Rect, Vec2};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::{
    config::ForceConfig,
    forces::{Axis, Center, Collide, Force, Link, ManyBody, Position},
};
use crate::{
    graph::{GraphSnapshot, Pin},
    settings::SimulationSettings,
};

const INITIAL_RADIUS: f32 = 10.0;

/// Body of the simulation.
#[derive(Debug, Clone)]
pub struct SimNode {
    pub id: String,
    pub pos: Pos2,
    pub vel: Vec2,
    pub fx: Option<f32>,
    pub fy: Option<f32>,
    pub radius: f32,
}

impl SimNode {
    pub fn at(id: impl Into<String>, pos: Pos2) -> Self {
        Self {
            id: id.into(),
            pos,
            vel: Vec2::ZERO,
            fx: None,
            fy: None,
            radius: 8.0,
        }
    }

    pub fn pin(&mut self, pin: Pin) {
        if pin.fx.is_some() {
            self.fx = pin.fx;
        }
        if pin.fy.is_some() {
            self.fy = pin.fy;
        }
    }
}

/// Undirected spring between two nodes, by index.
#[derive(Debug, Clone)]
pub struct SimLink {
    pub id: String,
    pub source: usize,
    pub target: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedNode {
    pub id: String,
    pub position: Pos2,
}

/// Edge with endpoints resolved to indices into [`Layout::nodes`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedEdge {
    pub id: String,
    pub source: usize,
    pub target: usize,
}

/// Static result of a solve.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "LayoutData")]
pub struct Layout {
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<PositionedEdge>,
    pub ticks: u32,

    #[serde(skip)]
    index: HashMap<String, usize>,
}

/// Serialized shape of [`Layout`]; the id index is rebuilt on load.
#[derive(Deserialize)]
struct LayoutData {
    nodes: Vec<PositionedNode>,
    edges: Vec<PositionedEdge>,
    #[serde(default)]
    ticks: u32,
}

impl From<LayoutData> for Layout {
    fn from(data: LayoutData) -> Self {
        Self::new(data.nodes, data.edges, data.ticks)
    }
}

impl Layout {
    pub fn new(nodes: Vec<PositionedNode>, edges: Vec<PositionedEdge>, ticks: u32) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
        Self {
            nodes,
            edges,
            ticks,
            index,
        }
    }

    pub fn position(&self, id: &str) -> Option<Pos2> {
        self.index.get(id).map(|&i| self.nodes[i].position)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Bounding rect of the given node ids. Unknown ids are skipped; `None`
    /// when nothing is left.
    pub fn bounds_of<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> Option<Rect> {
        let mut bounds = Bounds::default();
        for id in ids {
            if let Some(p) = self.position(id) {
                bounds.compute_next(p);
            }
        }
        bounds.rect()
    }

    pub fn bounds(&self) -> Option<Rect> {
        let mut bounds = Bounds::default();
        for n in &self.nodes {
            bounds.compute_next(n.position);
        }
        bounds.rect()
    }

    /// Writes the computed positions back into the snapshot.
    pub fn apply_to(&self, g: &mut GraphSnapshot) {
        for n in &self.nodes {
            if let Some(node) = g.node_mut(&n.id) {
                node.position = Some(n.position);
            }
        }
    }
}

#[derive(Clone, Debug)]
struct Bounds {
    min: Pos2,
    max: Pos2,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: Pos2::new(f32::MAX, f32::MAX),
            max: Pos2::new(f32::MIN, f32::MIN),
        }
    }
}

impl Bounds {
    fn compute_next(&mut self, loc: Pos2) {
        self.min = self.min.min(loc);
        self.max = self.max.max(loc);
    }

    fn rect(&self) -> Option<Rect> {
        (self.min.x <= self.max.x && self.min.y <= self.max.y)
            .then(|| Rect::from_min_max(self.min, self.max))
    }
}

/// Iterative solver. Runs a fixed tick budget with a cooling `alpha`.
#[derive(Debug)]
pub struct Simulation {
    nodes: Vec<SimNode>,
    links: Vec<SimLink>,
    forces: Vec<Box<dyn Force>>,
    alpha: f32,
    alpha_decay: f32,
    settings: SimulationSettings,
}

impl Simulation {
    /// Nodes keep their position; nodes at `None` are seeded on a
    /// phyllotaxis spiral around the canvas center.
    ///
    /// When every node is already placed the run continues a cooled layout
    /// and starts at `warm_alpha` instead of `alpha`.
    pub fn new(
        mut nodes: Vec<SimNode>,
        links: Vec<SimLink>,
        seeded: &[bool],
        settings: &SimulationSettings,
    ) -> Self {
        let center = (settings.canvas / 2.0).to_pos2();
        let mut rng = StdRng::seed_from_u64(settings.seed);
        let golden = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
        let warm = !nodes.is_empty()
            && (0..nodes.len()).all(|i| seeded.get(i).copied().unwrap_or(false));
        for (i, n) in nodes.iter_mut().enumerate() {
            if seeded.get(i).copied().unwrap_or(false) {
                continue;
            }
            let r = INITIAL_RADIUS * (0.5 + i as f32).sqrt();
            let angle = i as f32 * golden;
            let jitter = Vec2::new(rng.random_range(-0.5..0.5), rng.random_range(-0.5..0.5));
            n.pos = center + Vec2::new(r * angle.cos(), r * angle.sin()) + jitter;
        }
        for n in &mut nodes {
            if let Some(fx) = n.fx {
                n.pos.x = fx;
            }
            if let Some(fy) = n.fy {
                n.pos.y = fy;
            }
        }
        Self {
            nodes,
            links,
            forces: Vec::new(),
            alpha: if warm {
                settings.warm_alpha
            } else {
                settings.alpha
            },
            alpha_decay: settings.alpha_decay(),
            settings: settings.clone(),
        }
    }

    /// Simulation over a graph snapshot, with pins and initial positions taken from its nodes.
    pub fn from_graph(g: &GraphSnapshot, settings: &SimulationSettings) -> Self {
        let mut seeded = Vec::with_capacity(g.node_count());
        let nodes = g
            .nodes()
            .iter()
            .map(|n| {
                seeded.push(n.position.is_some());
                let mut sim = SimNode::at(n.id.clone(), n.position.unwrap_or(Pos2::ZERO));
                sim.radius = settings.collide_radius;
                if let Some(pin) = n.pin {
                    sim.pin(pin);
                }
                sim
            })
            .collect();
        let links = g
            .edges()
            .iter()
            .filter_map(|e| {
                let (source, target) = g.endpoints(e)?;
                Some(SimLink {
                    id: e.id.clone(),
                    source,
                    target,
                })
            })
            .collect();
        Self::new(nodes, links, &seeded, settings)
    }

    pub fn add_force(&mut self, force: impl Force + 'static) {
        self.forces.push(Box::new(force));
    }

    /// Replaces all forces with the ones named by `config` and applies its pins.
    pub fn configure(&mut self, config: &ForceConfig) {
        self.forces.clear();
        for n in &mut self.nodes {
            if let Some(pin) = config.pins.get(&n.id) {
                n.pin(*pin);
                if let Some(fx) = n.fx {
                    n.pos.x = fx;
                }
                if let Some(fy) = n.fy {
                    n.pos.y = fy;
                }
            }
        }

        if let Some(link) = &config.link {
            let pairs = self.links.iter().map(|l| (l.source, l.target)).collect();
            let strengths: Vec<Option<f32>> = self
                .links
                .iter()
                .map(|l| link.per_link.get(&l.id).copied())
                .collect();
            self.add_force(Link::new(
                self.nodes.len(),
                pairs,
                &strengths,
                link.distance,
            ));
        }
        if let Some(charge) = &config.charge {
            let strengths = self
                .nodes
                .iter()
                .map(|n| charge.strength_for(&n.id))
                .collect();
            self.add_force(ManyBody {
                strengths,
                distance_min: self.settings.distance_min,
            });
        }
        if let Some(collide) = config.collide {
            for n in &mut self.nodes {
                n.radius = collide.radius;
            }
            self.add_force(Collide {
                strength: collide.strength,
            });
        }
        for (axis, slot) in [(Axis::X, &config.x), (Axis::Y, &config.y)] {
            let Some(force) = slot else { continue };
            let (targets, strengths): (Vec<f32>, Vec<f32>) = self
                .nodes
                .iter()
                .map(|n| {
                    let t = force.target_for(&n.id);
                    (t.target, t.strength.clamp(0.0, 1.0))
                })
                .unzip();
            self.add_force(Position {
                axis,
                targets,
                strengths,
            });
        }
        if let Some(center) = config.center {
            self.add_force(Center::new(center));
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Sets the current heat, e.g. to re-layout a placed graph from scratch.
    pub fn reheat(&mut self, alpha: f32) {
        self.alpha = alpha;
    }

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    /// Advances one tick and returns the mean displacement of free nodes.
    pub fn tick(&mut self) -> f32 {
        self.alpha += (self.settings.alpha_target - self.alpha) * self.alpha_decay;
        for force in &self.forces {
            force.apply(&mut self.nodes, self.alpha);
        }

        let retain = 1.0 - self.settings.velocity_decay;
        let mut moved = 0.0;
        let mut free = 0usize;
        for n in &mut self.nodes {
            let before = n.pos;
            match n.fx {
                Some(fx) => {
                    n.pos.x = fx;
                    n.vel.x = 0.0;
                }
                None => {
                    n.vel.x *= retain;
                    n.pos.x += n.vel.x;
                }
            }
            match n.fy {
                Some(fy) => {
                    n.pos.y = fy;
                    n.vel.y = 0.0;
                }
                None => {
                    n.vel.y *= retain;
                    n.pos.y += n.vel.y;
                }
            }
            if !n.pos.x.is_finite() || !n.pos.y.is_finite() {
                n.pos = before;
                n.vel = Vec2::ZERO;
            }
            if n.fx.is_none() || n.fy.is_none() {
                moved += (n.pos - before).length();
                free += 1;
            }
        }
        if free == 0 {
            0.0
        } else {
            moved / free as f32
        }
    }

    /// Runs the configured tick budget. Returns ticks done.
    pub fn run(&mut self) -> u32 {
        if self.nodes.is_empty() {
            return 0;
        }
        for _ in 0..self.settings.iterations {
            self.tick();
        }
        log::debug!(
            "simulation of {} nodes finished after {} ticks",
            self.nodes.len(),
            self.settings.iterations
        );
        self.settings.iterations
    }

    /// Steps until the mean displacement of a tick drops below `epsilon` or
    /// `max_ticks` is spent. Returns ticks done and the last mean displacement.
    pub fn run_until_stable(&mut self, epsilon: f32, max_ticks: u32) -> (u32, f32) {
        if self.nodes.is_empty() || max_ticks == 0 {
            return (0, 0.0);
        }
        let mut last = f32::INFINITY;
        let mut done = 0;
        while done < max_ticks {
            last = self.tick();
            done += 1;
            if last < epsilon {
                break;
            }
        }
        log::debug!("simulation settled after {done} ticks, mean step {last}");
        (done, last)
    }

    pub fn into_layout(self, ticks: u32) -> Layout {
        let nodes = self
            .nodes
            .into_iter()
            .map(|n| PositionedNode {
                id: n.id,
                position: n.pos,
            })
            .collect();
        let edges = self
            .links
            .into_iter()
            .map(|l| PositionedEdge {
                id: l.id,
                source: l.source,
                target: l.target,
            })
            .collect();
        Layout::new(nodes, edges, ticks)
    }
}

/// Lays out `g` with the forces of `config` over the full tick budget.
pub fn solve(g: &GraphSnapshot, config: &ForceConfig, settings: &SimulationSettings) -> Layout {
    if g.is_empty() {
        return Layout::default();
    }
    let mut sim = Simulation::from_graph(g, settings);
    sim.configure(config);
    let ticks = sim.run();
    sim.into_layout(ticks)
}

use super::{separation_dir, Force};
use crate::layouts::force_directed::simulation::SimNode;

/// Keeps node circles from overlapping. Works on predicted positions and is
/// not scaled by alpha.
#[derive(Debug, Clone)]
pub struct Collide {
    pub strength: f32,
}

impl Force for Collide {
    fn apply(&self, nodes: &mut [SimNode], _alpha: f32) {
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let (ri, rj) = (nodes[i].radius, nodes[j].radius);
                let r = ri + rj;
                let mut delta = (nodes[i].pos + nodes[i].vel) - (nodes[j].pos + nodes[j].vel);
                let mut l = delta.length();
                if l >= r {
                    continue;
                }
                if l == 0.0 {
                    delta = separation_dir(i, j) * 1e-6;
                    l = 1e-6;
                }
                let push = delta * ((r - l) / l * self.strength);
                let (ri2, rj2) = (ri * ri, rj * rj);
                let share = if ri2 + rj2 > 0.0 { rj2 / (ri2 + rj2) } else { 0.5 };
                nodes[i].vel += push * share;
                nodes[j].vel -= push * (1.0 - share);
            }
        }
    }
}

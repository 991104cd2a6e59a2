use egui::Vec2;

use super::{separation_dir, Force};
use crate::layouts::force_directed::simulation::SimNode;

/// Spring between linked nodes with a rest length of `distance`.
///
/// The correction is split between the endpoints by degree so that hubs move
/// less than leaves.
#[derive(Debug, Clone)]
pub struct Link {
    pub links: Vec<(usize, usize)>,
    pub strengths: Vec<f32>,
    pub distance: f32,
    bias: Vec<f32>,
}

impl Link {
    /// `strengths[i]` of `None` falls back to `1 / min(degree(source), degree(target))`.
    pub fn new(
        node_count: usize,
        links: Vec<(usize, usize)>,
        strengths: &[Option<f32>],
        distance: f32,
    ) -> Self {
        let mut count = vec![0usize; node_count];
        for &(s, t) in &links {
            count[s] += 1;
            count[t] += 1;
        }
        let bias = links
            .iter()
            .map(|&(s, t)| count[s] as f32 / (count[s] + count[t]) as f32)
            .collect();
        let strengths = links
            .iter()
            .enumerate()
            .map(|(i, &(s, t))| {
                strengths
                    .get(i)
                    .copied()
                    .flatten()
                    .unwrap_or_else(|| 1.0 / count[s].min(count[t]).max(1) as f32)
            })
            .collect();
        Self {
            links,
            strengths,
            distance,
            bias,
        }
    }
}

impl Force for Link {
    fn apply(&self, nodes: &mut [SimNode], alpha: f32) {
        for (i, &(s, t)) in self.links.iter().enumerate() {
            if s == t {
                continue;
            }
            let mut delta = (nodes[t].pos + nodes[t].vel) - (nodes[s].pos + nodes[s].vel);
            if delta == Vec2::ZERO {
                delta = separation_dir(s, t) * 1e-6;
            }
            let len = delta.length();
            let l = (len - self.distance) / len * alpha * self.strengths[i];
            let pull = delta * l;
            let bias = self.bias[i];
            nodes[t].vel -= pull * bias;
            nodes[s].vel += pull * (1.0 - bias);
        }
    }
}

use super::{separation_dir, Force};
use crate::layouts::force_directed::simulation::SimNode;

/// Pairwise inverse-distance force. Negative strengths repel.
///
/// Node `j` acts on every other node with `strengths[j]`, so amplifying a
/// single node pushes its surroundings away from it.
#[derive(Debug, Clone)]
pub struct ManyBody {
    pub strengths: Vec<f32>,
    pub distance_min: f32,
}

impl Force for ManyBody {
    fn apply(&self, nodes: &mut [SimNode], alpha: f32) {
        let min2 = self.distance_min * self.distance_min;
        for i in 0..nodes.len() {
            for j in 0..nodes.len() {
                if i == j {
                    continue;
                }
                let mut delta = nodes[j].pos - nodes[i].pos;
                let mut l2 = delta.length_sq();
                if l2 == 0.0 {
                    delta = separation_dir(i, j);
                    l2 = 1.0;
                }
                if l2 < min2 {
                    l2 = (min2 * l2).sqrt();
                }
                let w = self.strengths[j] * alpha / l2;
                nodes[i].vel += delta * w;
            }
        }
    }
}

use super::Force;
use crate::layouts::force_directed::simulation::SimNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Pulls each node toward its own target coordinate on one axis.
#[derive(Debug, Clone)]
pub struct Position {
    pub axis: Axis,
    pub targets: Vec<f32>,
    pub strengths: Vec<f32>,
}

impl Force for Position {
    fn apply(&self, nodes: &mut [SimNode], alpha: f32) {
        for (i, n) in nodes.iter_mut().enumerate() {
            let (Some(&target), Some(&strength)) = (self.targets.get(i), self.strengths.get(i))
            else {
                continue;
            };
            match self.axis {
                Axis::X => n.vel.x += (target - n.pos.x) * strength * alpha,
                Axis::Y => n.vel.y += (target - n.pos.y) * strength * alpha,
            }
        }
    }
}

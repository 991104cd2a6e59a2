use egui::{Pos2, Vec2};

use super::Force;
use crate::layouts::force_directed::simulation::SimNode;

/// Translates all nodes so their mean sits on `center`. Not scaled by alpha.
#[derive(Debug, Clone)]
pub struct Center {
    pub center: Pos2,
    pub strength: f32,
}

impl Center {
    pub fn new(center: Pos2) -> Self {
        Self {
            center,
            strength: 1.0,
        }
    }
}

impl Force for Center {
    fn apply(&self, nodes: &mut [SimNode], _alpha: f32) {
        if nodes.is_empty() {
            return;
        }
        let sum = nodes
            .iter()
            .fold(Vec2::ZERO, |acc, n| acc + n.pos.to_vec2());
        let mean = sum / nodes.len() as f32;
        let shift = (self.center.to_vec2() - mean) * self.strength;
        for n in nodes.iter_mut() {
            n.pos += shift;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_mean_to_center() {
        let mut nodes = vec![
            SimNode::at("a", Pos2::new(0.0, 0.0)),
            SimNode::at("b", Pos2::new(10.0, 20.0)),
        ];
        Center::new(Pos2::new(100.0, 100.0)).apply(&mut nodes, 1.0);
        let mean = (nodes[0].pos.to_vec2() + nodes[1].pos.to_vec2()) / 2.0;
        assert!((mean - Vec2::new(100.0, 100.0)).length() < 1e-4);
        assert_eq!(nodes[1].pos - nodes[0].pos, Vec2::new(10.0, 20.0));
    }
}

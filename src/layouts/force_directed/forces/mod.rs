mod center;
mod collide;
mod link;
mod many_body;
mod position;

use egui::Vec2;

pub use center::Center;
pub use collide::Collide;
pub use link::Link;
pub use many_body::ManyBody;
pub use position::{Axis, Position};

use super::simulation::SimNode;

/// A force of the simulation.
///
/// Implementors accumulate into node velocities (or, for [`Center`], shift
/// positions). Forces that follow the cooling schedule scale their effect by
/// `alpha`.
pub trait Force: std::fmt::Debug + Send + Sync {
    fn apply(&self, nodes: &mut [SimNode], alpha: f32);
}

/// Deterministic unit direction for two coincident nodes.
pub(crate) fn separation_dir(a: usize, b: usize) -> Vec2 {
    let angle = ((a as f32) * 0.618_034 + (b as f32) * 0.414_214) * std::f32::consts::TAU;
    Vec2::new(angle.cos(), angle.sin())
}

mod config;
mod forces;
mod simulation;

pub use config::{AxisForce, AxisTarget, ChargeConfig, CollideConfig, ForceConfig, LinkConfig};
pub use forces::{Axis, Center, Collide, Force, Link, ManyBody, Position};
pub use simulation::{
    solve, Layout, PositionedEdge, PositionedNode, SimLink, SimNode, Simulation,
};

use std::collections::HashMap;

use egui::Pos2;
use serde::{Deserialize, Serialize};

use crate::{graph::Pin, settings::SimulationSettings};

/// Target and strength of an axis pull for one node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisTarget {
    pub target: f32,
    pub strength: f32,
}

/// Per-axis pull. Nodes without an entry in `per_node` use the default target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisForce {
    pub default: AxisTarget,
    #[serde(default)]
    pub per_node: HashMap<String, AxisTarget>,
}

impl AxisForce {
    pub fn uniform(target: f32, strength: f32) -> Self {
        Self {
            default: AxisTarget { target, strength },
            per_node: HashMap::new(),
        }
    }

    pub fn target_for(&self, id: &str) -> AxisTarget {
        self.per_node.get(id).copied().unwrap_or(self.default)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    pub distance: f32,
    /// Overrides keyed by link id. Others use the degree-based default.
    #[serde(default)]
    pub per_link: HashMap<String, f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeConfig {
    pub strength: f32,
    /// Multipliers of `strength` keyed by node id.
    #[serde(default)]
    pub multipliers: HashMap<String, f32>,
}

impl ChargeConfig {
    pub fn strength_for(&self, id: &str) -> f32 {
        self.strength * self.multipliers.get(id).copied().unwrap_or(1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollideConfig {
    pub radius: f32,
    pub strength: f32,
}

/// Named force slots of a simulation. An empty slot means that force is off.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForceConfig {
    pub link: Option<LinkConfig>,
    pub charge: Option<ChargeConfig>,
    pub collide: Option<CollideConfig>,
    pub x: Option<AxisForce>,
    pub y: Option<AxisForce>,
    /// Mean-translation toward this point.
    pub center: Option<Pos2>,
    /// Pins keyed by node id, merged over pins carried by the nodes.
    #[serde(default)]
    pub pins: HashMap<String, Pin>,
}

impl ForceConfig {
    /// Links, repulsion, collision and a gentle pull toward the canvas center on both axes.
    pub fn standard(settings: &SimulationSettings) -> Self {
        let center = settings.canvas / 2.0;
        Self {
            link: Some(LinkConfig {
                distance: settings.link_distance,
                per_link: HashMap::new(),
            }),
            charge: Some(ChargeConfig {
                strength: settings.charge,
                multipliers: HashMap::new(),
            }),
            collide: Some(CollideConfig {
                radius: settings.collide_radius,
                strength: settings.collide_strength,
            }),
            x: Some(AxisForce::uniform(center.x, settings.center_strength)),
            y: Some(AxisForce::uniform(center.y, settings.center_strength)),
            center: None,
            pins: HashMap::new(),
        }
    }
}

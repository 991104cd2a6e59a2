use std::time::Duration;

use egui::Vec2;
use serde::{Deserialize, Serialize};

/// Parameters of the force simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Tick budget of a single solve.
    pub iterations: u32,

    /// Starting heat. Forces are scaled by it.
    pub alpha: f32,

    /// Cooling stops here.
    pub alpha_min: f32,

    /// Starting heat when every node already has a position. A converged
    /// layout re-solved from this heat stays where it is.
    pub warm_alpha: f32,

    /// Heat the simulation cools toward.
    pub alpha_target: f32,

    /// Fraction of velocity removed every tick.
    pub velocity_decay: f32,

    /// Rest length of link springs.
    pub link_distance: f32,

    /// Many-body strength applied when nothing overrides it. Negative repels.
    pub charge: f32,

    /// Many-body distances are clamped to at least this value.
    pub distance_min: f32,

    pub collide_radius: f32,
    pub collide_strength: f32,

    /// Pull toward the canvas center on an axis without instruction.
    pub center_strength: f32,

    /// Canvas the layout is computed for.
    pub canvas: Vec2,

    /// Seed for the initial jitter.
    pub seed: u64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            iterations: 300,
            alpha: 1.0,
            alpha_min: 0.001,
            warm_alpha: 0.001,
            alpha_target: 0.0,
            velocity_decay: 0.4,
            link_distance: 30.0,
            charge: -120.0,
            distance_min: 1.0,
            collide_radius: 8.0,
            collide_strength: 0.7,
            center_strength: 0.05,
            canvas: Vec2::new(1000.0, 800.0),
            seed: 0x5eed,
        }
    }
}

impl SimulationSettings {
    /// Decay that brings `alpha` down to `alpha_min` in exactly `iterations` ticks.
    pub fn alpha_decay(&self) -> f32 {
        if self.iterations == 0 || self.alpha_min <= 0.0 || self.alpha <= 0.0 {
            return 0.0;
        }
        1.0 - (self.alpha_min / self.alpha).powf(1.0 / self.iterations as f32)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunitySettings {
    /// Communities smaller than this without external connections are hidden from the meta-graph.
    pub min_size: usize,

    /// Internal edges kept per community for downstream consumers.
    pub internal_edge_cap: usize,

    pub intra_link_strength: f32,
    pub cross_link_strength: f32,

    /// Pull of each node toward its community anchor in the nested pass.
    pub anchor_strength: f32,

    pub max_passes: usize,
    pub min_modularity_gain: f64,
}

impl Default for CommunitySettings {
    fn default() -> Self {
        Self {
            min_size: 3,
            internal_edge_cap: 200,
            intra_link_strength: 0.7,
            cross_link_strength: 0.01,
            anchor_strength: 0.3,
            max_passes: 10,
            min_modularity_gain: 1e-7,
        }
    }
}

/// Opacity of the three focus tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpacityTiers {
    pub focus: f32,
    pub neighbor: f32,
    pub rest: f32,
}

impl Default for OpacityTiers {
    fn default() -> Self {
        Self {
            focus: 1.0,
            neighbor: 0.15,
            rest: 0.05,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionSettings {
    pub duration: Duration,

    /// Share of the duration that passes before fading starts.
    pub fade_delay: f32,

    pub tiers: OpacityTiers,

    /// Fade window, in fade progress, for source-only endpoints of focus edges.
    pub source_window: (f32, f32),

    /// Fade window, in fade progress, for target-only endpoints of focus edges.
    pub target_window: (f32, f32),

    /// Upper bound of the camera scale.
    pub max_scale: f32,

    /// Screen padding around a fitted focus set, in pixels.
    pub padding: f32,
}

impl Default for TransitionSettings {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(800),
            fade_delay: 0.1,
            tiers: OpacityTiers::default(),
            source_window: (0.0, 0.25),
            target_window: (0.45, 0.8),
            max_scale: 4.0,
            padding: 40.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NavigationMode {
    /// The narrative drives the camera.
    #[default]
    Focus,
    /// Gestures fully own the transform.
    FreeExplore,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationSettings {
    pub min_scale: f32,
    pub max_scale: f32,

    /// Zoom step per wheel notch
    pub zoom_speed: f32,

    /// Padding around the graph when fitting to screen
    pub fit_to_screen_padding: f32,

    pub mode: NavigationMode,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 8.0,
            zoom_speed: 0.1,
            fit_to_screen_padding: 0.1,
            mode: NavigationMode::Focus,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_reaches_min_after_budget() {
        let s = SimulationSettings::default();
        let mut alpha = s.alpha;
        let decay = s.alpha_decay();
        for _ in 0..s.iterations {
            alpha += (s.alpha_target - alpha) * decay;
        }
        assert!((alpha - s.alpha_min).abs() < 1e-4);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let s: TransitionSettings = serde_json::from_str(r#"{"max_scale": 2.0}"#).unwrap();
        assert_eq!(s.max_scale, 2.0);
        assert_eq!(s.duration, Duration::from_millis(800));
        assert_eq!(s.tiers, OpacityTiers::default());
    }
}

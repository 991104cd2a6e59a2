mod axis;

use std::collections::HashMap;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

pub use axis::{AxisInstruction, AxisKind, GroupPosition, DEFAULT_AXIS_STRENGTH, TIMELINE_PADDING};
pub(crate) use axis::normalize;

use crate::{
    filter::{filter_subgraph, FilterSpec},
    graph::{GraphSnapshot, Pin},
    layouts::force_directed::{solve, Axis, AxisForce, ForceConfig, Layout},
    settings::SimulationSettings,
    Error, Result,
};

pub const DEFAULT_FOCUS_MULTIPLIER: f32 = 2.0;

fn default_focus_multiplier() -> f32 {
    DEFAULT_FOCUS_MULTIPLIER
}

/// Nodes whose repulsion is amplified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusNodes {
    #[serde(alias = "ids", alias = "nodeIds")]
    pub node_ids: Vec<String>,
    #[serde(default = "default_focus_multiplier", alias = "charge_multiplier")]
    pub multiplier: f32,
}

/// Rendering-only highlight. Has no effect on forces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightNodes {
    #[serde(alias = "ids", alias = "nodeIds")]
    pub node_ids: Vec<String>,
    pub color: String,
}

/// Declarative description of how a layout should look.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutInstruction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_axis: Option<AxisInstruction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_axis: Option<AxisInstruction>,
    /// Global many-body strength. Negative repels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charge: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_nodes: Option<FocusNodes>,
    /// Ids pinned to the canvas center.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub center_nodes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_nodes: Option<HighlightNodes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterSpec>,
}

impl LayoutInstruction {
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Reads each field on its own; a malformed field is logged and left unset.
    pub fn from_value(value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(Error::InvalidInput(
                "layout instruction must be a json object".to_string(),
            ));
        };
        Ok(Self {
            x_axis: field(map, "x_axis"),
            y_axis: field(map, "y_axis"),
            charge: field(map, "charge"),
            focus_nodes: field(map, "focus_nodes"),
            center_nodes: field(map, "center_nodes").unwrap_or_default(),
            highlight_nodes: field(map, "highlight_nodes"),
            filter: field(map, "filter"),
        })
    }

    /// Highlight color keyed by node id.
    pub fn highlights(&self) -> HashMap<String, String> {
        self.highlight_nodes
            .iter()
            .flat_map(|h| h.node_ids.iter().map(|id| (id.clone(), h.color.clone())))
            .collect()
    }
}

fn field<T: DeserializeOwned>(map: &serde_json::Map<String, Value>, key: &str) -> Option<T> {
    let v = map.get(key).filter(|v| !v.is_null())?;
    match serde_json::from_value(v.clone()) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            log::warn!("ignoring malformed instruction field {key}: {err}");
            None
        }
    }
}

/// Translates an instruction into the force configuration of a solve over `g`.
///
/// Axes without instruction keep the standard centering pull.
pub fn interpret(
    instruction: &LayoutInstruction,
    g: &GraphSnapshot,
    settings: &SimulationSettings,
) -> ForceConfig {
    let mut config = ForceConfig::standard(settings);

    for (axis, slot, length) in [
        (Axis::X, &instruction.x_axis, settings.canvas.x),
        (Axis::Y, &instruction.y_axis, settings.canvas.y),
    ] {
        let Some(axis_instruction) = slot else {
            continue;
        };
        let target = match axis {
            Axis::X => &mut config.x,
            Axis::Y => &mut config.y,
        };
        let neutral = target
            .clone()
            .unwrap_or_else(|| AxisForce::uniform(length / 2.0, settings.center_strength));
        *target = axis::interpret_axis(axis_instruction, axis, length, &neutral, g);
    }

    if let Some(charge) = config.charge.as_mut() {
        if let Some(strength) = instruction.charge.filter(|c| c.is_finite()) {
            charge.strength = strength;
        }
        if let Some(focus) = &instruction.focus_nodes {
            for id in &focus.node_ids {
                charge.multipliers.insert(id.clone(), focus.multiplier);
            }
        }
    }

    let center = settings.canvas / 2.0;
    for id in &instruction.center_nodes {
        config.pins.insert(id.clone(), Pin::at(center.to_pos2()));
    }

    config
}

/// Filters (when the instruction carries a filter), interprets and solves.
/// Returns the graph that was laid out together with its layout.
pub fn layout_with_instruction(
    g: &GraphSnapshot,
    instruction: &LayoutInstruction,
    settings: &SimulationSettings,
) -> (GraphSnapshot, Layout) {
    let filtered = match &instruction.filter {
        Some(spec) => filter_subgraph(g, spec),
        None => g.clone(),
    };
    let config = interpret(instruction, &filtered, settings);
    let layout = solve(&filtered, &config, settings);
    (filtered, layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphNode;

    #[test]
    fn unset_axes_keep_centering() {
        let settings = SimulationSettings::default();
        let config = interpret(&LayoutInstruction::default(), &GraphSnapshot::default(), &settings);
        assert_eq!(config, ForceConfig::standard(&settings));
    }

    #[test]
    fn unknown_axis_type_clears_force() {
        let i = LayoutInstruction::from_json(r#"{"x_axis": {"type": "radial"}}"#).unwrap();
        let config = interpret(&i, &GraphSnapshot::default(), &SimulationSettings::default());
        assert!(config.x.is_none());
        assert!(config.y.is_some());
    }

    #[test]
    fn malformed_fields_fall_back() {
        let i = LayoutInstruction::from_json(
            r#"{"x_axis": "sideways", "charge": "lots", "center_nodes": ["a"]}"#,
        )
        .unwrap();
        assert_eq!(i.x_axis, None);
        assert_eq!(i.charge, None);
        assert_eq!(i.center_nodes, vec!["a".to_string()]);
    }

    #[test]
    fn non_object_instruction_is_invalid() {
        assert!(matches!(
            LayoutInstruction::from_json("42"),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn focus_nodes_multiply_charge() {
        let i = LayoutInstruction::from_json(
            r#"{"charge": -200, "focus_nodes": {"node_ids": ["hub"], "multiplier": 3}}"#,
        )
        .unwrap();
        let config = interpret(&i, &GraphSnapshot::default(), &SimulationSettings::default());
        let charge = config.charge.unwrap();
        assert_eq!(charge.strength_for("hub"), -600.0);
        assert_eq!(charge.strength_for("other"), -200.0);
    }

    #[test]
    fn center_nodes_are_pinned_to_canvas_center() {
        let settings = SimulationSettings::default();
        let g = GraphSnapshot::new(vec![GraphNode::new("a"), GraphNode::new("b")], vec![]);
        let i = LayoutInstruction {
            center_nodes: vec!["a".into()],
            ..Default::default()
        };
        let (_, layout) = layout_with_instruction(&g, &i, &settings);
        assert_eq!(layout.position("a"), Some((settings.canvas / 2.0).to_pos2()));
    }

    #[test]
    fn highlights_are_collected() {
        let i = LayoutInstruction::from_json(
            r##"{"highlight_nodes": {"node_ids": ["a", "b"], "color": "#ff0000"}}"##,
        )
        .unwrap();
        let h = i.highlights();
        assert_eq!(h.len(), 2);
        assert_eq!(h["a"], "#ff0000");
    }
}

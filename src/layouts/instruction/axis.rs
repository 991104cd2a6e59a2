use std::{borrow::Cow, collections::HashMap};

use serde::{Deserialize, Serialize};

use crate::{
    graph::{GraphNode, GraphSnapshot},
    layouts::force_directed::{Axis, AxisForce, AxisTarget},
    values::{as_text, value_scalar},
};

/// Instructed strength when an axis instruction omits it.
pub const DEFAULT_AXIS_STRENGTH: f32 = 0.5;

/// Share of the canvas kept free on both ends of a timeline.
pub const TIMELINE_PADDING: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisKind {
    Linear,
    Timeline,
    CategorySeparation,
    #[serde(other)]
    Unknown,
}

/// Where a category lands on its axis: a keyword or an explicit fraction of the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupPosition {
    Fraction(f32),
    Named(String),
}

impl GroupPosition {
    /// Fraction of the axis length. Unknown keywords land in the center.
    pub fn fraction(&self) -> f32 {
        match self {
            Self::Fraction(f) => f.clamp(0.0, 1.0),
            Self::Named(name) => match name.trim().to_lowercase().as_str() {
                "left" | "top" => 0.2,
                "right" | "bottom" => 0.8,
                "center" | "middle" => 0.5,
                other => other.parse::<f32>().map_or(0.5, |f| f.clamp(0.0, 1.0)),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisInstruction {
    #[serde(rename = "type")]
    pub kind: AxisKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<HashMap<String, GroupPosition>>,
    /// For `linear` this is the concentration along the other axis: high
    /// values yield a weak pull on this axis so nodes spread along it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<f32>,
}

impl AxisInstruction {
    pub fn new(kind: AxisKind) -> Self {
        Self {
            kind,
            attribute: None,
            groups: None,
            strength: None,
        }
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = Some(strength);
        self
    }

    pub fn with_group(mut self, value: impl Into<String>, position: GroupPosition) -> Self {
        self.groups
            .get_or_insert_with(HashMap::new)
            .insert(value.into(), position);
        self
    }

    pub fn clamped_strength(&self) -> f32 {
        let s = self.strength.unwrap_or(DEFAULT_AXIS_STRENGTH);
        if s.is_finite() {
            s.clamp(0.0, 1.0)
        } else {
            DEFAULT_AXIS_STRENGTH
        }
    }
}

/// Normalizes `v` into `[0, 1]` over `[min, max]`; an empty range counts as 1 wide.
pub(crate) fn normalize(v: f64, min: f64, max: f64) -> f64 {
    let range = if max - min == 0.0 { 1.0 } else { max - min };
    (v - min) / range
}

/// Turns one axis instruction into an axis force. `None` clears the axis.
pub(crate) fn interpret_axis(
    instruction: &AxisInstruction,
    axis: Axis,
    length: f32,
    neutral: &AxisForce,
    g: &GraphSnapshot,
) -> Option<AxisForce> {
    let center = length / 2.0;
    let strength = instruction.clamped_strength();
    match instruction.kind {
        AxisKind::Linear => Some(AxisForce::uniform(center, 1.0 - strength)),
        AxisKind::Timeline => {
            let Some(attribute) = instruction.attribute.as_deref() else {
                log::warn!("timeline on {axis:?} axis without attribute, using neutral pull");
                return Some(neutral.clone());
            };
            Some(timeline(g, attribute, length, strength).unwrap_or_else(|| neutral.clone()))
        }
        AxisKind::CategorySeparation => {
            let Some(attribute) = instruction.attribute.as_deref() else {
                log::warn!("category separation on {axis:?} axis without attribute, using neutral pull");
                return Some(neutral.clone());
            };
            let empty = HashMap::new();
            let groups = instruction.groups.as_ref().unwrap_or(&empty);
            Some(categories(g, attribute, groups, length, strength))
        }
        AxisKind::Unknown => {
            log::warn!("unknown instruction type on {axis:?} axis, clearing its force");
            None
        }
    }
}

fn attribute_value<'a>(node: &'a GraphNode, attribute: &str) -> Option<Cow<'a, serde_json::Value>> {
    match attribute {
        "label" => Some(Cow::Owned(node.label.clone().into())),
        "name" => Some(Cow::Owned(node.name.clone().into())),
        _ => node.properties.get(attribute).map(Cow::Borrowed),
    }
}

fn timeline(g: &GraphSnapshot, attribute: &str, length: f32, strength: f32) -> Option<AxisForce> {
    let values: Vec<(String, f64)> = g
        .nodes()
        .iter()
        .filter_map(|n| {
            let v = attribute_value(n, attribute)?;
            Some((n.id.clone(), value_scalar(&v)?))
        })
        .collect();
    let min = values.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);
    let max = values
        .iter()
        .map(|(_, v)| *v)
        .fold(f64::NEG_INFINITY, f64::max);
    if values.is_empty() || min == max {
        log::debug!("timeline on {attribute} has a degenerate range, using neutral pull");
        return None;
    }

    let span = 1.0 - 2.0 * TIMELINE_PADDING;
    let mut force = AxisForce::uniform(length / 2.0, strength);
    for (id, v) in values {
        let frac = TIMELINE_PADDING + normalize(v, min, max) as f32 * span;
        force.per_node.insert(
            id,
            AxisTarget {
                target: frac * length,
                strength,
            },
        );
    }
    Some(force)
}

fn categories(
    g: &GraphSnapshot,
    attribute: &str,
    groups: &HashMap<String, GroupPosition>,
    length: f32,
    strength: f32,
) -> AxisForce {
    let mut force = AxisForce::uniform(length / 2.0, strength);
    for n in g.nodes() {
        let Some(position) = attribute_value(n, attribute)
            .and_then(|v| as_text(&v))
            .and_then(|key| groups.get(&key))
        else {
            continue;
        };
        force.per_node.insert(
            n.id.clone(),
            AxisTarget {
                target: position.fraction() * length,
                strength,
            },
        );
    }
    force
}

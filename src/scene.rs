use std::collections::HashMap;

use egui::Pos2;
use serde::{Deserialize, Serialize};

use crate::{layouts::Layout, transition::Frame, viewport::Transform};

/// Node radius on the canvas, before scaling.
pub const NODE_RADIUS: f32 = 6.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub id: String,
    pub center: Pos2,
    pub radius: f32,
    pub opacity: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEdge {
    pub id: String,
    pub from: Pos2,
    pub to: Pos2,
    pub opacity: f32,
}

/// Screen-space description of one frame, ready for a vector renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub nodes: Vec<SceneNode>,
    pub edges: Vec<SceneEdge>,
}

/// Projects a layout through `transform`, with opacities from `frame` and
/// colors from `highlights`. An edge is as visible as its fainter endpoint.
pub fn render_scene(
    layout: &Layout,
    frame: &Frame,
    highlights: &HashMap<String, String>,
    transform: &Transform,
) -> Scene {
    let nodes: Vec<SceneNode> = layout
        .nodes
        .iter()
        .map(|n| SceneNode {
            id: n.id.clone(),
            center: transform.canvas_to_screen(n.position),
            radius: NODE_RADIUS * transform.scale,
            opacity: frame.opacity(&n.id),
            color: highlights.get(&n.id).cloned(),
        })
        .collect();
    let edges = layout
        .edges
        .iter()
        .filter_map(|e| {
            let (source, target) = (nodes.get(e.source)?, nodes.get(e.target)?);
            Some(SceneEdge {
                id: e.id.clone(),
                from: source.center,
                to: target.center,
                opacity: source.opacity.min(target.opacity),
            })
        })
        .collect();
    Scene { nodes, edges }
}

#[cfg(test)]
mod tests {
    use egui::Vec2;

    use super::*;
    use crate::layouts::force_directed::{PositionedEdge, PositionedNode};

    fn layout() -> Layout {
        Layout::new(
            vec![
                PositionedNode {
                    id: "a".into(),
                    position: Pos2::new(0.0, 0.0),
                },
                PositionedNode {
                    id: "b".into(),
                    position: Pos2::new(10.0, 20.0),
                },
            ],
            vec![PositionedEdge {
                id: "ab".into(),
                source: 0,
                target: 1,
            }],
            0,
        )
    }

    #[test]
    fn projects_through_transform() {
        let transform = Transform {
            scale: 2.0,
            translate: Vec2::new(100.0, 0.0),
        };
        let frame = Frame {
            opacities: HashMap::from([("a".to_string(), 0.15), ("b".to_string(), 1.0)]),
            ..Default::default()
        };
        let highlights = HashMap::from([("b".to_string(), "#ffcc00".to_string())]);
        let scene = render_scene(&layout(), &frame, &highlights, &transform);

        assert_eq!(scene.nodes[1].center, Pos2::new(120.0, 40.0));
        assert_eq!(scene.nodes[1].radius, 12.0);
        assert_eq!(scene.nodes[1].color.as_deref(), Some("#ffcc00"));
        assert_eq!(scene.nodes[0].color, None);
        assert_eq!(scene.edges[0].from, Pos2::new(100.0, 0.0));
        assert_eq!(scene.edges[0].opacity, 0.15);
    }

    #[test]
    fn inputs_are_untouched() {
        let l = layout();
        let before = l.nodes.clone();
        let frame = Frame::default();
        render_scene(&l, &frame, &HashMap::new(), &Transform::default());
        assert_eq!(l.nodes, before);
        assert_eq!(frame, Frame::default());
    }
}

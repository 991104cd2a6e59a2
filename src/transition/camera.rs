use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use super::easing::lerp;

/// Scale and canvas point shown in the middle of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub scale: f32,
    pub center: Pos2,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            scale: 1.0,
            center: Pos2::ZERO,
        }
    }
}

impl Camera {
    /// Camera that fits `bounds` into `viewport` leaving `padding` pixels on
    /// every side. The scale never exceeds `max_scale`, so a single node or a
    /// flat row does not zoom in without limit.
    pub fn fit(bounds: Rect, viewport: Vec2, padding: f32, max_scale: f32) -> Self {
        let size = bounds.size();
        let available = Vec2::new(
            (viewport.x - 2.0 * padding).max(1.0),
            (viewport.y - 2.0 * padding).max(1.0),
        );
        let scale_x = if size.x > 0.0 {
            available.x / size.x
        } else {
            f32::INFINITY
        };
        let scale_y = if size.y > 0.0 {
            available.y / size.y
        } else {
            f32::INFINITY
        };
        let mut scale = scale_x.min(scale_y).min(max_scale);
        if !scale.is_finite() || scale <= 0.0 {
            scale = 1.0;
        }
        Self {
            scale,
            center: bounds.center(),
        }
    }

    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            scale: lerp(self.scale, other.scale, t),
            center: Pos2::new(
                lerp(self.center.x, other.center.x, t),
                lerp(self.center.y, other.center.y, t),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_with_padding() {
        let bounds = Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(100.0, 50.0));
        let cam = Camera::fit(bounds, Vec2::new(300.0, 300.0), 50.0, 10.0);
        assert_eq!(cam.scale, 2.0);
        assert_eq!(cam.center, Pos2::new(50.0, 25.0));
    }

    #[test]
    fn single_point_is_clamped() {
        let bounds = Rect::from_min_max(Pos2::new(5.0, 5.0), Pos2::new(5.0, 5.0));
        let cam = Camera::fit(bounds, Vec2::new(800.0, 600.0), 40.0, 4.0);
        assert_eq!(cam.scale, 4.0);
        assert_eq!(cam.center, Pos2::new(5.0, 5.0));
    }

    #[test]
    fn lerp_is_linear() {
        let a = Camera::default();
        let b = Camera {
            scale: 3.0,
            center: Pos2::new(10.0, -10.0),
        };
        let mid = a.lerp(&b, 0.5);
        assert_eq!(mid.scale, 2.0);
        assert_eq!(mid.center, Pos2::new(5.0, -5.0));
    }
}

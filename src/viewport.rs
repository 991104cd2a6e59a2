use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

#[cfg(feature = "events")]
use crate::events::{Event, PayloadViewportChanged, Publisher};
use crate::{
    settings::{NavigationMode, NavigationSettings},
    transition::{Camera, Frame},
};

/// Affine canvas-to-screen mapping: `screen = canvas * scale + translate`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub scale: f32,
    pub translate: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate: Vec2::ZERO,
        }
    }
}

impl Transform {
    /// Transform showing `camera.center` in the middle of a `viewport`-sized screen.
    pub fn from_camera(camera: &Camera, viewport: Vec2) -> Self {
        Self {
            scale: camera.scale,
            translate: viewport / 2.0 - camera.center.to_vec2() * camera.scale,
        }
    }

    pub fn canvas_to_screen(&self, p: Pos2) -> Pos2 {
        (p.to_vec2() * self.scale + self.translate).to_pos2()
    }

    pub fn screen_to_canvas(&self, p: Pos2) -> Pos2 {
        ((p.to_vec2() - self.translate) / self.scale).to_pos2()
    }
}

/// Owns the single view transform. The animator and user gestures both write it.
#[derive(Debug, Clone)]
pub struct ViewportController {
    transform: Transform,
    /// Transform the gesture handler last saw. Stale after a programmatic write.
    gesture_base: Transform,
    /// Set by programmatic writes, cleared once a gesture picked them up.
    programmatic: Option<Transform>,
    viewport: Vec2,
    settings: NavigationSettings,

    #[cfg(feature = "events")]
    events: Publisher,
}

impl ViewportController {
    pub fn new(viewport: Vec2, settings: NavigationSettings) -> Self {
        Self {
            transform: Transform::default(),
            gesture_base: Transform::default(),
            programmatic: None,
            viewport,
            settings,
            #[cfg(feature = "events")]
            events: Publisher::default(),
        }
    }

    #[cfg(feature = "events")]
    pub fn with_events(mut self, events: Publisher) -> Self {
        self.events = events;
        self
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn mode(&self) -> NavigationMode {
        self.settings.mode
    }

    pub fn set_mode(&mut self, mode: NavigationMode) {
        self.settings.mode = mode;
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Vec2) {
        self.viewport = viewport;
    }

    /// Applies an animator frame. Ignored while exploring freely; returns
    /// whether the transform was written.
    pub fn apply_frame(&mut self, frame: &Frame) -> bool {
        if self.settings.mode == NavigationMode::FreeExplore {
            return false;
        }
        self.set_programmatic(Transform::from_camera(&frame.camera(), self.viewport));
        true
    }

    /// Fits `bounds` into the viewport, keeping `fit_to_screen_padding` as a
    /// share of the graph size around it.
    pub fn fit_to_screen(&mut self, bounds: Option<Rect>) {
        let bounds = bounds
            .filter(|b| b.min.is_finite() && b.max.is_finite() && b.min.x <= b.max.x && b.min.y <= b.max.y)
            .unwrap_or_else(|| Rect::from_min_max(Pos2::new(-0.5, -0.5), Pos2::new(0.5, 0.5)));
        let mut diag = bounds.size();
        if diag.x <= 0.0 || diag.y <= 0.0 {
            diag = Vec2::new(diag.x.max(1.0), diag.y.max(1.0));
        }
        let graph_size = diag * (1.0 + self.settings.fit_to_screen_padding);
        let zoom_x = (self.viewport.x / graph_size.x.max(1e-3)).abs();
        let zoom_y = (self.viewport.y / graph_size.y.max(1e-3)).abs();
        let mut scale = zoom_x.min(zoom_y);
        if !scale.is_finite() || scale <= 0.0 {
            scale = 1.0;
        }
        let camera = Camera {
            scale: self.clamp_scale(scale),
            center: bounds.center(),
        };
        self.set_programmatic(Transform::from_camera(&camera, self.viewport));
    }

    /// Gesture pan by a screen-space delta.
    pub fn pan(&mut self, delta: Vec2) {
        let mut next = self.reconcile();
        next.translate += delta;
        self.set_from_gesture(next);
    }

    /// Gesture zoom by `delta` (0.1 is ten percent in). The anchor stays in
    /// place on screen; the viewport center is used without one.
    pub fn zoom(&mut self, delta: f32, anchor: Option<Pos2>) {
        let base = self.reconcile();
        let anchor = anchor.unwrap_or((self.viewport / 2.0).to_pos2()).to_vec2();
        let canvas_anchor = (anchor - base.translate) / base.scale;
        let scale = self.clamp_scale(base.scale * (1.0 + delta));
        let translate = base.translate + canvas_anchor * base.scale - canvas_anchor * scale;
        self.set_from_gesture(Transform { scale, translate });
    }

    /// One wheel notch in (`notches > 0`) or out.
    pub fn wheel(&mut self, notches: f32, anchor: Option<Pos2>) {
        if notches == 0.0 {
            return;
        }
        self.zoom(self.settings.zoom_speed * notches.signum(), anchor);
    }

    /// Brings the gesture state up to date with the last programmatic write.
    fn reconcile(&mut self) -> Transform {
        if let Some(programmatic) = self.programmatic.take() {
            log::trace!("gesture reconciled with programmatic transform {programmatic:?}");
            self.gesture_base = programmatic;
        }
        self.gesture_base
    }

    fn clamp_scale(&self, scale: f32) -> f32 {
        scale.clamp(self.settings.min_scale, self.settings.max_scale)
    }

    fn set_programmatic(&mut self, transform: Transform) {
        self.programmatic = Some(transform);
        self.set_transform(transform, false);
    }

    fn set_from_gesture(&mut self, transform: Transform) {
        self.gesture_base = transform;
        self.set_transform(transform, true);
    }

    #[cfg_attr(not(feature = "events"), allow(unused_variables))]
    fn set_transform(&mut self, transform: Transform, by_gesture: bool) {
        if self.transform == transform {
            return;
        }
        self.transform = transform;

        #[cfg(feature = "events")]
        self.events
            .publish(Event::ViewportChanged(PayloadViewportChanged {
                scale: transform.scale,
                translate: transform.translate.into(),
                by_gesture,
            }));
    }
}

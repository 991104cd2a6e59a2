//! Focus transitions: camera and opacity interpolated between two focus sets.
//!
//! Every frame is a pure function of a [`Transition`] snapshot and the elapsed
//! time, so a recorder can request any frame of a finished transition.

mod camera;
mod easing;
mod focus;

use std::{collections::HashMap, time::Duration};

use egui::{Pos2, Vec2};
use serde::{Deserialize, Serialize};

pub use camera::Camera;
pub use easing::{ease_in_out_cubic, ease_out_cubic, lerp, window};
pub use focus::{FadeRole, FocusSet, Segment, Tier};

use focus::{classify, Resolved};

#[cfg(feature = "events")]
use crate::events::{
    Event, PayloadTransitionFinished, PayloadTransitionStarted, PayloadTransitionSuperseded,
    Publisher,
};
use crate::{layouts::Layout, settings::TransitionSettings};

/// What the drawing layer needs for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub scale: f32,
    pub center_x: f32,
    pub center_y: f32,
    pub opacities: HashMap<String, f32>,
}

impl Frame {
    pub fn camera(&self) -> Camera {
        Camera {
            scale: self.scale,
            center: Pos2::new(self.center_x, self.center_y),
        }
    }

    /// Opacity of a node. Nodes unknown to the frame are fully visible.
    pub fn opacity(&self, id: &str) -> f32 {
        self.opacities.get(id).copied().unwrap_or(1.0)
    }

    fn new(camera: Camera, opacities: HashMap<String, f32>) -> Self {
        Self {
            scale: camera.scale,
            center_x: camera.center.x,
            center_y: camera.center.y,
            opacities,
        }
    }
}

/// Frozen description of one transition: where it comes from, where it goes
/// and when it started.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub from: Frame,
    pub target: Frame,
    pub focus: FocusSet,
    pub roles: HashMap<String, FadeRole>,
    pub start: Duration,
    pub duration: Duration,
}

impl Transition {
    /// Linear progress in `[0, 1]`, clamped after the duration.
    pub fn progress(&self, now: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.start);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self, now: Duration) -> bool {
        now.saturating_sub(self.start) >= self.duration
    }

    /// Frame at `now`.
    pub fn frame(&self, now: Duration, settings: &TransitionSettings) -> Frame {
        let p = self.progress(now);
        let view = ease_in_out_cubic(p);
        let fade = fade_progress(p, settings.fade_delay);
        let camera = self.from.camera().lerp(&self.target.camera(), view);

        let opacities = self
            .target
            .opacities
            .iter()
            .map(|(id, to)| {
                let from = self.from.opacity(id);
                let t = match self.roles.get(id).copied().unwrap_or(FadeRole::Plain) {
                    FadeRole::SourceOnly | FadeRole::Both => window(fade, settings.source_window),
                    FadeRole::TargetOnly => window(fade, settings.target_window),
                    FadeRole::Plain => fade,
                };
                (id.clone(), lerp(from, *to, t))
            })
            .collect();
        Frame::new(camera, opacities)
    }
}

/// Eased opacity progress, held at zero until `delay` of the linear progress passed.
pub fn fade_progress(progress: f32, delay: f32) -> f32 {
    let delay = delay.clamp(0.0, 0.99);
    ease_out_cubic((progress - delay) / (1.0 - delay))
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnimatorState {
    /// Showing `Frame` with nothing in flight.
    Idle(Frame),
    Transitioning(Transition),
}

/// Two-state machine driving camera and opacity from focus changes.
///
/// The animator never reads a clock itself. Callers pass the elapsed time,
/// usually from a [`FrameClock`].
#[derive(Debug, Clone)]
pub struct Animator {
    layout: Layout,
    viewport: Vec2,
    settings: TransitionSettings,
    state: AnimatorState,

    #[cfg(feature = "events")]
    events: Publisher,
}

impl Animator {
    /// Starts idle, showing the whole layout with every node in focus.
    pub fn new(layout: Layout, viewport: Vec2, settings: TransitionSettings) -> Self {
        let mut animator = Self {
            layout,
            viewport,
            settings,
            state: AnimatorState::Idle(Frame::default()),
            #[cfg(feature = "events")]
            events: Publisher::default(),
        };
        let resolved = Resolved::new(&FocusSet::default(), &animator.layout);
        animator.state = AnimatorState::Idle(animator.target_frame(&FocusSet::default(), &resolved));
        animator
    }

    #[cfg(feature = "events")]
    pub fn with_events(mut self, events: Publisher) -> Self {
        self.events = events;
        self
    }

    pub fn state(&self) -> &AnimatorState {
        &self.state
    }

    pub fn transition(&self) -> Option<&Transition> {
        match &self.state {
            AnimatorState::Transitioning(t) => Some(t),
            AnimatorState::Idle(_) => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, AnimatorState::Idle(_))
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn set_viewport(&mut self, viewport: Vec2) {
        self.viewport = viewport;
    }

    /// Frame at `now`, without changing any state.
    pub fn frame_at(&self, now: Duration) -> Frame {
        match &self.state {
            AnimatorState::Idle(frame) => frame.clone(),
            AnimatorState::Transitioning(t) => t.frame(now, &self.settings),
        }
    }

    /// Starts a transition toward `focus`. A transition in flight is
    /// superseded; its frame at `now` becomes the new starting point.
    pub fn set_focus(&mut self, focus: FocusSet, now: Duration) {
        let from = self.frame_at(now);
        if let AnimatorState::Transitioning(previous) = &self.state {
            log::debug!(
                "transition superseded at progress {:.3}",
                previous.progress(now)
            );
            #[cfg(feature = "events")]
            self.events
                .publish(Event::TransitionSuperseded(PayloadTransitionSuperseded {
                    progress: previous.progress(now),
                }));
        }

        let resolved = Resolved::new(&focus, &self.layout);
        let target = self.target_frame(&focus, &resolved);
        log::debug!(
            "transition started toward {} nodes and {} edges",
            focus.node_ids.len(),
            focus.edge_ids.len()
        );
        #[cfg(feature = "events")]
        self.events
            .publish(Event::TransitionStarted(PayloadTransitionStarted {
                focus_nodes: focus.node_ids.len(),
                focus_edges: focus.edge_ids.len(),
            }));

        self.state = AnimatorState::Transitioning(Transition {
            from,
            target,
            focus,
            roles: resolved.roles,
            start: now,
            duration: self.settings.duration,
        });
    }

    /// Returns the frame at `now` and goes idle once the transition is over.
    pub fn tick(&mut self, now: Duration) -> Frame {
        let frame = self.frame_at(now);
        if let AnimatorState::Transitioning(t) = &self.state {
            if t.is_finished(now) {
                log::debug!("transition finished");
                #[cfg(feature = "events")]
                self.events
                    .publish(Event::TransitionFinished(PayloadTransitionFinished {
                        scale: frame.scale,
                        center: [frame.center_x, frame.center_y],
                    }));
                self.state = AnimatorState::Idle(frame.clone());
            }
        }
        frame
    }

    /// Stops a transition in flight, keeping the frame reached at `now`.
    pub fn cancel(&mut self, now: Duration) {
        if !self.is_idle() {
            self.state = AnimatorState::Idle(self.frame_at(now));
        }
    }

    fn target_frame(&self, focus: &FocusSet, resolved: &Resolved) -> Frame {
        let bounds = self
            .layout
            .bounds_of(resolved.focus.iter().map(String::as_str))
            .or_else(|| self.layout.bounds());
        let camera = bounds.map_or_else(Camera::default, |b| {
            Camera::fit(b, self.viewport, self.settings.padding, self.settings.max_scale)
        });
        if !focus.is_empty() && resolved.focus.is_empty() {
            log::debug!("focus set names no known node, fitting the whole graph");
        }
        let opacities = classify(resolved, &self.layout)
            .into_iter()
            .map(|(id, tier)| (id, tier.opacity(&self.settings.tiers)))
            .collect();
        Frame::new(camera, opacities)
    }
}

/// Elapsed time since the clock was started.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    start: instant::Instant,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            start: instant::Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PayloadTransitionStarted {
    pub focus_nodes: usize,
    pub focus_edges: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PayloadTransitionSuperseded {
    /// Progress the interrupted transition had reached.
    pub progress: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PayloadTransitionFinished {
    pub scale: f32,
    pub center: [f32; 2],
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PayloadViewportChanged {
    pub scale: f32,
    pub translate: [f32; 2],
    /// `true` when a gesture moved the viewport, `false` for the animator.
    pub by_gesture: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    TransitionStarted(PayloadTransitionStarted),
    TransitionSuperseded(PayloadTransitionSuperseded),
    TransitionFinished(PayloadTransitionFinished),
    ViewportChanged(PayloadViewportChanged),
}

mod community;
mod error;
mod filter;
mod graph;
mod scene;
mod scheduler;
mod settings;
mod transition;
mod values;
mod viewport;

pub mod layouts;

pub use self::community::{
    build_meta_graph, community_anchors, detect, nested_layout, try_build_meta_graph, Community,
    CommunityError, CommunityId, DetailNode, ExternalConnection, MetaEdge, MetaGraph, MetaNode,
    NarrativeStep, NestedLayout, Partition,
};
pub use self::error::{Error, Result};
pub use self::filter::{
    filter_subgraph, hop_distances, Condition, FilterSpec, Logic, Operator, DEFAULT_MAX_HOPS,
};
pub use self::graph::{GraphEdge, GraphNode, GraphSnapshot, Pin, Properties};
pub use self::layouts::{
    interpret, layout_with_instruction, solve, ForceConfig, Layout, LayoutInstruction, Simulation,
};
pub use self::scene::{render_scene, Scene, SceneEdge, SceneNode, NODE_RADIUS};
pub use self::scheduler::{CancellationToken, ReadyJob, RecomputeScheduler};
pub use self::settings::{
    CommunitySettings, NavigationMode, NavigationSettings, OpacityTiers, SimulationSettings,
    TransitionSettings,
};
pub use self::transition::{
    ease_in_out_cubic, ease_out_cubic, fade_progress, Animator, AnimatorState, Camera, FadeRole,
    FocusSet, Frame, FrameClock, Segment, Tier, Transition,
};
pub use self::viewport::{Transform, ViewportController};

#[cfg(feature = "events")]
pub mod events;

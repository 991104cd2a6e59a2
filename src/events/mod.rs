mod event;
mod sink;

pub use event::{
    Event, PayloadTransitionFinished, PayloadTransitionStarted, PayloadTransitionSuperseded,
    PayloadViewportChanged,
};

pub use sink::{EventSink, FnSink, Publisher};

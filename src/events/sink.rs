use std::{fmt, sync::Arc};

use crossbeam::channel::Sender;

use super::Event;

/// Receiver of published events.
pub trait EventSink: Send + Sync {
    fn send(&self, event: Event);
}

impl EventSink for Sender<Event> {
    fn send(&self, event: Event) {
        // a dropped receiver only means nobody listens anymore
        let _ = Sender::send(self, event);
    }
}

/// Sink calling a closure for every event.
pub struct FnSink<F>(pub F);

impl<F> EventSink for FnSink<F>
where
    F: Fn(Event) + Send + Sync,
{
    fn send(&self, event: Event) {
        (self.0)(event);
    }
}

/// Optional sink shared by the components that publish events.
#[derive(Clone, Default)]
pub struct Publisher {
    sink: Option<Arc<dyn EventSink>>,
}

impl Publisher {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink: Some(sink) }
    }

    pub fn publish(&self, event: Event) {
        if let Some(sink) = &self.sink {
            sink.send(event);
        }
    }
}

impl fmt::Debug for Publisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publisher")
            .field("attached", &self.sink.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::events::PayloadTransitionSuperseded;

    fn event() -> Event {
        Event::TransitionSuperseded(PayloadTransitionSuperseded { progress: 0.25 })
    }

    #[test]
    fn channel_sink_delivers() {
        let (tx, rx) = crossbeam::channel::unbounded();
        let publisher = Publisher::new(Arc::new(tx));
        publisher.publish(event());
        assert_eq!(rx.try_recv().unwrap(), event());
    }

    #[test]
    fn closure_sink_delivers() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let store = Arc::clone(&seen);
        let publisher = Publisher::new(Arc::new(FnSink(move |e: Event| {
            store.lock().unwrap().push(e);
        })));
        publisher.publish(event());
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn detached_publisher_is_silent() {
        Publisher::default().publish(event());
    }
}

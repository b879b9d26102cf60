mod view;
pub use view::{View, log_event, message_for};

use std::sync::{Arc, Mutex};

use scout_model::{Event, EventKind};

/// Sink for discovery and peer propagation events.
///
/// Called inline from the poll loop, so implementations must not block.
pub trait Observer: Send + Sync + 'static {
    fn on_event(&self, event: &Event);
}

/// Observer that writes every event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn on_event(&self, event: &Event) {
        log_event(event);
    }
}

/// Shared default observer.
pub fn log_observer() -> Arc<dyn Observer> {
    Arc::new(LogObserver)
}

/// Observer that keeps every event in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryObserver {
    events: Arc<Mutex<Vec<Event>>>,
}

impl MemoryObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn of_kind(&self, kind: EventKind) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| e.kind == kind)
            .collect()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.of_kind(kind).len()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl Observer for MemoryObserver {
    fn on_event(&self, event: &Event) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

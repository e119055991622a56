//! Notifier that keeps every event for later assertions.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::port::outbound::notifier::{ActionEvent, Event, Notifier};

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    /// Only the per-action events, in order.
    pub fn actions(&self) -> Vec<ActionEvent> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Event::ActionCompleted(action) => Some(action.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self) -> usize {
        self.events.lock().len()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: Event) {
        self.events.lock().push(event);
    }
}

use std::collections::VecDeque;

use diceforge_models::events::Event;

pub const DEFAULT_RING_CAPACITY: usize = 10_000;

/// In-process, synchronous fan-out event bus.
///
/// Deliberately not a process-global singleton: a parallel sweep runs one
/// session per worker thread, each with its own bus, so two sessions never
/// contend on or interleave through shared bus state.
pub struct EventBus {
    listeners: Vec<Box<dyn FnMut(&Event) + Send>>,
    ring: VecDeque<Event>,
    capacity: usize,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        Self {
            listeners: Vec::new(),
            ring: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&Event) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Fan out to every listener synchronously, then retain the event in
    /// the bounded ring for later inspection (e.g. a runner's detailed log
    /// sink draining after the session ends).
    pub fn publish(&mut self, event: Event) {
        for listener in &mut self.listeners {
            listener(&event);
        }
        if self.ring.len() == self.capacity {
            self.ring.pop_front();
        }
        self.ring.push_back(event);
    }

    pub fn recent(&self) -> impl Iterator<Item = &Event> {
        self.ring.iter()
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_RING_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diceforge_models::events::EventKind;
    use std::sync::{Arc, Mutex};

    #[test]
    fn listeners_see_every_published_event() {
        let mut bus = EventBus::new(16);
        let seen = Arc::new(Mutex::new(0));
        let seen_clone = Arc::clone(&seen);
        bus.subscribe(move |_| *seen_clone.lock().unwrap() += 1);

        bus.publish(Event::new(None, EventKind::StrategyToggle));
        bus.publish(Event::new(None, EventKind::StrategySeedChange));

        assert_eq!(*seen.lock().unwrap(), 2);
    }

    #[test]
    fn ring_buffer_evicts_oldest_entries() {
        let mut bus = EventBus::new(2);
        for _ in 0..5 {
            bus.publish(Event::new(None, EventKind::StrategyToggle));
        }
        assert_eq!(bus.len(), 2);
    }
}

use std::sync::atomic::{ AtomicU64, Ordering };
use std::sync::Arc;

use dashmap::DashMap;

#[derive(Hash, Eq, PartialEq, Debug, Clone, Copy)]
pub enum EventType {
    PointerMove,
    PointerPress,
}

/// Pointer position in physical window pixels along with the window size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub event_type: EventType,
    pub pointer: PointerSample,
}

impl Event {
    pub fn pointer_move(pointer: PointerSample) -> Self {
        Self { event_type: EventType::PointerMove, pointer }
    }

    pub fn pointer_press(pointer: PointerSample) -> Self {
        Self { event_type: EventType::PointerPress, pointer }
    }
}

pub trait EventListener {
    fn event(&self, event: &Event);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Fire-and-forget fan-out of input events to subscribed listeners
pub struct EventSystem {
    subscribers: DashMap<EventType, Vec<(SubscriptionId, Arc<dyn EventListener>)>>,
    next_id: AtomicU64,
}

impl EventSystem {
    pub fn new() -> Self {
        Self {
            subscribers: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn subscribe(&self, event_type: EventType, listener: Arc<dyn EventListener>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.entry(event_type).or_default().push((id, listener));
        id
    }

    /// Drop one subscription. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        for mut entry in self.subscribers.iter_mut() {
            entry.value_mut().retain(|(sub, _)| *sub != id);
        }
    }

    pub fn subscriber_count(&self, event_type: EventType) -> usize {
        self.subscribers.get(&event_type).map_or(0, |subs| subs.len())
    }

    pub fn notify(&self, event: Event) {
        // Clone the list so listeners may (un)subscribe while being notified
        let listeners: Vec<Arc<dyn EventListener>> = match self.subscribers.get(&event.event_type) {
            Some(subs) => subs.iter().map(|(_, l)| l.clone()).collect(),
            None => return,
        };
        for listener in listeners {
            listener.event(&event);
        }
    }
}

impl Default for EventSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSystem").field("subscribers_count", &self.subscribers.len()).finish()
    }
}

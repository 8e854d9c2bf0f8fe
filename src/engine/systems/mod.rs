pub mod event_system;
pub mod input_system;

pub use event_system::{ Event, EventListener, EventSystem, EventType, PointerSample, SubscriptionId };
pub use input_system::PointerState;

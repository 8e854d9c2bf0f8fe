use std::sync::Mutex;

use super::event_system::{ Event, EventListener, EventType, PointerSample };

/// Collects pointer events between frames.
///
/// The host pushes events as winit delivers them; the frame callback reads
/// the latest position and drains presses, so input never blocks rendering.
#[derive(Debug, Default)]
pub struct PointerState {
    latest: Mutex<Option<PointerSample>>,
    presses: Mutex<Vec<PointerSample>>,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<PointerSample> {
        *self.latest.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn take_presses(&self) -> Vec<PointerSample> {
        std::mem::take(&mut *self.presses.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

impl EventListener for PointerState {
    fn event(&self, event: &Event) {
        *self.latest.lock().unwrap_or_else(|e| e.into_inner()) = Some(event.pointer);
        if event.event_type == EventType::PointerPress {
            log::debug!("[INPUT] Press at ({:.0}, {:.0})", event.pointer.x, event.pointer.y);
            self.presses.lock().unwrap_or_else(|e| e.into_inner()).push(event.pointer);
        } else {
            log::trace!("[INPUT] Pointer at ({:.0}, {:.0})", event.pointer.x, event.pointer.y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::systems::EventSystem;
    use std::sync::Arc;

    fn at(x: f64, y: f64) -> PointerSample {
        PointerSample { x, y, width: 800.0, height: 600.0 }
    }

    #[test]
    fn tracks_latest_position_and_drains_presses() {
        let events = EventSystem::new();
        let pointer = Arc::new(PointerState::new());
        events.subscribe(EventType::PointerMove, pointer.clone());
        events.subscribe(EventType::PointerPress, pointer.clone());

        assert_eq!(pointer.latest(), None);
        events.notify(Event::pointer_move(at(10.0, 20.0)));
        events.notify(Event::pointer_press(at(30.0, 40.0)));

        assert_eq!(pointer.latest(), Some(at(30.0, 40.0)));
        assert_eq!(pointer.take_presses(), vec![at(30.0, 40.0)]);
        assert!(pointer.take_presses().is_empty());
    }
}

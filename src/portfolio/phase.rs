/// Top-level page state. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    Initial,
    Transitioning,
    Revealed,
}

impl Phase {
    /// Integer form pushed into the UI
    pub fn as_index(self) -> i32 {
        match self {
            Phase::Initial => 0,
            Phase::Transitioning => 1,
            Phase::Revealed => 2,
        }
    }
}

/// Three-state flag with a one-shot timer from transitioning to revealed.
///
/// Time is whatever clock the host drives it with, in seconds. The pending
/// advance is checked by [`PhaseController::poll`] and dropped by
/// [`PhaseController::teardown`].
#[derive(Debug, Clone)]
pub struct PhaseController {
    phase: Phase,
    delay: f32,
    triggered_at: Option<f32>,
    due_at: Option<f32>,
}

impl PhaseController {
    pub fn new(delay: f32) -> Self {
        Self {
            phase: Phase::Initial,
            delay,
            triggered_at: None,
            due_at: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn delay(&self) -> f32 {
        self.delay
    }

    /// Start the fuse. Returns false (and does nothing) outside the initial phase.
    pub fn trigger(&mut self, now: f32) -> bool {
        if self.phase != Phase::Initial {
            log::debug!("[PHASE] Trigger ignored in {:?}", self.phase);
            return false;
        }
        self.phase = Phase::Transitioning;
        self.triggered_at = Some(now);
        self.due_at = Some(now + self.delay);
        log::info!("[PHASE] Initial -> Transitioning, reveal due in {:.2}s", self.delay);
        true
    }

    /// Fire the pending advance if its time has come. Returns true on the poll that reveals.
    pub fn poll(&mut self, now: f32) -> bool {
        match self.due_at {
            Some(due) if now >= due => {
                self.due_at = None;
                self.phase = Phase::Revealed;
                log::info!("[PHASE] Transitioning -> Revealed");
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.due_at.is_some()
    }

    /// Cancel the pending advance; the phase stays where it is
    pub fn teardown(&mut self) {
        if self.due_at.take().is_some() {
            log::info!("[PHASE] Pending reveal cancelled");
        }
    }

    /// How far through the fuse we are, 0 before the trigger and 1 once revealed
    pub fn transition_progress(&self, now: f32) -> f32 {
        match (self.phase, self.triggered_at) {
            (Phase::Initial, _) | (_, None) => 0.0,
            (Phase::Revealed, _) => 1.0,
            (Phase::Transitioning, Some(start)) if self.delay > 0.0 => ((now - start) / self.delay).clamp(0.0, 1.0),
            (Phase::Transitioning, Some(_)) => 1.0,
        }
    }
}

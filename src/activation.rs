//! Hover highlighting with timer-gated transitions.
//!
//! Activation is leading-edge: the first `activate` call switches the gate on
//! immediately, and further activations within the window are ignored.
//! Deactivation is trailing-edge: `deactivate` only schedules the switch off,
//! which happens once the window has elapsed and [`ActivationGate::poll`] is
//! called. Re-activating before the deadline cancels the pending switch off.
//!
//! Callers pass the current [`Instant`] in, so the gate never reads a clock
//! itself.

use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Activated,
    Deactivated,
}

#[derive(Clone, Debug)]
pub struct ActivationGate {
    window: Duration,
    active: bool,
    last_activation: Option<Instant>,
    deactivate_at: Option<Instant>,
}

impl ActivationGate {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            active: false,
            last_activation: None,
            deactivate_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_pending_deactivation(&self) -> bool {
        self.deactivate_at.is_some()
    }

    /// Switch on unless already on or switched on within the window.
    pub fn activate(&mut self, now: Instant) -> Option<Transition> {
        self.deactivate_at = None;
        if self.active {
            return None;
        }
        if let Some(last) = self.last_activation {
            if now.saturating_duration_since(last) < self.window {
                return None;
            }
        }
        self.active = true;
        self.last_activation = Some(now);
        Some(Transition::Activated)
    }

    /// Schedule a switch off one window from now. Repeated calls keep the
    /// first deadline.
    pub fn deactivate(&mut self, now: Instant) {
        if self.active && self.deactivate_at.is_none() {
            self.deactivate_at = Some(now + self.window);
        }
    }

    /// Apply a due deactivation.
    pub fn poll(&mut self, now: Instant) -> Option<Transition> {
        let deadline = self.deactivate_at?;
        if now < deadline {
            return None;
        }
        self.deactivate_at = None;
        self.active = false;
        Some(Transition::Deactivated)
    }
}

//! Debounced zip pass scheduling.
//!
//! Rebuilds come in bursts (one save can touch a template, its output and
//! the listing). The scheduler keeps a single pending deadline; every new
//! request pushes it out by the full window, so a pass only runs once the
//! burst is over.

use std::time::{Duration, Instant};

/// Idle/Pending state machine for the archive pass.
pub struct ZipScheduler {
    deadline: Option<Instant>,
    reason: Option<String>,
    window: Duration,
}

impl ZipScheduler {
    pub fn new(window: Duration) -> Self {
        Self {
            deadline: None,
            reason: None,
            window,
        }
    }

    /// Request a pass after the debounce window.
    ///
    /// Scheduling while pending restarts the window. When `enabled` is
    /// false this is a no-op: the flag is checked per call, so toggling
    /// auto-zip at runtime takes effect on the next change.
    pub fn schedule(&mut self, reason: &str, enabled: bool, now: Instant) {
        if !enabled {
            crate::debug!("zip"; "auto-zip disabled, skipping: {}", reason);
            return;
        }
        self.schedule_forced(reason, now);
    }

    /// Request a pass regardless of the auto-zip flag.
    ///
    /// Deletions use this: a removed unit must drop out of the aggregate
    /// archives and the manifest even when automatic zipping is off.
    pub fn schedule_forced(&mut self, reason: &str, now: Instant) {
        self.deadline = Some(now + self.window);
        self.reason = Some(reason.to_string());
    }

    /// Take the pending reason if the deadline passed, resetting to idle.
    pub fn take_if_ready(&mut self, now: Instant) -> Option<String> {
        if now < self.deadline? {
            return None;
        }
        self.deadline = None;
        self.reason.take()
    }

    /// Sleep until the pending deadline, or effectively forever when idle.
    pub fn sleep_duration(&self, now: Instant) -> Duration {
        match self.deadline {
            Some(deadline) => deadline
                .saturating_duration_since(now)
                .max(Duration::from_millis(1)),
            None => Duration::from_secs(86400),
        }
    }
}

//! Unit registry with a settle delay for freshly created unit directories.
//!
//! When a unit directory first appears its files are usually still being
//! written (drag-and-drop copies, `cp -r`, scaffolding scripts). The
//! registry holds the name back for a short refresh window and only then
//! releases it for an initial build.

use std::time::{Duration, Instant};

use rustc_hash::FxHashSet;

/// Known unit directories plus pending ones waiting out the settle delay.
pub struct WatcherRegistry {
    known: FxHashSet<String>,
    pending: Vec<(String, Instant)>,
    refresh: Duration,
}

impl WatcherRegistry {
    pub fn new(initial: impl IntoIterator<Item = String>, refresh: Duration) -> Self {
        Self {
            known: initial.into_iter().collect(),
            pending: Vec::new(),
            refresh,
        }
    }

    /// Is this name a tracked unit (settled or still pending)?
    pub fn knows(&self, name: &str) -> bool {
        self.known.contains(name) || self.pending.iter().any(|(n, _)| n == name)
    }

    /// Start the settle delay for a new unit directory. Re-arming an
    /// already pending name restarts its delay.
    pub fn arm(&mut self, name: &str, now: Instant) {
        if self.known.contains(name) {
            return;
        }
        if let Some(entry) = self.pending.iter_mut().find(|(n, _)| n == name) {
            entry.1 = now;
        } else {
            self.pending.push((name.to_string(), now));
        }
    }

    /// Forget a unit entirely (directory deleted).
    pub fn remove(&mut self, name: &str) {
        self.known.remove(name);
        self.pending.retain(|(n, _)| n != name);
    }

    /// Pending units whose settle delay elapsed. They become known.
    pub fn take_ready(&mut self, now: Instant) -> Vec<String> {
        let refresh = self.refresh;
        let mut ready = Vec::new();
        self.pending.retain(|(name, armed)| {
            if now.duration_since(*armed) >= refresh {
                ready.push(name.clone());
                false
            } else {
                true
            }
        });
        for name in &ready {
            self.known.insert(name.clone());
        }
        ready.sort();
        ready
    }

    /// Sleep until the earliest pending unit could settle.
    pub fn sleep_duration(&self, now: Instant) -> Duration {
        self.pending
            .iter()
            .map(|(_, armed)| {
                self.refresh
                    .saturating_sub(now.duration_since(*armed))
                    .max(Duration::from_millis(1))
            })
            .min()
            .unwrap_or(Duration::from_secs(86400))
    }
}

//! Orphan sweep: output entries whose source unit no longer exists.
//!
//! Watcher deletion events are unreliable for whole directory trees
//! (rm -rf, drag-to-trash). The reconciler is the safety net: after any
//! removal under the sizes tree it compares output against source and
//! deletes what no longer has a counterpart. It runs on its own debounce,
//! independent of the zip scheduler and the auto-zip flag.

use std::path::Path;
use std::time::{Duration, Instant};

use crate::config::ProjectConfig;

/// Idle/Pending state machine for the orphan sweep.
pub struct OrphanReconciler {
    deadline: Option<Instant>,
    window: Duration,
}

impl OrphanReconciler {
    pub fn new(window: Duration) -> Self {
        Self {
            deadline: None,
            window,
        }
    }

    /// Request a sweep after the debounce window. Restarts the window when
    /// already pending.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// True once the deadline passed; resets to idle.
    pub fn take_if_ready(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn sleep_duration(&self, now: Instant) -> Duration {
        match self.deadline {
            Some(deadline) => deadline
                .saturating_duration_since(now)
                .max(Duration::from_millis(1)),
            None => Duration::from_secs(86400),
        }
    }
}

/// Remove output directories and unit archives with no source unit.
///
/// Errors are logged and swallowed: a sweep that fails halfway must not
/// take down the watch loop, and the next removal reschedules it anyway.
/// Returns the names of the units that were cleaned up, sorted.
pub fn reconcile_output(config: &ProjectConfig) -> Vec<String> {
    let output_root = config.output_root();
    let Ok(entries) = std::fs::read_dir(output_root) else {
        return Vec::new();
    };

    let project = config.project_name();
    let keep_stems = [
        format!("{project}-all-banners"),
        format!("{project}-whole-package"),
    ];

    let mut removed = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        if path.is_dir() {
            if !has_source_unit(config, name) {
                crate::debug!("watch"; "orphan output: {}", name);
                if remove_tree(&path) {
                    removed.push(name.to_string());
                }
            }
            continue;
        }

        // Stray unit archives; aggregates and non-zip files stay
        if !name.ends_with(".zip") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if keep_stems.iter().any(|k| k == stem) || has_source_unit(config, stem) {
            continue;
        }
        crate::debug!("watch"; "orphan archive: {}", name);
        if let Err(e) = std::fs::remove_file(&path) {
            crate::log!("watch"; "failed to remove {}: {}", path.display(), e);
        } else if !removed.contains(&stem.to_string()) {
            removed.push(stem.to_string());
        }
    }

    removed.sort();
    removed.dedup();
    removed
}

/// A non-private source directory of this name exists under the sizes root.
fn has_source_unit(config: &ProjectConfig, name: &str) -> bool {
    !crate::core::is_private_name(name) && config.sizes_root().join(name).is_dir()
}

fn remove_tree(path: &Path) -> bool {
    match std::fs::remove_dir_all(path) {
        Ok(()) => true,
        Err(e) => {
            crate::log!("watch"; "failed to remove {}: {}", path.display(), e);
            false
        }
    }
}

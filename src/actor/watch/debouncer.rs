//! Pure debouncer: timing and event deduplication only. No path
//! classification, no global state.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use super::ChangeKind;
use crate::utils::path::normalize_path;

/// Editor artifacts that should never reach the router.
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

/// Collects notify events and releases them as one batch once the stream
/// has been quiet for the debounce window.
pub struct Debouncer {
    /// Path → ChangeKind (dedup is free via HashMap key uniqueness)
    changes: FxHashMap<PathBuf, ChangeKind>,
    last_event: Option<Instant>,
    window: Duration,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            changes: FxHashMap::default(),
            last_event: None,
            window,
        }
    }

    /// Add a notify event, applying dedup rules:
    /// - Removed + Created/Modified → the restore event wins
    /// - Modified + Removed → upgrade to Removed
    /// - Created + Removed → net no-op, discard
    /// - same kind: first event wins
    pub fn add_event(&mut self, event: &notify::Event, now: Instant) {
        use notify::EventKind;

        let kind = match event.kind {
            EventKind::Create(_) => ChangeKind::Created,
            EventKind::Remove(_) => ChangeKind::Removed,
            EventKind::Modify(modify) => {
                // Metadata-only changes (mtime/chmod) would loop forever:
                // the copy-newer step itself touches mtimes
                if matches!(modify, notify::event::ModifyKind::Metadata(_)) {
                    return;
                }
                ChangeKind::Modified
            }
            _ => return,
        };

        for path in &event.paths {
            if is_temp_file(path) {
                continue;
            }

            let path = normalize_path(path);

            if let Some(&existing) = self.changes.get(&path) {
                match (existing, kind) {
                    (ChangeKind::Removed, ChangeKind::Created | ChangeKind::Modified) => {
                        crate::debug!("watch"; "restored: {}", path.display());
                        self.changes.insert(path, kind);
                    }
                    (ChangeKind::Modified, ChangeKind::Removed) => {
                        self.changes.insert(path, ChangeKind::Removed);
                    }
                    (ChangeKind::Created, ChangeKind::Removed) => {
                        crate::debug!("watch"; "discard created+removed: {}", path.display());
                        self.changes.remove(&path);
                    }
                    _ => continue,
                }
                self.last_event = Some(now);
                continue;
            }

            crate::debug!("watch"; "event {}: {}", kind.label(), path.display());
            self.changes.insert(path, kind);
            self.last_event = Some(now);
        }
    }

    /// Take the batch if the debounce window elapsed since the last event.
    pub fn take_if_ready(&mut self, now: Instant) -> Option<FxHashMap<PathBuf, ChangeKind>> {
        let last_event = self.last_event?;
        if now.duration_since(last_event) < self.window {
            return None;
        }

        self.last_event = None;
        let changes = std::mem::take(&mut self.changes);
        if changes.is_empty() { None } else { Some(changes) }
    }

    /// Sleep until the batch could next become ready.
    pub fn sleep_duration(&self, now: Instant) -> Duration {
        let Some(last_event) = self.last_event else {
            return Duration::from_secs(86400);
        };
        self.window
            .saturating_sub(now.duration_since(last_event))
            .max(Duration::from_millis(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_event(paths: Vec<&str>, kind: notify::EventKind) -> notify::Event {
        notify::Event {
            kind,
            paths: paths.into_iter().map(PathBuf::from).collect(),
            attrs: Default::default(),
        }
    }

    fn modify_kind() -> notify::EventKind {
        notify::EventKind::Modify(notify::event::ModifyKind::Data(
            notify::event::DataChange::Any,
        ))
    }

    fn create_kind() -> notify::EventKind {
        notify::EventKind::Create(notify::event::CreateKind::File)
    }

    fn remove_kind() -> notify::EventKind {
        notify::EventKind::Remove(notify::event::RemoveKind::File)
    }

    fn window() -> Duration {
        Duration::from_millis(100)
    }

    #[test]
    fn test_empty_not_ready() {
        let mut debouncer = Debouncer::new(window());
        assert!(debouncer.take_if_ready(Instant::now()).is_none());
    }

    #[test]
    fn test_ready_after_window() {
        let mut debouncer = Debouncer::new(window());
        let start = Instant::now();
        debouncer.add_event(&make_event(vec!["/p/a.hbs"], modify_kind()), start);

        assert!(debouncer.take_if_ready(start + Duration::from_millis(50)).is_none());

        let batch = debouncer
            .take_if_ready(start + Duration::from_millis(150))
            .unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[&PathBuf::from("/p/a.hbs")], ChangeKind::Modified);

        // Batch was taken: nothing left
        assert!(debouncer.take_if_ready(start + Duration::from_secs(1)).is_none());
    }

    #[test]
    fn test_later_event_extends_window() {
        let mut debouncer = Debouncer::new(window());
        let start = Instant::now();
        debouncer.add_event(&make_event(vec!["/p/a.hbs"], modify_kind()), start);
        debouncer.add_event(
            &make_event(vec!["/p/b.scss"], modify_kind()),
            start + Duration::from_millis(80),
        );

        assert!(debouncer.take_if_ready(start + Duration::from_millis(120)).is_none());
        assert!(debouncer.take_if_ready(start + Duration::from_millis(181)).is_some());
    }

    #[test]
    fn test_temp_file_ignored() {
        let mut debouncer = Debouncer::new(window());
        let now = Instant::now();
        debouncer.add_event(&make_event(vec!["/p/.index.hbs.swp"], modify_kind()), now);
        debouncer.add_event(&make_event(vec!["/p/index.hbs~"], modify_kind()), now);
        assert!(debouncer.changes.is_empty());
        assert!(debouncer.last_event.is_none());
    }

    #[test]
    fn test_dedup_first_event_wins() {
        let mut debouncer = Debouncer::new(window());
        let now = Instant::now();
        debouncer.add_event(&make_event(vec!["/p/a.hbs"], create_kind()), now);
        debouncer.add_event(&make_event(vec!["/p/a.hbs"], modify_kind()), now);

        assert_eq!(debouncer.changes.len(), 1);
        assert_eq!(debouncer.changes[&PathBuf::from("/p/a.hbs")], ChangeKind::Created);
    }

    #[test]
    fn test_create_then_remove_discards() {
        let mut debouncer = Debouncer::new(window());
        let now = Instant::now();
        debouncer.add_event(&make_event(vec!["/p/a.hbs"], create_kind()), now);
        debouncer.add_event(&make_event(vec!["/p/a.hbs"], remove_kind()), now);
        assert!(debouncer.changes.is_empty());
    }

    #[test]
    fn test_modify_then_remove_upgrades() {
        let mut debouncer = Debouncer::new(window());
        let now = Instant::now();
        debouncer.add_event(&make_event(vec!["/p/a.hbs"], modify_kind()), now);
        debouncer.add_event(&make_event(vec!["/p/a.hbs"], remove_kind()), now);
        assert_eq!(debouncer.changes[&PathBuf::from("/p/a.hbs")], ChangeKind::Removed);
    }

    #[test]
    fn test_remove_then_create_restores() {
        let mut debouncer = Debouncer::new(window());
        let now = Instant::now();
        debouncer.add_event(&make_event(vec!["/p/a.hbs"], remove_kind()), now);
        debouncer.add_event(&make_event(vec!["/p/a.hbs"], create_kind()), now);
        assert_eq!(debouncer.changes[&PathBuf::from("/p/a.hbs")], ChangeKind::Created);
    }

    #[test]
    fn test_sleep_duration() {
        let mut debouncer = Debouncer::new(window());
        let start = Instant::now();
        assert!(debouncer.sleep_duration(start) >= Duration::from_secs(3600));

        debouncer.add_event(&make_event(vec!["/p/a.hbs"], modify_kind()), start);
        let dur = debouncer.sleep_duration(start + Duration::from_millis(40));
        assert_eq!(dur, Duration::from_millis(60));
    }
}

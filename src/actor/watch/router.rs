//! Routing of debounced filesystem batches into orchestrator messages.
//!
//! The debouncer handles timing, the router handles meaning: which unit a
//! path belongs to, whether it is private, whether a whole unit appeared
//! or vanished, and whether an orphan sweep is due.

use std::path::PathBuf;
use std::time::Instant;

use rustc_hash::{FxHashMap, FxHashSet};

use super::registry::WatcherRegistry;
use super::ChangeKind;
use crate::actor::messages::OrchestratorMsg;
use crate::config::ProjectConfig;
use crate::core::{has_private_component, is_private_name};

/// Turn one debounced batch into orchestrator messages.
///
/// New unit directories are armed in the registry rather than announced;
/// they surface as `UnitAdded` once their settle delay elapses. Any
/// removal under the sizes tree queues a single `ScheduleReconcile` at
/// the end of the batch, as a fallback for deletions the per-path
/// handling cannot attribute.
pub fn route_changes(
    changes: FxHashMap<PathBuf, ChangeKind>,
    config: &ProjectConfig,
    registry: &mut WatcherRegistry,
    now: Instant,
) -> Vec<OrchestratorMsg> {
    let mut entries: Vec<(PathBuf, ChangeKind)> = changes.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut messages = Vec::new();
    let mut globals_seen = FxHashSet::default();
    let mut need_reconcile = false;

    for (path, kind) in entries {
        if path.starts_with(config.global_root()) {
            if let Some(category) = config.category_for(&path)
                && globals_seen.insert(category)
            {
                messages.push(OrchestratorMsg::GlobalChanged { category });
            }
            continue;
        }

        let Ok(rel) = path.strip_prefix(config.sizes_root()) else {
            continue;
        };
        let parts: Vec<&str> = rel
            .components()
            .filter_map(|c| c.as_os_str().to_str())
            .collect();
        let Some(&unit) = parts.first() else {
            continue;
        };

        if kind == ChangeKind::Removed {
            need_reconcile = true;
        }

        if parts.len() == 1 {
            match kind {
                ChangeKind::Created if path.is_dir() && !is_private_name(unit) => {
                    crate::debug!("watch"; "new unit directory: {}", unit);
                    registry.arm(unit, now);
                }
                ChangeKind::Created if path.is_dir() => {
                    // A unit renamed to _name withdraws the public unit even
                    // when the matching remove event got lost. Checking the
                    // output tree too cleans up units privatized while the
                    // watcher was not running.
                    let public = unit.trim_start_matches('_');
                    if !public.is_empty()
                        && (registry.knows(public)
                            || config.output_root().join(public).is_dir())
                    {
                        registry.remove(public);
                        messages.push(OrchestratorMsg::UnitRemoved {
                            name: public.to_string(),
                        });
                    }
                }
                ChangeKind::Removed if registry.knows(unit) => {
                    registry.remove(unit);
                    messages.push(OrchestratorMsg::UnitRemoved {
                        name: unit.to_string(),
                    });
                }
                _ => {}
            }
            continue;
        }

        if is_private_name(unit) {
            continue;
        }

        // Files can land before their unit's create event is seen. Arm the
        // unit and let the settled UnitAdded build pick them all up.
        if !registry.knows(unit) {
            if config.sizes_root().join(unit).is_dir() {
                registry.arm(unit, now);
            }
            continue;
        }

        let Some(category) = config.category_for(&path) else {
            continue;
        };
        if category.is_compiled() && has_private_component(&path, config.sizes_root()) {
            continue;
        }

        messages.push(OrchestratorMsg::SourceFile {
            path,
            category,
            kind,
        });
    }

    if need_reconcile {
        messages.push(OrchestratorMsg::ScheduleReconcile);
    }
    messages
}

//! Per-unit archive decision: fingerprint change OR missing artifact.

use std::path::Path;

use super::store::FingerprintStore;
use crate::fingerprint::tree_fingerprint;

/// Decides whether a unit's archive must be (re)written.
///
/// Per-unit state is independent; calling this for different units never
/// interferes.
pub struct ArchiveCache {
    store: FingerprintStore,
}

impl ArchiveCache {
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            store: FingerprintStore::new(cache_dir),
        }
    }

    /// True when the unit's output changed since the last recorded
    /// fingerprint, or when the archive file is missing from disk
    /// (self-healing after manual deletion).
    ///
    /// Side effect: a changed fingerprint is recorded immediately.
    pub fn should_archive(&self, unit: &str, unit_dir: &Path, archive_path: &Path) -> bool {
        let current = tree_fingerprint(unit_dir);
        let previous = self.store.load(unit);
        let changed = previous != Some(current);

        if changed
            && let Err(e) = self.store.save(unit, current)
        {
            crate::log!("zip"; "fingerprint store write failed for {}: {}", unit, e);
        }

        changed || !archive_path.exists()
    }
}

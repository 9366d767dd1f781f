//! `[watch]` section configuration.
//!
//! Timings for the debounced orchestration core.
//!
//! ```toml
//! [watch]
//! zip_debounce_ms = 350        # quiet period before an archive pass
//! reconcile_debounce_ms = 300  # quiet period before orphan cleanup
//! watcher_refresh_ms = 120     # delay before a new unit's events are honored
//! auto_zip = false             # archive automatically on change
//! ```

use serde::{Deserialize, Serialize};

/// Watch loop timings and feature flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Debounce window for the archive-and-reload pass.
    pub zip_debounce_ms: u64,

    /// Debounce window for orphan reconciliation.
    pub reconcile_debounce_ms: u64,

    /// Settle delay before watching a freshly added unit directory.
    pub watcher_refresh_ms: u64,

    /// Archive automatically when sources change. Deletion cleanup and
    /// reconciliation run regardless of this flag.
    pub auto_zip: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            zip_debounce_ms: 350,
            reconcile_debounce_ms: 300,
            watcher_refresh_ms: 120,
            auto_zip: false,
        }
    }
}

//! Watch actor: filesystem events in, orchestrator messages out.
//!
//! Implements the "Watcher-First" pattern: the notify watcher starts
//! buffering before the initial build runs, so nothing is lost in between.
//!
//! ```text
//! notify → Debouncer (pure timing) → route_changes (meaning) → OrchestratorMsg
//! ```

mod debouncer;
mod registry;
mod router;

pub use debouncer::Debouncer;
pub use registry::WatcherRegistry;
pub use router::route_changes;

use std::sync::Arc;
use std::time::{Duration, Instant};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::messages::OrchestratorMsg;
use crate::config::ProjectConfig;

/// Quiet window before a batch of raw events is released.
const DEBOUNCE_MS: u64 = 350;

/// What happened to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

/// Watch actor: owns the notify watcher and the debounce/registry state.
pub struct WatchActor {
    /// Channel to receive notify events (sync → async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    _watcher: RecommendedWatcher,
    orchestrator_tx: mpsc::Sender<OrchestratorMsg>,
    debouncer: Debouncer,
    registry: WatcherRegistry,
    config: Arc<ProjectConfig>,
}

impl WatchActor {
    /// Start watching immediately; events buffer while the caller runs the
    /// initial build.
    pub fn new(
        config: Arc<ProjectConfig>,
        orchestrator_tx: mpsc::Sender<OrchestratorMsg>,
        initial_units: Vec<String>,
    ) -> notify::Result<Self> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        for path in [config.sizes_root(), config.global_root()] {
            if path.exists() {
                watcher.watch(path, RecursiveMode::Recursive)?;
            }
        }

        let registry = WatcherRegistry::new(
            initial_units,
            Duration::from_millis(config.watch.watcher_refresh_ms),
        );

        Ok(Self {
            notify_rx,
            _watcher: watcher,
            orchestrator_tx,
            debouncer: Debouncer::new(Duration::from_millis(DEBOUNCE_MS)),
            registry,
            config,
        })
    }

    /// Run the actor event loop.
    pub async fn run(self) {
        let notify_rx = self.notify_rx;
        let orchestrator_tx = self.orchestrator_tx;
        let config = self.config;
        let mut debouncer = self.debouncer;
        let mut registry = self.registry;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        // notify's callback is sync; pump its channel into the async world
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            let sleep = debouncer
                .sleep_duration(Instant::now())
                .min(registry.sleep_duration(Instant::now()));
            tokio::select! {
                biased;
                Some(event) = async_rx.recv() => {
                    debouncer.add_event(&event, Instant::now());
                }
                _ = tokio::time::sleep(sleep) => {
                    if tick(&mut debouncer, &mut registry, &orchestrator_tx, &config)
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
            }
        }
    }
}

/// Flush settled units and debounced batches to the orchestrator.
///
/// Returns `Err(())` if the orchestrator shut down.
async fn tick(
    debouncer: &mut Debouncer,
    registry: &mut WatcherRegistry,
    orchestrator_tx: &mpsc::Sender<OrchestratorMsg>,
    config: &ProjectConfig,
) -> Result<(), ()> {
    // Must be serving to process events (check BEFORE taking to preserve them)
    if !crate::core::is_serving() {
        return Ok(());
    }

    let now = Instant::now();

    for name in registry.take_ready(now) {
        orchestrator_tx
            .send(OrchestratorMsg::UnitAdded { name })
            .await
            .map_err(|_| ())?;
    }

    let Some(batch) = debouncer.take_if_ready(now) else {
        return Ok(());
    };

    for msg in route_changes(batch, config, registry, now) {
        orchestrator_tx.send(msg).await.map_err(|_| ())?;
    }

    Ok(())
}

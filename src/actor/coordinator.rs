//! Wires up and runs the watch-mode actor system.
//!
//! ```text
//! WatchActor --> Orchestrator --> ReloadActor
//! (notify)     (build/zip/sweep)  (broadcast)
//! ```
//!
//! Thin by design: channels and lifecycle only, no business logic.

use std::sync::Arc;

use anyhow::Result;
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::messages::{OrchestratorMsg, ReloadMsg};
use super::orchestrator::Orchestrator;
use super::reload::ReloadActor;
use super::watch::WatchActor;
use crate::config::ProjectConfig;

/// Channel buffer size
const CHANNEL_BUFFER: usize = 32;

pub struct Coordinator {
    config: Arc<ProjectConfig>,
    ws_port: Option<u16>,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    pub fn with_config(config: Arc<ProjectConfig>) -> Self {
        Self {
            config,
            ws_port: None,
            shutdown_rx: None,
        }
    }

    /// Enable the live-reload WebSocket listener on this base port.
    pub fn with_ws_port(mut self, port: u16) -> Self {
        self.ws_port = Some(port);
        self
    }

    /// Stop the actor system when this channel fires (Ctrl+C).
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run the actor system until shutdown.
    pub async fn run(mut self) -> Result<()> {
        let (orchestrator_tx, orchestrator_rx) = mpsc::channel::<OrchestratorMsg>(CHANNEL_BUFFER);
        let (reload_tx, reload_rx) = mpsc::channel::<ReloadMsg>(CHANNEL_BUFFER);

        if let Some(port) = self.ws_port {
            match crate::reload::server::start_ws_server(port, reload_tx.clone()) {
                Ok(actual_port) => crate::cli::serve::set_actual_ws_port(actual_port),
                Err(e) => crate::log!("reload"; "websocket server failed: {}", e),
            }
        }

        let initial_units = crate::build::list_source_units(&self.config).unwrap_or_default();
        let watch_actor = WatchActor::new(
            Arc::clone(&self.config),
            orchestrator_tx.clone(),
            initial_units,
        )
        .map_err(|e| anyhow::anyhow!("watcher failed: {}", e))?;

        let orchestrator = Orchestrator::new(
            orchestrator_rx,
            reload_tx.clone(),
            Arc::clone(&self.config),
        );
        let reload_actor = ReloadActor::new(reload_rx);

        crate::debug!("watch"; "actor system start");
        let shutdown_rx = self.shutdown_rx.take();
        run_actors(
            watch_actor,
            orchestrator,
            reload_actor,
            orchestrator_tx,
            reload_tx,
            shutdown_rx,
        )
        .await;
        crate::debug!("watch"; "actor system stopped");
        Ok(())
    }
}

async fn run_actors(
    watch: WatchActor,
    orchestrator: Orchestrator,
    reload: ReloadActor,
    orchestrator_tx: mpsc::Sender<OrchestratorMsg>,
    reload_tx: mpsc::Sender<ReloadMsg>,
    shutdown_rx: Option<Receiver<()>>,
) {
    let watch_handle = tokio::spawn(watch.run());
    let orchestrator_handle = tokio::spawn(orchestrator.run());
    let reload_handle = tokio::spawn(reload.run());

    // Ctrl+C arrives on a std channel; poll it from async
    if let Some(rx) = shutdown_rx {
        loop {
            if rx.try_recv().is_ok() {
                crate::debug!("watch"; "shutdown signal received");
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
    } else {
        tokio::select! {
            _ = watch_handle => {}
            _ = orchestrator_handle => {}
        }
    }

    let _ = orchestrator_tx.send(OrchestratorMsg::Shutdown).await;
    let _ = reload_tx.send(ReloadMsg::Shutdown).await;
    let _ = tokio::time::timeout(std::time::Duration::from_millis(500), reload_handle).await;
}

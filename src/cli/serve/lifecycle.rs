//! Serve-mode lifecycle: port binding, actor startup, shutdown drain.

use crate::{actor::Coordinator, config::ProjectConfig, log};
use anyhow::Result;
use crossbeam::channel::Receiver;
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};
use tiny_http::Server;

/// Ports tried beyond the configured one before giving up.
const PORT_RETRIES: u16 = 10;

/// Worker threads for the watch-mode runtime. Two suffice: the actors are
/// IO-bound and the orchestrator serializes all output writes anyway.
const ACTOR_WORKERS: usize = 2;

/// How long shutdown waits for the actor thread to drain.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Bind the HTTP server, walking up from `base_port` when taken.
pub fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let last_port = base_port.saturating_add(PORT_RETRIES - 1);
    let mut last_error = None;

    for port in base_port..=last_port {
        let addr = SocketAddr::new(interface, port);
        match Server::http(addr) {
            Ok(server) => {
                if port != base_port {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "no free port in {}-{}: {}",
        base_port,
        last_port,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

/// Spawn the watch-mode actor system on a dedicated runtime thread.
///
/// Returns None when watching is disabled: the server then serves the
/// output tree as a plain static site.
pub fn spawn_actors(
    config: Arc<ProjectConfig>,
    watch_enabled: bool,
    ws_port: Option<u16>,
    shutdown_rx: Receiver<()>,
) -> Option<JoinHandle<()>> {
    if !watch_enabled {
        return None;
    }

    Some(thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(ACTOR_WORKERS)
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                log!("watch"; "runtime start failed: {}", e);
                return;
            }
        };

        rt.block_on(async {
            let mut coordinator =
                Coordinator::with_config(config).with_shutdown_signal(shutdown_rx);
            if let Some(port) = ws_port {
                coordinator = coordinator.with_ws_port(port);
            }
            if let Err(e) = coordinator.run().await {
                log!("watch"; "actor system error: {}", e);
            }
        });
    }))
}

/// Block until the actor thread finishes or the grace period runs out.
pub fn wait_for_shutdown(handle: Option<JoinHandle<()>>) {
    let Some(handle) = handle else { return };

    let deadline = Instant::now() + SHUTDOWN_GRACE;
    while Instant::now() < deadline {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        thread::sleep(Duration::from_millis(50));
    }
    log!("watch"; "actors still busy after {:?}, detaching", SHUTDOWN_GRACE);
}

//! Development server with live reload support.

mod lifecycle;
mod path;
mod response;

use crate::{
    config::{ProjectConfig, cfg},
    debug, log,
};
use anyhow::Result;
use crossbeam::channel;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};
use tiny_http::{Request, Server};

/// Actual WebSocket port (may differ from the configured one if in use).
/// Updated by the coordinator after the reload listener binds.
static ACTUAL_WS_PORT: AtomicU16 = AtomicU16::new(0);

/// Update the actual WebSocket port (called by the coordinator).
pub fn set_actual_ws_port(port: u16) {
    ACTUAL_WS_PORT.store(port, Ordering::Relaxed);
}

fn get_actual_ws_port() -> Option<u16> {
    match ACTUAL_WS_PORT.load(Ordering::Relaxed) {
        0 => None,
        port => Some(port),
    }
}

/// Bound server ready to accept requests.
pub struct BoundServer {
    server: Arc<Server>,
    addr: SocketAddr,
    ws_port: Option<u16>,
    shutdown_rx: channel::Receiver<()>,
}

/// Bind the HTTP server without starting the request loop.
///
/// The caller can kick off the initial build in the background while the
/// server already answers with the loading page.
pub fn bind_server() -> Result<BoundServer> {
    let config = cfg();
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);

    let ws_port = config.serve.watch.then_some(config.serve.ws_port);
    if let Some(port) = ws_port {
        debug!("reload"; "ws://localhost:{}", port);
    }

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    crate::core::register_server(Arc::clone(&server), shutdown_tx);

    log!("serve"; "http://{}", addr);

    Ok(BoundServer {
        server,
        addr,
        ws_port,
        shutdown_rx,
    })
}

impl BoundServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the actor system and the request loop (blocking).
    pub fn run(self) -> Result<()> {
        let config = cfg();
        let actor_handle = lifecycle::spawn_actors(
            Arc::clone(&config),
            config.serve.watch,
            self.ws_port,
            self.shutdown_rx,
        );
        run_request_loop(&self.server);
        lifecycle::wait_for_shutdown(actor_handle);
        Ok(())
    }
}

fn run_request_loop(server: &Server) {
    let config = cfg();
    // Request handling is cheap static file IO, but a pool keeps one slow
    // client from blocking the rest
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .expect("failed to create thread pool");

    for request in server.incoming_requests() {
        let config = Arc::clone(&config);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &config) {
                log!("serve"; "request error: {e}");
            }
        });
    }
}

/// Handle a single HTTP request.
fn handle_request(request: Request, config: &ProjectConfig) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    if !crate::core::is_serving() {
        return response::respond_loading(request);
    }

    let ws_port = get_actual_ws_port();
    if let Some(path) = path::resolve_path(request.url(), config.output_root()) {
        return response::respond_file(request, &path, ws_port);
    }

    response::respond_not_found(request)
}

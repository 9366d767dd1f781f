//! Reload actor: WebSocket broadcast to connected preview tabs.
//!
//! Banner previews are tiny pages; there is no patching, just a full
//! reload message. Clients connect through the listener in
//! `reload::server` and arrive here as raw TCP streams for the handshake.

use std::net::TcpStream;

use tokio::sync::mpsc;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::messages::ReloadMsg;
use crate::reload::reload_message;

pub struct ReloadActor {
    rx: mpsc::Receiver<ReloadMsg>,
    clients: Vec<WebSocket<TcpStream>>,
}

impl ReloadActor {
    pub fn new(rx: mpsc::Receiver<ReloadMsg>) -> Self {
        Self {
            rx,
            clients: Vec::new(),
        }
    }

    /// Run the actor event loop.
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                ReloadMsg::Reload { reason } => {
                    self.broadcast(&reload_message(&reason));
                }
                ReloadMsg::AddClient(stream) => self.add_client(stream),
                ReloadMsg::Shutdown => {
                    crate::debug!("reload"; "shutting down");
                    for mut client in self.clients.drain(..) {
                        let _ = client.close(None);
                    }
                    break;
                }
            }
        }
    }

    fn add_client(&mut self, stream: TcpStream) {
        match tungstenite::accept(stream) {
            Ok(ws) => {
                crate::debug!("reload"; "client connected (total: {})", self.clients.len() + 1);
                self.clients.push(ws);
            }
            Err(e) => crate::log!("reload"; "handshake failed: {}", e),
        }
    }

    /// Send to every client, dropping the ones that went away.
    fn broadcast(&mut self, json: &str) {
        if self.clients.is_empty() {
            crate::debug!("reload"; "no clients connected");
            return;
        }

        let msg = Message::Text(json.to_string().into());
        let before = self.clients.len();
        self.clients.retain_mut(|client| match client.send(msg.clone()) {
            Ok(()) => true,
            Err(e) => {
                crate::debug!("reload"; "client disconnected: {}", e);
                false
            }
        });
        crate::debug!("reload"; "broadcast to {} client(s)", before);
    }
}

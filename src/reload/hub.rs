//! Reload hub actor: owns the connected clients and broadcasts to them.

use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::Reloader;
use super::message::ReloadMessage;
use crate::{debug, log};

type Clients = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

/// Messages to the hub
#[derive(Debug)]
pub enum ReloadMsg {
    /// Freshly accepted connection, handshake pending
    AddClient(TcpStream),
    /// Broadcast a reload
    Reload { reason: String },
    /// Close every client and stop
    Shutdown,
}

/// Keeps live reload clients and broadcasts messages to them.
pub struct ReloadHub {
    rx: mpsc::Receiver<ReloadMsg>,
    clients: Clients,
}

impl ReloadHub {
    pub fn new(rx: mpsc::Receiver<ReloadMsg>) -> Self {
        Self {
            rx,
            clients: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        let clients = Arc::clone(&self.clients);
        std::thread::spawn(move || client_reader_loop(clients));

        while let Some(msg) = self.rx.recv().await {
            match msg {
                ReloadMsg::AddClient(stream) => self.add_client(stream),
                ReloadMsg::Reload { reason } => {
                    let sent = self.broadcast(&ReloadMessage::reload(reason.as_str()));
                    log!("reload"; "{} ({})", reason, crate::utils::plural_count(sent, "client"));
                }
                ReloadMsg::Shutdown => break,
            }
        }

        debug!("reload"; "shutting down");
        for mut ws in self.clients.lock().drain(..) {
            let _ = ws.close(None);
        }
    }

    fn add_client(&self, stream: TcpStream) {
        let mut ws = match tungstenite::accept(stream) {
            Ok(ws) => ws,
            Err(e) => {
                log!("reload"; "handshake failed: {}", e);
                return;
            }
        };

        let greeting = ReloadMessage::connected().to_json();
        if let Err(e) = ws.send(Message::Text(greeting.into())) {
            debug!("reload"; "failed to greet client: {}", e);
            return;
        }

        // Non-blocking from here on so the reader thread can poll.
        let _ = ws.get_ref().set_nonblocking(true);

        let mut clients = self.clients.lock();
        clients.push(ws);
        debug!("reload"; "client registered (total: {})", clients.len());
    }

    /// Send to every client, dropping the ones that fail. Returns how many
    /// clients received the message.
    fn broadcast(&self, msg: &ReloadMessage) -> usize {
        let frame = Message::Text(msg.to_json().into());
        let mut clients = self.clients.lock();

        clients.retain_mut(|ws| match ws.send(frame.clone()) {
            Ok(()) => true,
            Err(e) => {
                debug!("reload"; "client disconnected: {}", e);
                false
            }
        });
        clients.len()
    }
}

/// Poll clients for close frames and drop dead connections.
///
/// Exits once the hub is gone.
fn client_reader_loop(clients: Clients) {
    while Arc::strong_count(&clients) > 1 {
        std::thread::sleep(Duration::from_millis(100));

        clients.lock().retain_mut(|ws| match ws.read() {
            Ok(Message::Close(_)) => false,
            Ok(_) => true,
            Err(tungstenite::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => {
                true
            }
            Err(_) => false,
        });
    }
}

/// Cloneable sender side of the hub, usable from any thread.
#[derive(Clone)]
pub struct ReloadHandle {
    tx: mpsc::Sender<ReloadMsg>,
}

impl ReloadHandle {
    pub fn new(tx: mpsc::Sender<ReloadMsg>) -> Self {
        Self { tx }
    }
}

impl Reloader for ReloadHandle {
    fn reload(&self, reason: &str) {
        let msg = ReloadMsg::Reload {
            reason: reason.to_string(),
        };
        if let Err(e) = self.tx.try_send(msg) {
            debug!("reload"; "reload signal dropped: {}", e);
        }
    }
}

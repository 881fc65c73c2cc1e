//! WebSocket listener for live reload clients.
//!
//! Accepted streams are handed to the [`ReloadHub`](super::ReloadHub),
//! which performs the handshake and owns the connection.

use std::net::{IpAddr, TcpListener};
use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::sync::mpsc;

use super::ReloadMsg;
use crate::core::is_shutdown;

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

/// Bind the reload endpoint and start the acceptor thread.
///
/// Returns the port actually bound (successive ports are tried when busy).
pub fn start_reload_server(
    interface: IpAddr,
    base_port: u16,
    hub_tx: mpsc::Sender<ReloadMsg>,
) -> Result<u16> {
    let (listener, actual_port) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;
    listener.set_nonblocking(true)?;

    std::thread::spawn(move || {
        while !is_shutdown() {
            match listener.accept() {
                Ok((stream, addr)) => {
                    crate::debug!("reload"; "client connected: {}", addr);

                    // Handshake and writes run in blocking mode
                    let _ = stream.set_nonblocking(false);

                    if hub_tx.blocking_send(ReloadMsg::AddClient(stream)).is_err() {
                        crate::debug!("reload"; "hub stopped, closing listener");
                        break;
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    std::thread::sleep(Duration::from_millis(100));
                }
                Err(e) => {
                    crate::log!("reload"; "accept error: {}", e);
                    std::thread::sleep(Duration::from_millis(100));
                }
            }
        }
    });

    Ok(actual_port)
}

/// Try binding to port, retry with incremented port if in use
fn try_bind_port(
    interface: IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind((interface, port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                return Ok((listener, actual_port));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow!(
        "failed to bind live reload server after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCALHOST: IpAddr = IpAddr::V4(std::net::Ipv4Addr::LOCALHOST);

    #[test]
    fn test_try_bind_port_skips_busy_port() {
        let (busy, port) = try_bind_port(LOCALHOST, 0, 1).unwrap();
        let (_listener, next) = try_bind_port(LOCALHOST, port, MAX_PORT_RETRIES).unwrap();

        assert_ne!(next, port);
        drop(busy);
    }
}

//! Live reload over WebSocket.
//!
//! ```text
//! reload task --Reloader--> ReloadHandle --mpsc--> ReloadHub --ws--> browsers
//!                                                      ^
//!                          listener thread --AddClient-+
//! ```
//!
//! Tasks only see the [`Reloader`] trait; the dev command wires in a
//! [`ReloadHandle`], one-shot commands use [`NoReload`].

mod hub;
pub mod message;
mod server;

pub use hub::{ReloadHandle, ReloadHub, ReloadMsg};
pub use server::start_reload_server;

/// Sink for reload signals.
pub trait Reloader: Send + Sync {
    fn reload(&self, reason: &str);
}

/// Reloader for runs without a dev server.
pub struct NoReload;

impl Reloader for NoReload {
    fn reload(&self, reason: &str) {
        crate::debug!("reload"; "no server running, ignoring reload ({})", reason);
    }
}

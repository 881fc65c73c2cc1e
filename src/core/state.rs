//! Dev mode flags: whether a watch rebuild is running and whether Ctrl+C
//! has been pressed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use anyhow::Context;
use crossbeam::channel::Sender;
use tiny_http::Server;

static REBUILDING: AtomicBool = AtomicBool::new(false);
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Set once `dev` starts serving. Until then Ctrl+C exits on the spot.
struct Serving {
    server: Arc<Server>,
    stop: Sender<()>,
}

static SERVING: OnceLock<Serving> = OnceLock::new();

pub fn is_rebuilding() -> bool {
    REBUILDING.load(Ordering::Acquire)
}

/// Marks a watch rebuild as running until dropped.
#[must_use = "the rebuild ends when the guard is dropped"]
pub struct RebuildGuard(());

impl RebuildGuard {
    pub fn enter() -> Self {
        REBUILDING.store(true, Ordering::Release);
        Self(())
    }
}

impl Drop for RebuildGuard {
    fn drop(&mut self) {
        REBUILDING.store(false, Ordering::Release);
    }
}

/// Install the Ctrl+C handler. While serving it unblocks the HTTP loop and
/// signals the watch and reload actors; otherwise it exits with status 130.
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);
        match SERVING.get() {
            Some(serving) => {
                crate::log!("serve"; "shutting down...");
                serving.stop.send(()).ok();
                serving.server.unblock();
            }
            None => std::process::exit(130),
        }
    })
    .context("failed to install the Ctrl+C handler")
}

/// Switch Ctrl+C to graceful shutdown. Only the first registration counts.
pub fn register_server(server: Arc<Server>, stop: Sender<()>) {
    SERVING.set(Serving { server, stop }).ok();
}

/// Polled by the request loop, the reload listener and the runtime thread.
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebuild_guard_clears_on_drop() {
        {
            let _running = RebuildGuard::enter();
            assert!(is_rebuilding());
        }
        assert!(!is_rebuilding());
    }

    #[test]
    fn test_not_shut_down_at_start() {
        assert!(!is_shutdown());
    }
}

//! Server lifecycle: port binding, actor startup, shutdown.

use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

use anyhow::{Context, Result};
use crossbeam::channel::Receiver;
use tiny_http::Server;
use tokio::sync::mpsc;

use crate::{
    config::PipelineConfig,
    core::is_shutdown,
    debug, log,
    reload::{ReloadHandle, ReloadHub, ReloadMsg, Reloader, start_reload_server},
    watch::WatchActor,
};

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

const CHANNEL_BUFFER: usize = 32;

/// Bind to the specified interface and port, with automatic port retry.
pub fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;

    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

/// Running watcher + reload hub.
pub struct Actors {
    handle: JoinHandle<()>,
    /// Port the reload endpoint actually bound
    pub ws_port: u16,
}

/// Start the reload endpoint and the watcher.
///
/// The watcher is created before returning so changes made while the
/// server starts up are not lost. Returns `None` with watching disabled.
pub fn spawn_actors(
    config: Arc<PipelineConfig>,
    shutdown_rx: Receiver<()>,
) -> Result<Option<Actors>> {
    if !config.serve.watch {
        return Ok(None);
    }

    let (hub_tx, hub_rx) = mpsc::channel::<ReloadMsg>(CHANNEL_BUFFER);
    let ws_port = start_reload_server(config.serve.interface, config.serve.reload_port, hub_tx.clone())?;
    if ws_port != config.serve.reload_port {
        log!("reload"; "port {} in use, using {} instead", config.serve.reload_port, ws_port);
    }
    debug!("reload"; "ws://{}:{}", config.serve.interface, ws_port);

    let reloader: Arc<dyn Reloader> = Arc::new(ReloadHandle::new(hub_tx.clone()));
    let watcher = WatchActor::new(config, reloader)?;
    let hub = ReloadHub::new(hub_rx);

    let handle = thread::Builder::new()
        .name("assetflow-actors".into())
        .spawn(move || run_actor_system(watcher, hub, hub_tx, shutdown_rx))
        .context("failed to spawn actor thread")?;

    log!("watch"; "watching for changes");
    Ok(Some(Actors { handle, ws_port }))
}

fn run_actor_system(
    watcher: WatchActor,
    hub: ReloadHub,
    hub_tx: mpsc::Sender<ReloadMsg>,
    shutdown_rx: Receiver<()>,
) {
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            log!("error"; "failed to create tokio runtime: {}", e);
            return;
        }
    };

    rt.block_on(async {
        let hub_handle = tokio::spawn(hub.run());
        let watch_handle = tokio::spawn(watcher.run());

        while shutdown_rx.try_recv().is_err() && !is_shutdown() {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        debug!("watch"; "shutdown signal received");

        watch_handle.abort();
        let _ = hub_tx.send(ReloadMsg::Shutdown).await;
        let _ = tokio::time::timeout(Duration::from_millis(500), hub_handle).await;
    });

    // A rebuild may still be running on the blocking pool.
    rt.shutdown_timeout(Duration::from_millis(500));
}

/// Wait for actor system to shutdown gracefully (max 2 seconds).
pub fn wait_for_shutdown(actors: Option<Actors>) {
    let Some(Actors { handle, .. }) = actors else {
        return;
    };

    for _ in 0..40 {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        thread::sleep(Duration::from_millis(50));
    }
}

//! Development server with live reload support.
//!
//! Static files are served from `serve.base_dir`; HTML responses get the
//! live reload client injected when watching is enabled.

mod content;
mod lifecycle;
mod path;
mod response;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use crossbeam::channel;
use tiny_http::{Request, Server};

use crate::{
    config::PipelineConfig,
    core::{is_shutdown, register_server},
    embed::serve::{RELOAD_JS_URL, ReloadVars},
    log,
};

/// What a request handler needs to know.
struct ServeSite {
    root: PathBuf,
    /// Live reload client settings; `None` with watching disabled
    reload: Option<ReloadVars>,
}

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    shutdown_rx: channel::Receiver<()>,
}

/// Bind the HTTP server without starting the request loop.
pub fn bind_server(config: &PipelineConfig) -> Result<BoundServer> {
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    register_server(Arc::clone(&server), shutdown_tx);

    log!("serve"; "http://{} -> {}", addr, config.serve_root().display());
    if config.serve.open {
        log!("serve"; "open http://{} in your browser", addr);
    }

    Ok(BoundServer {
        server,
        shutdown_rx,
    })
}

impl BoundServer {
    /// Start watcher and reload hub, then serve until shutdown (blocking).
    pub fn run(self, config: Arc<PipelineConfig>) -> Result<()> {
        let root = config.serve_root().to_path_buf();
        let notify = config.serve.notify;

        let actors = lifecycle::spawn_actors(config, self.shutdown_rx)?;
        let site = Arc::new(ServeSite {
            root,
            reload: actors.as_ref().map(|actors| ReloadVars {
                ws_port: actors.ws_port,
                notify,
            }),
        });

        run_request_loop(&self.server, &site)?;
        lifecycle::wait_for_shutdown(actors);
        Ok(())
    }
}

fn run_request_loop(server: &Server, site: &Arc<ServeSite>) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .thread_name(|i| format!("assetflow-http-{i}"))
        .build()
        .context("failed to create request thread pool")?;

    for request in server.incoming_requests() {
        let site = Arc::clone(site);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &site) {
                log!("serve"; "request error: {e:#}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(request: Request, site: &ServeSite) -> Result<()> {
    if is_shutdown() {
        return response::respond_unavailable(request);
    }

    if let Some(vars) = &site.reload
        && request.url() == RELOAD_JS_URL
    {
        return response::respond_reload_js(request, vars);
    }

    let reload = site.reload.is_some();
    match path::resolve_path(request.url(), &site.root) {
        Some(path) => response::respond_file(request, &path, reload),
        None => response::respond_not_found(request, &site.root, reload),
    }
}

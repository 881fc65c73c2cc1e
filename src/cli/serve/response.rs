//! Responses for the dev server: files, the reload client, 404 and 503.
//! Nothing is cached by the browser, every reload refetches.

use std::{fs, path::Path};

use anyhow::{Context, Result, anyhow};
use tiny_http::{Header, Method, Request, Response, StatusCode};

use super::content::maybe_inject_reload;
use crate::embed::serve::ReloadVars;
use crate::utils::mime::{
    self,
    types::{HTML, JAVASCRIPT, PLAIN},
};

/// A file from the served directory. HTML gets the reload script.
pub fn respond_file(request: Request, path: &Path, reload: bool) -> Result<()> {
    let content_type = mime::from_path(path);
    if is_head(&request) {
        return send(request, 200, content_type, None);
    }

    let body = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let body = maybe_inject_reload(body, content_type, reload);
    send(request, 200, content_type, Some(body))
}

/// `404.html` from the served directory when there is one, plain text
/// otherwise.
pub fn respond_not_found(request: Request, serve_root: &Path, reload: bool) -> Result<()> {
    let page = serve_root.join("404.html");
    let custom = page.is_file();
    if is_head(&request) {
        return send(request, 404, if custom { HTML } else { PLAIN }, None);
    }

    match custom.then(|| fs::read(&page)) {
        Some(Ok(body)) => send(request, 404, HTML, Some(maybe_inject_reload(body, HTML, reload))),
        _ => send(request, 404, PLAIN, Some(b"404 Not Found".to_vec())),
    }
}

/// Requests that arrive after Ctrl+C.
pub fn respond_unavailable(request: Request) -> Result<()> {
    send(request, 503, PLAIN, Some(b"503 Service Unavailable".to_vec()))
}

pub fn respond_reload_js(request: Request, vars: &ReloadVars) -> Result<()> {
    let body = (!is_head(&request)).then(|| vars.client_script().into_bytes());
    send(request, 200, JAVASCRIPT, body)
}

fn is_head(request: &Request) -> bool {
    *request.method() == Method::Head
}

/// `None` answers a HEAD request: headers only.
fn send(
    request: Request,
    status: u16,
    content_type: &'static str,
    body: Option<Vec<u8>>,
) -> Result<()> {
    let content_type = header("Content-Type", content_type)?;
    let no_cache = header("Cache-Control", "no-cache")?;
    let status = StatusCode(status);

    match body {
        Some(body) => request.respond(
            Response::from_data(body)
                .with_status_code(status)
                .with_header(content_type)
                .with_header(no_cache),
        ),
        None => request.respond(
            Response::empty(status)
                .with_header(content_type)
                .with_header(no_cache),
        ),
    }
    .context("failed to send response")
}

fn header(name: &'static str, value: &'static str) -> Result<Header> {
    Header::from_bytes(name, value).map_err(|()| anyhow!("invalid header {name}: {value}"))
}

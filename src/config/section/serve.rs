//! `[serve]`: the `dev` server and its live reload endpoint.
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"   # "0.0.0.0" to reach the server from the LAN
//! port = 3000
//! reload_port = 35729       # WebSocket endpoint the injected client connects to
//! watch = true
//! open = false              # log the URL to open once serving
//! notify = false            # toast in the page on connect and reload
//! base_dir = "dist"         # defaults to paths.output
//! ```

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    pub interface: IpAddr,
    /// First HTTP port tried; the server moves up when it is taken.
    pub port: u16,
    /// First WebSocket port tried, with the same fallback.
    pub reload_port: u16,
    /// Rebuild and reload on source changes. `--no-watch` turns it off.
    pub watch: bool,
    pub open: bool,
    pub notify: bool,
    pub base_dir: Option<PathBuf>,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            reload_port: 35729,
            watch: true,
            open: false,
            notify: false,
            base_dir: None,
        }
    }
}

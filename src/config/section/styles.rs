//! `[styles]` and `[vendor]` section configuration.
//!
//! ```toml
//! [styles]
//! # compiled before the project stylesheets, in this order
//! vendor = [
//!     "node_modules/bootstrap/scss/bootstrap.scss",
//!     "node_modules/@fortawesome/fontawesome-free/scss/fontawesome.scss",
//! ]
//! load_paths = ["node_modules"]
//!
//! [vendor]
//! # copied into the scripts destination, in load order
//! scripts = ["node_modules/jquery/dist/jquery.min.js"]
//! ```
//!
//! All entries are relative to the project root.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Vendor stylesheet sources and sass import paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StylesConfig {
    /// Stylesheets compiled ahead of `[assets.styles]`, in order.
    pub vendor: Vec<String>,
    /// Extra directories searched by `@import`/`@use`.
    pub load_paths: Vec<PathBuf>,
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            vendor: vec![
                "node_modules/bootstrap/scss/bootstrap.scss".into(),
                "node_modules/@fortawesome/fontawesome-free/scss/fontawesome.scss".into(),
            ],
            load_paths: vec!["node_modules".into()],
        }
    }
}

/// Vendor scripts copied verbatim into the scripts destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorConfig {
    pub scripts: Vec<String>,
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            scripts: vec![
                "node_modules/bootstrap/dist/js/bootstrap.bundle.min.js".into(),
                "node_modules/@fortawesome/fontawesome-free/js/all.min.js".into(),
                "node_modules/jquery/dist/jquery.min.js".into(),
                "node_modules/babel-polyfill/dist/polyfill.min.js".into(),
            ],
        }
    }
}

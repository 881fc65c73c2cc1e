//! `[paths]` section configuration.
//!
//! ```toml
//! [paths]
//! source = "src"      # root of every [assets.*] source glob
//! output = "dist"     # root of every [assets.*] destination
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Source and output roots, relative to the project root until loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub source: PathBuf,
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: "src".into(),
            output: "dist".into(),
        }
    }
}

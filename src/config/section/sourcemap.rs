//! `[sourcemaps]` section configuration.
//!
//! ```toml
//! [sourcemaps.css]
//! enable = true
//! path = "sourcemaps"   # relative to the stylesheet destination
//!
//! [sourcemaps.js]
//! enable = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Source map toggle and directory for one pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcemapEntry {
    pub enable: bool,
    /// Directory for `.map` files, relative to the task destination.
    pub path: PathBuf,
}

impl Default for SourcemapEntry {
    fn default() -> Self {
        Self {
            enable: true,
            path: "sourcemaps".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcemapsConfig {
    pub css: SourcemapEntry,
    pub js: SourcemapEntry,
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;
    use std::path::Path;

    #[test]
    fn test_sourcemaps_defaults() {
        let config = test_parse_config("");
        assert!(config.sourcemaps.css.enable);
        assert!(config.sourcemaps.js.enable);
        assert_eq!(config.sourcemaps.js.path, Path::new("sourcemaps"));
    }

    #[test]
    fn test_sourcemaps_independent() {
        let config = test_parse_config("[sourcemaps.js]\nenable = false\n[sourcemaps.css]\npath = \"maps\"");
        assert!(!config.sourcemaps.js.enable);
        assert!(config.sourcemaps.css.enable);
        assert_eq!(config.sourcemaps.css.path, Path::new("maps"));
    }
}

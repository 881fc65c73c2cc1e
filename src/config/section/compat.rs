//! `[compat]` section configuration.
//!
//! Browser support list shared by the autoprefixer, the transpiler presets
//! and the script minifier.
//!
//! ```toml
//! [compat]
//! browsers = ["> 1%", "ie >= 8", "chrome >= 45"]
//! presets = ["@babel/preset-env"]
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompatConfig {
    /// Browserslist queries used for vendor prefixing.
    pub browsers: Vec<String>,
    /// Transpiler presets applied to project scripts.
    pub presets: Vec<String>,
}

impl Default for CompatConfig {
    fn default() -> Self {
        let browsers = [
            "> 1%",
            "ie >= 8",
            "edge >= 15",
            "ie_mob >= 10",
            "ff >= 45",
            "chrome >= 45",
            "safari >= 7",
            "opera >= 23",
            "ios >= 7",
            "android >= 4",
            "bb >= 10",
        ];
        Self {
            browsers: browsers.into_iter().map(String::from).collect(),
            presets: vec!["@babel/preset-env".into()],
        }
    }
}

impl CompatConfig {
    /// Parse configured presets, returning the first unknown name on failure.
    pub fn parsed_presets(&self) -> Result<Vec<Preset>, &str> {
        self.presets
            .iter()
            .map(|name| Preset::parse(name).ok_or(name.as_str()))
            .collect()
    }
}

/// Recognised transpiler presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Lower whatever syntax the configured browsers lack.
    Env,
}

impl Preset {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "@babel/preset-env" | "babel-preset-env" | "env" => Some(Self::Env),
            _ => None,
        }
    }
}

//! `[assets.*]` section configuration.
//!
//! Maps each logical asset kind to a source glob (relative to
//! `paths.source`) and a destination directory (relative to `paths.output`).
//!
//! ```toml
//! [assets.images]
//! source = "images/**/*"
//! destination = "images"
//!
//! [assets.html]
//! source = "*.html"
//! destination = ""        # output root
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical asset kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Styles,
    Scripts,
    Html,
    Images,
    Fonts,
}

impl AssetKind {
    pub const ALL: [Self; 5] = [
        Self::Styles,
        Self::Scripts,
        Self::Html,
        Self::Images,
        Self::Fonts,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Styles => "styles",
            Self::Scripts => "scripts",
            Self::Html => "html",
            Self::Images => "images",
            Self::Fonts => "fonts",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Source glob and destination directory for one asset kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetEntry {
    pub source: String,
    pub destination: String,
}

impl AssetEntry {
    fn new(source: &str, destination: &str) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "AssetsFile")]
pub struct AssetsConfig {
    pub styles: AssetEntry,
    pub scripts: AssetEntry,
    pub html: AssetEntry,
    pub images: AssetEntry,
    pub fonts: AssetEntry,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            styles: AssetEntry::new("sass/**/*.scss", "css"),
            scripts: AssetEntry::new("js/**/*.js", "js"),
            html: AssetEntry::new("*.html", ""),
            images: AssetEntry::new("images/**/*", "images"),
            fonts: AssetEntry::new("fonts/**/*", "fonts"),
        }
    }
}

/// `[assets]` as written. Omitted kinds and fields keep the kind's default.
#[derive(Default, Deserialize)]
#[serde(default)]
struct AssetsFile {
    styles: EntryFile,
    scripts: EntryFile,
    html: EntryFile,
    images: EntryFile,
    fonts: EntryFile,
}

#[derive(Default, Deserialize)]
struct EntryFile {
    source: Option<String>,
    destination: Option<String>,
}

impl EntryFile {
    fn or(self, default: AssetEntry) -> AssetEntry {
        AssetEntry {
            source: self.source.unwrap_or(default.source),
            destination: self.destination.unwrap_or(default.destination),
        }
    }
}

impl From<AssetsFile> for AssetsConfig {
    fn from(file: AssetsFile) -> Self {
        let defaults = Self::default();
        Self {
            styles: file.styles.or(defaults.styles),
            scripts: file.scripts.or(defaults.scripts),
            html: file.html.or(defaults.html),
            images: file.images.or(defaults.images),
            fonts: file.fonts.or(defaults.fonts),
        }
    }
}

impl AssetsConfig {
    pub fn get(&self, kind: AssetKind) -> &AssetEntry {
        match kind {
            AssetKind::Styles => &self.styles,
            AssetKind::Scripts => &self.scripts,
            AssetKind::Html => &self.html,
            AssetKind::Images => &self.images,
            AssetKind::Fonts => &self.fonts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_assets_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.assets.styles.source, "sass/**/*.scss");
        assert_eq!(config.assets.styles.destination, "css");
        assert_eq!(config.assets.html.source, "*.html");
        assert_eq!(config.assets.html.destination, "");
        assert_eq!(config.assets.fonts.destination, "fonts");
    }

    #[test]
    fn test_assets_override_single_kind() {
        let config = test_parse_config(
            "[assets.images]\nsource = \"img/**/*.png\"\ndestination = \"static/img\"",
        );
        assert_eq!(config.assets.images.source, "img/**/*.png");
        assert_eq!(config.assets.images.destination, "static/img");
        // untouched kinds keep defaults
        assert_eq!(config.assets.scripts.source, "js/**/*.js");
    }

    #[test]
    fn test_assets_partial_entry_keeps_kind_defaults() {
        let config = test_parse_config("[assets.images]\nsource = \"img/**/*\"");
        assert_eq!(config.assets.images.source, "img/**/*");
        assert_eq!(config.assets.images.destination, "images");

        let config = test_parse_config("[assets.fonts]\ndestination = \"static/fonts\"");
        assert_eq!(config.assets.fonts.source, "fonts/**/*");
        assert_eq!(config.assets.fonts.destination, "static/fonts");
    }

    #[test]
    fn test_asset_kind_lookup() {
        let assets = AssetsConfig::default();
        for kind in AssetKind::ALL {
            assert!(!assets.get(kind).source.is_empty());
        }
        assert_eq!(AssetKind::Fonts.to_string(), "fonts");
    }
}

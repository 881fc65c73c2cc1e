//! Pipeline configuration management for `assetflow.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── assets     # [assets.*]
//! │   ├── compat     # [compat]
//! │   ├── paths      # [paths]
//! │   ├── serve      # [serve]
//! │   ├── sourcemap  # [sourcemaps]
//! │   └── styles     # [styles], [vendor]
//! ├── types/         # ConfigError, ConfigDiagnostics, FieldPath
//! └── mod.rs         # PipelineConfig (this file)
//! ```
//!
//! The config file is optional. Without one, every section falls back to
//! the built-in defaults (bootstrap + fontawesome vendor assets, `src/` →
//! `dist/`). The loaded value is immutable and shared by reference.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{
    AssetKind, AssetsConfig, CompatConfig, PathsConfig, Preset, ServeConfig,
    SourcemapEntry, SourcemapsConfig, StylesConfig, VendorConfig,
};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::{Cli, Commands, DEFAULT_CONFIG},
    debug, log,
    utils::path::{is_within, normalize_path},
};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing `assetflow.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Absolute path to the config file, if one was found
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Project root directory (config file parent, or cwd)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub assets: AssetsConfig,

    #[serde(default)]
    pub styles: StylesConfig,

    #[serde(default)]
    pub vendor: VendorConfig,

    #[serde(default)]
    pub compat: CompatConfig,

    #[serde(default)]
    pub sourcemaps: SourcemapsConfig,

    #[serde(default)]
    pub serve: ServeConfig,
}

impl PipelineConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file. The project root is the
    /// config file's parent directory, or cwd when running on defaults.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let (mut config, root) = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                let root = path.parent().map(Path::to_path_buf).unwrap_or(cwd);
                config.config_path = Some(path);
                (config, root)
            }
            None if cli.config != Path::new(DEFAULT_CONFIG) => {
                bail!("Config file '{}' not found", cli.config.display());
            }
            None => {
                debug!("config"; "no {} found, using defaults", DEFAULT_CONFIG);
                (Self::default(), cwd)
            }
        };

        config.apply_cli(cli);
        config.finalize(&root);
        config.validate()?;
        Ok(config)
    }

    /// Default configuration rooted at `root`, with paths normalized.
    #[cfg(test)]
    pub fn rooted_at(root: &Path) -> Self {
        let mut config = Self::default();
        config.finalize(root);
        config
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply CLI overrides on top of file values.
    fn apply_cli(&mut self, cli: &Cli) {
        crate::logger::set_verbose(cli.verbose);

        Self::update_option(&mut self.paths.source, cli.source.as_ref());
        Self::update_option(&mut self.paths.output, cli.output.as_ref());

        if let Some(Commands::Dev {
            interface,
            port,
            watch,
            no_watch,
        }) = &cli.command
        {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
            Self::update_option(&mut self.serve.watch, watch.as_ref());
            if *no_watch {
                self.serve.watch = false;
            }
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    /// Resolve every relative path against the project root.
    fn finalize(&mut self, root: &Path) {
        let root = normalize_path(root);

        self.paths.source = normalize_path(&root.join(&self.paths.source));
        self.paths.output = normalize_path(&root.join(&self.paths.output));
        self.styles.load_paths = self
            .styles
            .load_paths
            .iter()
            .map(|p| root.join(p))
            .collect();
        self.serve.base_dir = Some(match self.serve.base_dir.take() {
            Some(dir) => normalize_path(&root.join(dir)),
            None => self.paths.output.clone(),
        });

        self.root = root;
    }

    // ========================================================================
    // derived paths
    // ========================================================================

    /// Absolute source glob for an asset kind.
    pub fn source_glob(&self, kind: AssetKind) -> String {
        join_glob(&self.paths.source, &self.assets.get(kind).source)
    }

    /// Absolute destination directory for an asset kind.
    pub fn destination(&self, kind: AssetKind) -> PathBuf {
        let dest = &self.assets.get(kind).destination;
        if dest.is_empty() {
            self.paths.output.clone()
        } else {
            self.paths.output.join(dest)
        }
    }

    /// Ordered stylesheet sources: vendor stylesheets, then project styles.
    pub fn stylesheet_sources(&self) -> Vec<String> {
        self.styles
            .vendor
            .iter()
            .map(|p| join_glob(&self.root, p))
            .chain(std::iter::once(self.source_glob(AssetKind::Styles)))
            .collect()
    }

    /// Ordered vendor script sources.
    pub fn vendor_scripts(&self) -> Vec<String> {
        self.vendor
            .scripts
            .iter()
            .map(|p| join_glob(&self.root, p))
            .collect()
    }

    /// Globs the dev watcher listens to (images, fonts, html, styles, scripts).
    pub fn watch_globs(&self) -> Vec<String> {
        [
            AssetKind::Images,
            AssetKind::Fonts,
            AssetKind::Html,
            AssetKind::Styles,
            AssetKind::Scripts,
        ]
        .into_iter()
        .map(|kind| self.source_glob(kind))
        .collect()
    }

    /// Directory receiving `.map` files for a task writing into `destination`.
    pub fn sourcemap_dir(&self, entry: &SourcemapEntry, destination: &Path) -> Option<PathBuf> {
        entry.enable.then(|| destination.join(&entry.path))
    }

    /// Directory served by the dev server.
    pub fn serve_root(&self) -> &Path {
        self.serve
            .base_dir
            .as_deref()
            .unwrap_or(self.paths.output.as_path())
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.validate_compat(&mut diag);
        self.validate_globs(&mut diag);
        self.validate_overlap(&mut diag);

        if self.serve.port == self.serve.reload_port {
            diag.error(
                FieldPath::new("serve.reload_port"),
                format!("must differ from serve.port ({})", self.serve.port),
            );
        }

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }

    fn validate_compat(&self, diag: &mut ConfigDiagnostics) {
        if let Err(e) = crate::asset::style::resolve_targets(&self.compat.browsers) {
            diag.error(
                FieldPath::new("compat.browsers"),
                format!("cannot resolve browser list: {e}"),
            );
        }

        if let Err(name) = self.compat.parsed_presets() {
            diag.error_with_hint(
                FieldPath::new("compat.presets"),
                format!("unknown preset `{name}`"),
                "supported presets: `@babel/preset-env`, `env`",
            );
        }

        if let Err(e) = crate::asset::script::ScriptTargets::from_compat(&self.compat) {
            diag.error(
                FieldPath::new("compat.browsers"),
                format!("cannot resolve script targets: {e}"),
            );
        }
    }

    fn validate_globs(&self, diag: &mut ConfigDiagnostics) {
        let patterns = AssetKind::ALL
            .into_iter()
            .map(|kind| self.source_glob(kind))
            .chain(self.stylesheet_sources())
            .chain(self.vendor_scripts());

        for pattern in patterns {
            if let Err(e) = glob::Pattern::new(&pattern) {
                diag.error(
                    FieldPath::new("assets"),
                    format!("invalid glob `{pattern}`: {e}"),
                );
            }
        }
    }

    /// A task must never read from the directory it writes into.
    fn validate_overlap(&self, diag: &mut ConfigDiagnostics) {
        if self.paths.source == self.paths.output {
            diag.error(
                FieldPath::new("paths.output"),
                "must differ from paths.source",
            );
            return;
        }

        for kind in AssetKind::ALL {
            let pattern = self.source_glob(kind);
            let base = crate::asset::glob_base(&pattern);
            let destination = self.destination(kind);
            if is_within(&base, &destination) {
                diag.error_with_hint(
                    FieldPath::new("assets"),
                    format!(
                        "{kind} source `{}` lies inside its destination `{}`",
                        base.display(),
                        destination.display()
                    ),
                    "move the destination outside the source tree",
                );
            } else if reaches_into(&pattern, &base, &destination) {
                diag.error_with_hint(
                    FieldPath::new("assets"),
                    format!(
                        "{kind} destination `{}` lies inside its source `{}`",
                        destination.display(),
                        base.display()
                    ),
                    "move the output directory outside the source tree",
                );
            }
        }
    }
}

/// Whether a source glob rooted at `base` can match files written into
/// `destination`, a directory below `base`.
fn reaches_into(pattern: &str, base: &Path, destination: &Path) -> bool {
    is_within(destination, base) && pattern.contains("**")
}

/// Join a root directory and a (possibly glob) relative pattern.
fn join_glob(root: &Path, pattern: &str) -> String {
    if Path::new(pattern).is_absolute() {
        pattern.to_string()
    } else {
        root.join(pattern).to_string_lossy().into_owned()
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config from a TOML snippet.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> PipelineConfig {
    let (parsed, ignored) = PipelineConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

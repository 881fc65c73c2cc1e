//! Pipeline tasks and their orderings.
//!
//! Every task reads a source set, applies delegated transformations in a
//! fixed order and writes under its destination. Tasks never look at which
//! file changed; a rebuild always reprocesses the whole set.
//!
//! ```text
//! dev:    styles | vendor | scripts | images | fonts | html   (parallel)
//! watch:  images > fonts > html > styles > scripts > reload   (series)
//! prod:   minify-styles | minify-scripts                      (parallel)
//! ```

mod copy;
mod runner;
mod scripts;
mod styles;

#[cfg(test)]
pub(crate) mod fixture;

use anyhow::Result;
use clap::ValueEnum;

use crate::config::{AssetKind, PipelineConfig};
use crate::reload::Reloader;

pub use runner::{TaskReport, log_summary, run_parallel, run_series};

/// A named pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Task {
    Styles,
    Vendor,
    Scripts,
    Html,
    Images,
    Fonts,
    Reload,
    MinifyStyles,
    MinifyScripts,
}

/// Initial development build.
pub const DEV_PARALLEL: &[Task] = &[
    Task::Styles,
    Task::Vendor,
    Task::Scripts,
    Task::Images,
    Task::Fonts,
    Task::Html,
];

/// Re-run on every change batch.
pub const WATCH_SERIES: &[Task] = &[
    Task::Images,
    Task::Fonts,
    Task::Html,
    Task::Styles,
    Task::Scripts,
    Task::Reload,
];

/// Production build.
pub const PROD_PARALLEL: &[Task] = &[Task::MinifyStyles, Task::MinifyScripts];

impl Task {
    pub const ALL: [Self; 9] = [
        Self::Styles,
        Self::Vendor,
        Self::Scripts,
        Self::Html,
        Self::Images,
        Self::Fonts,
        Self::Reload,
        Self::MinifyStyles,
        Self::MinifyScripts,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Styles => "styles",
            Self::Vendor => "vendor",
            Self::Scripts => "scripts",
            Self::Html => "html",
            Self::Images => "images",
            Self::Fonts => "fonts",
            Self::Reload => "reload",
            Self::MinifyStyles => "minify-styles",
            Self::MinifyScripts => "minify-scripts",
        }
    }

    pub const fn describe(self) -> &'static str {
        match self {
            Self::Styles => "compile stylesheets and add vendor prefixes",
            Self::Vendor => "copy vendor scripts into the scripts destination",
            Self::Scripts => "transpile scripts for legacy browsers",
            Self::Html => "copy html pages",
            Self::Images => "copy images",
            Self::Fonts => "copy fonts",
            Self::Reload => "tell connected browsers to reload",
            Self::MinifyStyles => "compile, prefix and minify stylesheets with source maps",
            Self::MinifyScripts => "minify built scripts in place with source maps",
        }
    }

    /// Pipelines this task is part of.
    pub fn pipelines(self) -> Vec<&'static str> {
        [
            ("dev", DEV_PARALLEL),
            ("watch", WATCH_SERIES),
            ("prod", PROD_PARALLEL),
        ]
        .into_iter()
        .filter(|(_, tasks)| tasks.contains(&self))
        .map(|(name, _)| name)
        .collect()
    }

    /// Execute the task once.
    pub fn run(self, ctx: &TaskContext) -> Result<TaskStats> {
        let config = ctx.config;
        match self {
            Self::Styles => styles::compile(config, false),
            Self::MinifyStyles => styles::compile(config, true),
            Self::Scripts => scripts::transpile(config),
            Self::MinifyScripts => scripts::minify(config),
            Self::Vendor => copy::copy_files(
                &config.vendor_scripts(),
                &config.destination(AssetKind::Scripts),
            ),
            Self::Html => copy::copy_kind(config, AssetKind::Html),
            Self::Images => copy::copy_kind(config, AssetKind::Images),
            Self::Fonts => copy::copy_kind(config, AssetKind::Fonts),
            Self::Reload => {
                ctx.reloader.reload("files changed");
                Ok(TaskStats::default())
            }
        }
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Shared, read-only inputs of a task run.
#[derive(Clone, Copy)]
pub struct TaskContext<'a> {
    pub config: &'a PipelineConfig,
    pub reloader: &'a dyn Reloader,
}

/// File counters of one task run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl std::fmt::Display for TaskStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} written", self.written)?;
        if self.skipped > 0 {
            write!(f, ", {} skipped", self.skipped)?;
        }
        if self.failed > 0 {
            write!(f, ", {} failed", self.failed)?;
        }
        Ok(())
    }
}

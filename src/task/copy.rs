//! Byte-for-byte copy tasks (html, images, fonts, vendor scripts).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::TaskStats;
use crate::asset::SourceSet;
use crate::config::{AssetKind, PipelineConfig};
use crate::debug;
use crate::utils::plural_count;

/// Copy the source glob of `kind` into its destination.
pub fn copy_kind(config: &PipelineConfig, kind: AssetKind) -> Result<TaskStats> {
    copy_files(&[config.source_glob(kind)], &config.destination(kind))
}

pub fn copy_files(patterns: &[String], destination: &Path) -> Result<TaskStats> {
    let sources = SourceSet::resolve(patterns)?;
    let mut stats = TaskStats::default();
    if sources.is_empty() {
        return Ok(stats);
    }
    debug!("copy"; "{} -> {}", plural_count(sources.len(), "file"), destination.display());

    for file in &sources {
        let output = file.output_path(destination);
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::copy(&file.path, &output).with_context(|| {
            format!(
                "failed to copy {} to {}",
                file.path.display(),
                output.display()
            )
        })?;
        debug!("copy"; "{} -> {}", file.path.display(), output.display());
        stats.written += 1;
    }

    Ok(stats)
}

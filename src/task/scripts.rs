//! `scripts` and `minify-scripts`.
//!
//! A file that fails to parse is reported and skipped; the other files of
//! the task are still written, then the task fails with the count.

use std::fs;

use anyhow::{Context, Result, anyhow, bail};

use super::TaskStats;
use crate::asset::sourcemap::{self, Annotation};
use crate::asset::script::{self, ScriptTargets};
use crate::asset::SourceSet;
use crate::config::{AssetKind, PipelineConfig, Preset};
use crate::utils::{path::display_relative, plural_count};
use crate::{debug, log};

/// Transpile project scripts into the scripts destination.
///
/// Without presets the scripts are copied unchanged.
pub fn transpile(config: &PipelineConfig) -> Result<TaskStats> {
    let presets = config
        .compat
        .parsed_presets()
        .map_err(|name| anyhow!("unknown preset `{name}`"))?;
    let targets = if presets.contains(&Preset::Env) {
        Some(ScriptTargets::from_compat(&config.compat).map_err(|e| anyhow!(e))?)
    } else {
        None
    };

    let destination = config.destination(AssetKind::Scripts);
    let sources = SourceSet::resolve(&[config.source_glob(AssetKind::Scripts)])?;
    let mut stats = TaskStats::default();

    for file in &sources {
        let source = fs::read_to_string(&file.path)
            .with_context(|| format!("failed to read {}", file.path.display()))?;

        let code = match &targets {
            Some(targets) => match script::transpile(&source, &file.path, targets) {
                Ok(code) => code,
                Err(e) => {
                    log!("error"; "{}: {}", display_relative(&file.path, &config.root), e);
                    stats.failed += 1;
                    continue;
                }
            },
            None => source,
        };

        let output = file.output_path(&destination);
        sourcemap::write_file(&output, code.as_bytes())?;
        debug!("scripts"; "{}", display_relative(&output, &config.root));
        stats.written += 1;
    }

    finish(stats)
}

/// Minify every built script in the scripts destination, in place.
///
/// Maps go to the configured sourcemap directory, which the `*.js` glob
/// does not match.
pub fn minify(config: &PipelineConfig) -> Result<TaskStats> {
    let targets = ScriptTargets::from_compat(&config.compat).map_err(|e| anyhow!(e))?;
    let destination = config.destination(AssetKind::Scripts);
    let map_dir = config.sourcemap_dir(&config.sourcemaps.js, &destination);
    let pattern = destination.join("**").join("*.js");
    let sources = SourceSet::resolve(&[pattern.to_string_lossy()])?;
    let mut stats = TaskStats::default();

    for file in &sources {
        if map_dir.as_deref().is_some_and(|dir| file.path.starts_with(dir)) {
            stats.skipped += 1;
            continue;
        }

        let source = fs::read_to_string(&file.path)
            .with_context(|| format!("failed to read {}", file.path.display()))?;
        let output = match script::minify_js(&source, &file.path, &targets, map_dir.is_some()) {
            Ok(output) => output,
            Err(e) => {
                log!("error"; "{}: {}", display_relative(&file.path, &config.root), e);
                stats.failed += 1;
                continue;
            }
        };

        let map = output.map.as_deref().zip(map_dir.as_deref());
        sourcemap::write_with_map(&file.path, &output.code, map, file.relative(), Annotation::Js)?;
        debug!("minify-scripts"; "{}", display_relative(&file.path, &config.root));
        stats.written += 1;
    }

    finish(stats)
}

fn finish(stats: TaskStats) -> Result<TaskStats> {
    if stats.failed > 0 {
        bail!(
            "{} failed ({} written)",
            plural_count(stats.failed, "script"),
            stats.written
        );
    }
    Ok(stats)
}

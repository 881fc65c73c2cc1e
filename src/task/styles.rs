//! `styles` and `minify-styles`.
//!
//! Both compile the ordered stylesheet sources (vendor first, project last)
//! and prefix the result for the browser list. The production variant also
//! minifies and writes a source map per stylesheet.
//!
//! Compile errors are per-file: logged with the compiler message, counted
//! as failed, and the remaining stylesheets are still built.

use anyhow::{Result, anyhow};

use super::TaskStats;
use crate::asset::sourcemap::{self, Annotation};
use crate::asset::{SourceFile, SourceSet, style};
use crate::config::{AssetKind, PipelineConfig};
use crate::logger::is_verbose;
use crate::utils::path::display_relative;
use crate::{debug, log};

pub fn compile(config: &PipelineConfig, minify: bool) -> Result<TaskStats> {
    let module = if minify { "minify-styles" } else { "styles" };
    let targets = style::resolve_targets(&config.compat.browsers).map_err(|e| anyhow!(e))?;
    let destination = config.destination(AssetKind::Styles);
    let map_dir = if minify {
        config.sourcemap_dir(&config.sourcemaps.css, &destination)
    } else {
        None
    };

    let sources = SourceSet::resolve(&config.stylesheet_sources())?;
    let mut stats = TaskStats::default();

    for file in &sources {
        if style::is_partial(&file.path) {
            stats.skipped += 1;
            continue;
        }

        let output = match build_one(config, file, targets.clone(), minify, map_dir.is_some()) {
            Ok(output) => output,
            Err(e) => {
                log!("error"; "{}: {}", display_relative(&file.path, &config.root), e);
                stats.failed += 1;
                continue;
            }
        };

        let relative = style::output_name(file.relative());
        let path = destination.join(&relative);
        let map = output.map.as_deref().zip(map_dir.as_deref());
        sourcemap::write_with_map(&path, &output.code, map, &relative, Annotation::Css)?;

        debug!(module; "{}", display_relative(&path, &config.root));
        stats.written += 1;
    }

    Ok(stats)
}

fn build_one(
    config: &PipelineConfig,
    file: &SourceFile,
    targets: lightningcss::targets::Targets,
    minify: bool,
    with_map: bool,
) -> Result<style::CssOutput, crate::asset::AssetError> {
    let css = style::compile_scss(&file.path, &config.styles.load_paths, !is_verbose())?;
    let filename = style::output_name(file.relative());
    style::process_css(
        &css,
        &filename.to_string_lossy(),
        targets,
        minify,
        with_map,
    )
}

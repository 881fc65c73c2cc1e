//! `dev`: initial parallel build, then serve and watch.

use std::sync::Arc;

use anyhow::Result;

use super::serve;
use crate::config::PipelineConfig;
use crate::log;
use crate::reload::NoReload;
use crate::task::{DEV_PARALLEL, TaskContext, log_summary, run_parallel};
use crate::utils::plural_count;

/// Build the site once, then serve it until Ctrl+C.
///
/// Task failures are logged; the server starts regardless so a fix can be
/// picked up by the watcher.
pub fn run_dev(config: PipelineConfig) -> Result<()> {
    let config = Arc::new(config);
    let server = serve::bind_server(&config)?;

    let ctx = TaskContext {
        config: &config,
        reloader: &NoReload,
    };
    let reports = run_parallel(DEV_PARALLEL, &ctx);
    let failed = log_summary(&reports);
    if failed > 0 {
        log!("warning"; "{} failed, serving the last good output", plural_count(failed, "task"));
    }

    server.run(config)
}

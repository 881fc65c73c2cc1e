//! File watcher actor for the dev pipeline.
//!
//! ```text
//! notify --std mpsc--> bridge thread --tokio mpsc--> WatchActor
//!                                                       |
//!                              ChangeBatch (settle 200ms)
//!                                                       |
//!                       spawn_blocking(run_series(WATCH_SERIES))
//! ```
//!
//! While a series runs the actor does not poll its channel, so new events
//! queue up and form the next batch once the series is done. A running
//! series is never cancelled.

mod batch;

#[cfg(test)]
mod tests;

pub use batch::{ChangeBatch, SETTLE_MS, WatchFilter};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::PipelineConfig;
use crate::core::{RebuildGuard, is_rebuilding};
use crate::logger::{status_error, status_success, status_warning};
use crate::reload::Reloader;
use crate::task::{TaskContext, TaskReport, WATCH_SERIES, run_series};
use crate::utils::path::display_relative;
use crate::{debug, log};

/// Changed paths listed before the rest is summarized.
const MAX_LISTED: usize = 3;

/// Watches source directories and re-runs the watch series per batch.
pub struct WatchActor {
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Must stay alive for events to flow
    _watcher: RecommendedWatcher,
    batch: ChangeBatch,
    config: Arc<PipelineConfig>,
    reloader: Arc<dyn Reloader>,
}

impl WatchActor {
    /// Start watching immediately; events buffer until [`run`](Self::run).
    pub fn new(config: Arc<PipelineConfig>, reloader: Arc<dyn Reloader>) -> Result<Self> {
        let filter = WatchFilter::new(&config.watch_globs())?;

        let (notify_tx, notify_rx) = std::sync::mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })
        .context("failed to create file watcher")?;

        for root in filter.roots() {
            if !root.is_dir() {
                debug!("watch"; "skipping missing directory {}", root.display());
                continue;
            }
            watcher
                .watch(root, RecursiveMode::Recursive)
                .with_context(|| format!("failed to watch {}", root.display()))?;
            debug!("watch"; "watching {}", display_relative(root, &config.root));
        }

        Ok(Self {
            notify_rx,
            _watcher: watcher,
            batch: ChangeBatch::new(filter),
            config,
            reloader,
        })
    }

    /// Run the actor event loop
    pub async fn run(self) {
        let Self {
            notify_rx,
            _watcher,
            mut batch,
            config,
            reloader,
        } = self;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if is_rebuilding() {
                            debug!("watch"; "change queued until the running rebuild finishes");
                        }
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                event = async_rx.recv() => match event {
                    Some(event) => { batch.add_event(&event); }
                    None => break,
                },
                _ = tokio::time::sleep(batch.sleep_duration()) => {
                    let Some(changes) = batch.take_if_ready() else { continue };

                    let config = Arc::clone(&config);
                    let reloader = Arc::clone(&reloader);
                    let start = Instant::now();
                    let result = {
                        let _running = RebuildGuard::enter();
                        tokio::task::spawn_blocking(move || {
                            rebuild(&config, reloader.as_ref(), &changes)
                        })
                        .await
                    };

                    match result {
                        Ok(reports) => report_status(&reports, start),
                        Err(e) => status_error("rebuild", &e.to_string()),
                    }
                }
            }
        }
    }
}

/// Run the watch series once for a batch of changed paths.
pub fn rebuild(
    config: &PipelineConfig,
    reloader: &dyn Reloader,
    changes: &[PathBuf],
) -> Vec<TaskReport> {
    log!("watch"; "{}", describe_changes(changes, config));
    let ctx = TaskContext { config, reloader };
    run_series(WATCH_SERIES, &ctx)
}

fn describe_changes(changes: &[PathBuf], config: &PipelineConfig) -> String {
    let mut listed: Vec<_> = changes
        .iter()
        .take(MAX_LISTED)
        .map(|path| display_relative(path, &config.root))
        .collect();
    if changes.len() > MAX_LISTED {
        listed.push(format!("+{} more", changes.len() - MAX_LISTED));
    }
    format!("changed: {}", listed.join(", "))
}

fn report_status(reports: &[TaskReport], start: Instant) {
    let errors: Vec<String> = reports
        .iter()
        .filter_map(|r| r.outcome.as_ref().err().map(|e| format!("{}: {:#}", r.task, e)))
        .collect();
    if !errors.is_empty() {
        status_error("rebuild failed", &errors.join("\n"));
        return;
    }

    let partial: Vec<String> = reports
        .iter()
        .filter_map(|r| match &r.outcome {
            Ok(stats) if stats.failed > 0 => Some(format!("{}: {}", r.task, stats)),
            _ => None,
        })
        .collect();
    if !partial.is_empty() {
        status_warning(&partial.join("\n"));
        return;
    }

    status_success(&format!("rebuilt in {}ms", start.elapsed().as_millis()));
}

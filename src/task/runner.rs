//! Parallel and serial task execution.

use std::time::{Duration, Instant};

use anyhow::Result;
use rayon::prelude::*;

use super::{Task, TaskContext, TaskStats};
use crate::logger::ProgressLine;
use crate::{debug, log};

/// Outcome of one task run.
#[derive(Debug)]
pub struct TaskReport {
    pub task: Task,
    pub outcome: Result<TaskStats>,
    pub elapsed: Duration,
}

impl TaskReport {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Run every task concurrently and wait for all of them.
///
/// Reports come back in declaration order. A failing task never stops
/// its siblings.
pub fn run_parallel(tasks: &[Task], ctx: &TaskContext) -> Vec<TaskReport> {
    let progress = ProgressLine::new(&[("tasks", tasks.len())]);

    let reports = tasks
        .par_iter()
        .map(|&task| {
            let report = run_one(task, ctx);
            progress.inc("tasks");
            report
        })
        .collect();

    progress.finish();
    reports
}

/// Run tasks one after another on the calling thread.
///
/// A failing task is reported and the series goes on, so a rebuild always
/// reaches its trailing `reload`.
pub fn run_series(tasks: &[Task], ctx: &TaskContext) -> Vec<TaskReport> {
    tasks.iter().map(|&task| run_one(task, ctx)).collect()
}

fn run_one(task: Task, ctx: &TaskContext) -> TaskReport {
    debug!(task.name(); "started");
    let start = Instant::now();
    let outcome = task.run(ctx);
    TaskReport {
        task,
        outcome,
        elapsed: start.elapsed(),
    }
}

/// Log one line per report and return the number of failed tasks.
pub fn log_summary(reports: &[TaskReport]) -> usize {
    let mut failed = 0;
    for report in reports {
        let ms = report.elapsed.as_millis();
        match &report.outcome {
            Ok(stats) => log!(report.task.name(); "{} in {}ms", stats, ms),
            Err(e) => {
                failed += 1;
                log!("error"; "{} failed after {}ms: {:#}", report.task, ms, e);
            }
        }
    }
    failed
}

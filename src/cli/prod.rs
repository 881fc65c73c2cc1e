//! `prod`, `run` and `tasks` commands.

use anyhow::{Result, bail};
use owo_colors::OwoColorize;

use crate::config::PipelineConfig;
use crate::reload::NoReload;
use crate::task::{PROD_PARALLEL, Task, TaskContext, TaskReport, log_summary, run_parallel, run_series};
use crate::utils::plural_count;

/// Run the production pipeline; fails if any task failed.
pub fn run_prod(config: &PipelineConfig) -> Result<()> {
    let ctx = TaskContext {
        config,
        reloader: &NoReload,
    };
    check(&run_parallel(PROD_PARALLEL, &ctx))
}

/// Run the named tasks one after another; fails if any task failed.
pub fn run_tasks(config: &PipelineConfig, tasks: &[Task]) -> Result<()> {
    let ctx = TaskContext {
        config,
        reloader: &NoReload,
    };
    check(&run_series(tasks, &ctx))
}

fn check(reports: &[TaskReport]) -> Result<()> {
    match log_summary(reports) {
        0 => Ok(()),
        failed => bail!("{} failed", plural_count(failed, "task")),
    }
}

/// Print every task with its description and pipelines.
pub fn list_tasks() {
    let width = Task::ALL.iter().map(|t| t.name().len()).max().unwrap_or(0);
    for task in Task::ALL {
        let pipelines = task.pipelines().join(", ");
        println!(
            "{:<width$}  {}  {}",
            task.name().bold(),
            task.describe(),
            format!("[{pipelines}]").dimmed(),
        );
    }
}

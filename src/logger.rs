//! Terminal output: prefixed log lines, the `[build]` progress line and the
//! status block redrawn after every watch rebuild.
//!
//! ```ignore
//! log!("styles"; "compiled {} files", count);
//! debug!("watch"; "skipping missing root {}", root.display());
//! ```

use std::io::{Write, stdout};
use std::sync::LazyLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::SystemTime;

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::{OwoColorize, Style};
use parking_lot::Mutex;

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set when a progress line owns the current terminal row.
static PROGRESS_ACTIVE: AtomicBool = AtomicBool::new(false);

pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::Relaxed);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// `log!("scripts"; "wrote {}", path.display())`
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Like `log!`, but only with `--verbose`.
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

pub fn log(module: &str, message: &str) {
    let mut out = stdout().lock();
    // a progress line has no trailing newline; take its row, it is redrawn on
    // the next increment
    if PROGRESS_ACTIVE.load(Ordering::Acquire) {
        execute!(out, cursor::MoveToColumn(0)).ok();
    }
    execute!(out, Clear(ClearType::CurrentLine)).ok();
    writeln!(out, "{} {message}", prefix(module)).ok();
    out.flush().ok();
}

fn prefix_style(module: &str) -> Style {
    let style = Style::new().bold();
    match module.to_ascii_lowercase().as_str() {
        "serve" | "reload" => style.bright_blue(),
        "watch" => style.bright_green(),
        "error" => style.bright_red(),
        "warning" => style.bright_magenta(),
        _ => style.bright_yellow(),
    }
}

fn prefix(module: &str) -> String {
    format!("[{module}]").style(prefix_style(module)).to_string()
}

/// Wall-clock `HH:MM:SS` in UTC.
fn clock(unix_secs: u64) -> String {
    let (h, m, s) = ((unix_secs / 3600) % 24, (unix_secs / 60) % 60, unix_secs % 60);
    format!("{h:02}:{m:02}:{s:02}")
}

fn now() -> String {
    let secs = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_or(0, |d| d.as_secs());
    clock(secs)
}

// Watch status

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Rebuilt,
    Partial,
    Failed,
}

impl Outcome {
    fn marker(self) -> String {
        match self {
            Self::Rebuilt => "✓".green().to_string(),
            Self::Partial => "⚠".yellow().to_string(),
            Self::Failed => "✗".red().to_string(),
        }
    }
}

/// The status block printed after each rebuild. Each new outcome erases the
/// previous block so the terminal shows only the latest one.
#[derive(Debug, Default)]
struct StatusBlock {
    rows: usize,
}

impl StatusBlock {
    fn show(&mut self, outcome: Outcome, text: &str) {
        let block = render_status(&now(), outcome, text);
        let mut out = stdout().lock();
        if self.rows > 0 {
            let rows = u16::try_from(self.rows).unwrap_or(u16::MAX);
            execute!(out, cursor::MoveUp(rows), Clear(ClearType::FromCursorDown)).ok();
        }
        writeln!(out, "{block}").ok();
        out.flush().ok();
        self.rows = block.lines().count();
    }
}

fn render_status(time: &str, outcome: Outcome, text: &str) -> String {
    format!("{} {} {text}", format!("[{time}]").dimmed(), outcome.marker())
}

static STATUS: LazyLock<Mutex<StatusBlock>> = LazyLock::new(Mutex::default);

pub fn status_success(message: &str) {
    STATUS.lock().show(Outcome::Rebuilt, message);
}

/// A failed rebuild: the summary, then the collected errors underneath.
pub fn status_error(summary: &str, detail: &str) {
    let text = if detail.is_empty() {
        summary.to_string()
    } else {
        format!("{summary}\n{detail}")
    };
    STATUS.lock().show(Outcome::Failed, &text);
}

pub fn status_warning(detail: &str) {
    STATUS.lock().show(Outcome::Partial, detail);
}

// Progress line

struct Counter {
    name: &'static str,
    total: usize,
    done: AtomicUsize,
}

/// One-row progress for a parallel run, e.g. `[build] tasks(4/6)`.
///
/// Workers call [`ProgressLine::inc`] concurrently. A redraw is skipped when
/// another thread is already drawing; [`ProgressLine::finish`] always draws
/// the final counts.
pub struct ProgressLine {
    counters: Vec<Counter>,
    drawing: Mutex<()>,
    finished: AtomicBool,
}

impl ProgressLine {
    /// Counters with a zero total are left out.
    pub fn new(items: &[(&'static str, usize)]) -> Self {
        let counters = items
            .iter()
            .filter(|(_, total)| *total > 0)
            .map(|&(name, total)| Counter {
                name,
                total,
                done: AtomicUsize::new(0),
            })
            .collect();
        let progress = Self {
            counters,
            drawing: Mutex::new(()),
            finished: AtomicBool::new(false),
        };
        PROGRESS_ACTIVE.store(true, Ordering::Release);
        progress.draw(false);
        progress
    }

    pub fn inc(&self, name: &str) {
        let Some(counter) = self.counters.iter().find(|c| c.name == name) else {
            return;
        };
        counter.done.fetch_add(1, Ordering::Relaxed);
        if let Some(_guard) = self.drawing.try_lock() {
            self.draw(false);
        }
    }

    /// Leave the final counts on screen.
    pub fn finish(self) {
        let _guard = self.drawing.lock();
        PROGRESS_ACTIVE.store(false, Ordering::Release);
        self.draw(true);
        self.finished.store(true, Ordering::Relaxed);
    }

    fn render(&self) -> String {
        self.counters
            .iter()
            .map(|c| format!("{}({}/{})", c.name, c.done.load(Ordering::Relaxed), c.total))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn draw(&self, newline: bool) {
        let line = format!("{} {}", prefix("build"), self.render());
        let mut out = stdout().lock();
        execute!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
        if newline {
            writeln!(out, "{line}").ok();
        } else {
            write!(out, "{line}").ok();
        }
        out.flush().ok();
    }
}

impl Drop for ProgressLine {
    fn drop(&mut self) {
        if self.finished.load(Ordering::Relaxed) {
            return;
        }
        // abandoned mid-run: wipe the partial counts
        PROGRESS_ACTIVE.store(false, Ordering::Release);
        let mut out = stdout().lock();
        execute!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
        out.flush().ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_wraps_at_midnight() {
        assert_eq!(clock(0), "00:00:00");
        assert_eq!(clock(3661), "01:01:01");
        assert_eq!(clock(86400 + 59), "00:00:59");
    }

    #[test]
    fn test_status_block_counts_detail_rows() {
        let block = render_status("12:00:00", Outcome::Failed, "rebuild failed\nstyles: x\nscripts: y");
        assert_eq!(block.lines().count(), 3);
        assert!(block.contains("12:00:00"));
        assert!(block.ends_with("scripts: y"));
    }

    #[test]
    fn test_progress_renders_known_counters() {
        let progress = ProgressLine::new(&[("tasks", 2), ("empty", 0)]);
        progress.inc("tasks");
        progress.inc("missing");
        assert_eq!(progress.render(), "tasks(1/2)");
        progress.finish();
    }

    #[test]
    fn test_prefix_colours_by_module() {
        assert_eq!(prefix_style("Watch"), prefix_style("watch"));
        assert_ne!(prefix_style("error"), prefix_style("styles"));
    }
}

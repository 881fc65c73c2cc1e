//! Change batching: pure timing and filtering, no task logic.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};
use glob::{MatchOptions, Pattern};

use crate::asset::glob_base;
use crate::debug;
use crate::utils::path::normalize_path;

/// Quiet period closing a batch.
pub const SETTLE_MS: u64 = 200;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Watched globs and the directories they live in.
#[derive(Debug)]
pub struct WatchFilter {
    patterns: Vec<Pattern>,
    roots: Vec<PathBuf>,
}

impl WatchFilter {
    pub fn new(globs: &[String]) -> Result<Self> {
        let patterns = globs
            .iter()
            .map(|g| Pattern::new(g).map_err(|e| anyhow!("invalid watch glob `{g}`: {e}")))
            .collect::<Result<Vec<_>>>()?;

        // Outermost directories only: nested roots are covered recursively.
        let mut bases: Vec<PathBuf> = globs.iter().map(|g| glob_base(g)).collect();
        bases.sort();
        let mut roots: Vec<PathBuf> = Vec::new();
        for base in bases {
            if !roots.iter().any(|root| base.starts_with(root)) {
                roots.push(base);
            }
        }

        Ok(Self { patterns, roots })
    }

    /// Directories to watch recursively.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn matches(&self, path: &Path) -> bool {
        self.patterns
            .iter()
            .any(|p| p.matches_path_with(path, MATCH_OPTIONS))
    }
}

/// Collects changed paths until the settle window passes without events.
pub struct ChangeBatch {
    filter: WatchFilter,
    settle: Duration,
    changes: BTreeSet<PathBuf>,
    last_event: Option<Instant>,
}

impl ChangeBatch {
    pub fn new(filter: WatchFilter) -> Self {
        Self {
            filter,
            settle: Duration::from_millis(SETTLE_MS),
            changes: BTreeSet::new(),
            last_event: None,
        }
    }

    #[cfg(test)]
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Record a notify event. Returns whether any path was kept.
    pub fn add_event(&mut self, event: &notify::Event) -> bool {
        use notify::EventKind;
        use notify::event::ModifyKind;

        match event.kind {
            EventKind::Create(_) | EventKind::Remove(_) => {}
            // mtime/atime/chmod noise
            EventKind::Modify(ModifyKind::Metadata(_)) => return false,
            EventKind::Modify(_) => {}
            _ => return false,
        }

        let mut kept = false;
        for path in &event.paths {
            if is_temp_file(path) {
                continue;
            }
            let path = normalize_path(path);
            if !self.filter.matches(&path) {
                continue;
            }
            debug!("watch"; "{:?}: {}", event.kind, path.display());
            self.changes.insert(path);
            kept = true;
        }

        if kept {
            self.last_event = Some(Instant::now());
        }
        kept
    }

    pub fn is_ready(&self) -> bool {
        self.last_event
            .is_some_and(|last| last.elapsed() >= self.settle && !self.changes.is_empty())
    }

    /// Take the batch once the settle window has passed.
    pub fn take_if_ready(&mut self) -> Option<Vec<PathBuf>> {
        if !self.is_ready() {
            return None;
        }
        self.last_event = None;
        Some(std::mem::take(&mut self.changes).into_iter().collect())
    }

    /// Time until the pending batch may close.
    pub fn sleep_duration(&self) -> Duration {
        match self.last_event {
            Some(last) => self
                .settle
                .saturating_sub(last.elapsed())
                .max(Duration::from_millis(1)),
            None => Duration::from_secs(86400),
        }
    }
}

/// Editor artifacts: backups, swap files, dotfiles.
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
        || name.starts_with("#")
}

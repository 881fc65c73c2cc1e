//! Test fixtures: a throwaway project tree and a recording reloader.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tempfile::TempDir;

use crate::config::PipelineConfig;
use crate::reload::Reloader;

/// Temporary project with default layout.
pub struct Site {
    pub dir: TempDir,
    pub config: PipelineConfig,
}

impl Site {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig::rooted_at(dir.path());
        Self { dir, config }
    }

    /// Write a file relative to the project root.
    pub fn write(&self, rel: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let path = self.config.root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    pub fn output(&self, rel: &str) -> PathBuf {
        self.config.paths.output.join(rel)
    }

    pub fn read_output(&self, rel: &str) -> String {
        fs::read_to_string(self.output(rel)).unwrap()
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }
}

/// Reloader recording every signal it receives.
#[derive(Default)]
pub struct RecordingReloader {
    pub reasons: Mutex<Vec<String>>,
}

impl RecordingReloader {
    pub fn count(&self) -> usize {
        self.reasons.lock().len()
    }
}

impl Reloader for RecordingReloader {
    fn reload(&self, reason: &str) {
        self.reasons.lock().push(reason.to_string());
    }
}

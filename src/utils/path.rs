//! Path helpers shared by config loading, tasks and the watcher.

use std::path::{Path, PathBuf};

/// Absolute form of `path`, with symlinks resolved when it exists. Paths
/// that do not exist yet (an output directory before the first build) are
/// joined onto the working directory instead.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Display `path` relative to `root` when possible (for log lines).
pub fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Check whether `path` is `dir` or lies somewhere below it.
///
/// Purely lexical: both sides are expected to be normalized already.
pub fn is_within(path: &Path, dir: &Path) -> bool {
    path.starts_with(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_absolute() {
        let path = Path::new("/absolute/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_normalize_path_relative() {
        let path = Path::new("relative/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_display_relative() {
        let root = Path::new("/site");
        assert_eq!(
            display_relative(Path::new("/site/src/sass/main.scss"), root),
            "src/sass/main.scss"
        );
        assert_eq!(display_relative(Path::new("/other/a.js"), root), "/other/a.js");
    }

    #[test]
    fn test_is_within() {
        assert!(is_within(Path::new("/site/dist/css"), Path::new("/site/dist")));
        assert!(is_within(Path::new("/site/dist"), Path::new("/site/dist")));
        assert!(!is_within(Path::new("/site/distant"), Path::new("/site/dist")));
        assert!(!is_within(Path::new("/site/src"), Path::new("/site/dist")));
    }
}

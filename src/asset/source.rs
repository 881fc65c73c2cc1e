//! Ordered source sets resolved from glob patterns.
//!
//! Every matched file remembers the glob base it came from, so outputs keep
//! their sub-path: `src/images/**/*` matching `src/images/icons/a.svg`
//! writes `<dest>/icons/a.svg`.

use std::path::{Component, Path, PathBuf};

use glob::MatchOptions;
use rustc_hash::FxHashSet;

use crate::{debug, log};

/// Dotfiles are skipped unless the pattern names them literally.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// A matched file and the glob base it was resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub base: PathBuf,
}

impl SourceFile {
    /// Path below the glob base (falls back to the file name).
    pub fn relative(&self) -> &Path {
        self.path
            .strip_prefix(&self.base)
            .ok()
            .filter(|rel| !rel.as_os_str().is_empty())
            .or_else(|| self.path.file_name().map(Path::new))
            .unwrap_or(&self.path)
    }

    /// Output path under `destination`, keeping the sub-path.
    pub fn output_path(&self, destination: &Path) -> PathBuf {
        destination.join(self.relative())
    }
}

/// Files matched by an ordered list of patterns.
#[derive(Debug, Default)]
pub struct SourceSet {
    files: Vec<SourceFile>,
}

impl SourceSet {
    /// Expand `patterns` in order.
    ///
    /// Only regular files are kept. A file matched by several patterns keeps
    /// the position (and base) of its first match. Unreadable entries are
    /// logged and skipped; a pattern matching nothing is not an error.
    pub fn resolve<S: AsRef<str>>(patterns: &[S]) -> anyhow::Result<Self> {
        let mut seen = FxHashSet::default();
        let mut files = Vec::new();

        for pattern in patterns {
            let pattern = pattern.as_ref();
            let base = glob_base(pattern);
            let entries = glob::glob_with(pattern, MATCH_OPTIONS)
                .map_err(|e| anyhow::anyhow!("invalid glob `{pattern}`: {e}"))?;

            let mut matched = 0usize;
            for entry in entries {
                match entry {
                    Ok(path) if path.is_file() => {
                        matched += 1;
                        if seen.insert(path.clone()) {
                            files.push(SourceFile {
                                path,
                                base: base.clone(),
                            });
                        }
                    }
                    Ok(_) => {}
                    Err(e) => log!("warning"; "skipping {}: {}", e.path().display(), e.error()),
                }
            }

            if matched == 0 {
                debug!("glob"; "no files match {}", pattern);
            }
        }

        Ok(Self { files })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SourceFile> {
        self.files.iter()
    }
}

impl<'a> IntoIterator for &'a SourceSet {
    type Item = &'a SourceFile;
    type IntoIter = std::slice::Iter<'a, SourceFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

/// Leading non-wildcard directories of a glob.
///
/// A pattern without wildcards names a single file; its base is the parent.
pub fn glob_base(pattern: &str) -> PathBuf {
    let mut base = PathBuf::new();

    for component in Path::new(pattern).components() {
        if let Component::Normal(part) = component
            && part.to_string_lossy().contains(['*', '?', '['])
        {
            return base;
        }
        base.push(component);
    }

    base.pop();
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, rel: &str) -> PathBuf {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, rel).unwrap();
        path
    }

    fn pattern(dir: &Path, rel: &str) -> String {
        dir.join(rel).to_string_lossy().into_owned()
    }

    #[test]
    fn test_glob_base() {
        assert_eq!(glob_base("src/sass/**/*.scss"), PathBuf::from("src/sass"));
        assert_eq!(glob_base("src/*.html"), PathBuf::from("src"));
        assert_eq!(glob_base("/abs/images/**/*"), PathBuf::from("/abs/images"));
        assert_eq!(glob_base("src/fonts/[ab]*.woff"), PathBuf::from("src/fonts"));
    }

    #[test]
    fn test_glob_base_literal_file() {
        assert_eq!(
            glob_base("node_modules/bootstrap/scss/bootstrap.scss"),
            PathBuf::from("node_modules/bootstrap/scss")
        );
    }

    #[test]
    fn test_resolve_keeps_files_only() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "images/a.png");
        touch(dir.path(), "images/icons/b.svg");
        fs::create_dir_all(dir.path().join("images/empty")).unwrap();

        let set = SourceSet::resolve(&[pattern(dir.path(), "images/**/*")]).unwrap();
        let rels: Vec<_> = set.iter().map(|f| f.relative().to_path_buf()).collect();

        assert_eq!(
            rels,
            vec![PathBuf::from("a.png"), PathBuf::from("icons/b.svg")]
        );
    }

    #[test]
    fn test_resolve_dedups_first_wins() {
        let dir = TempDir::new().unwrap();
        let main = touch(dir.path(), "sass/main.scss");
        touch(dir.path(), "sass/extra.scss");

        let literal = main.to_string_lossy().into_owned();
        let set = SourceSet::resolve(&[literal, pattern(dir.path(), "sass/*.scss")]).unwrap();

        let paths: Vec<_> = set.iter().map(|f| f.path.clone()).collect();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0], main);
        assert_eq!(paths[1], dir.path().join("sass/extra.scss"));
    }

    #[test]
    fn test_resolve_empty_is_ok() {
        let dir = TempDir::new().unwrap();
        let set = SourceSet::resolve(&[pattern(dir.path(), "fonts/**/*")]).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_resolve_skips_dotfiles() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "images/.DS_Store");
        touch(dir.path(), "images/logo.png");

        let set = SourceSet::resolve(&[pattern(dir.path(), "images/**/*")]).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_output_path_keeps_subpath() {
        let file = SourceFile {
            path: PathBuf::from("/p/src/images/icons/a.svg"),
            base: PathBuf::from("/p/src/images"),
        };
        assert_eq!(
            file.output_path(Path::new("/p/dist/images")),
            PathBuf::from("/p/dist/images/icons/a.svg")
        );
    }
}

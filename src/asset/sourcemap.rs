//! Source map placement and `sourceMappingURL` annotations.
//!
//! Maps live in a dedicated directory (`<destination>/sourcemaps` by
//! default) mirroring the output sub-path: `css/pages/home.css` gets
//! `css/sourcemaps/pages/home.css.map`.

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};

/// Comment syntax for the annotation line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Annotation {
    Css,
    Js,
}

impl Annotation {
    fn render(self, url: &str) -> String {
        match self {
            Self::Css => format!("/*# sourceMappingURL={url} */"),
            Self::Js => format!("//# sourceMappingURL={url}"),
        }
    }
}

/// Where a map for `relative` goes inside `map_dir`.
pub fn map_path(map_dir: &Path, relative: &Path) -> PathBuf {
    let mut name = relative.as_os_str().to_os_string();
    name.push(".map");
    map_dir.join(name)
}

/// Write `code` to `output`, and `map` (if any) into `map_dir`.
///
/// `relative` is the output path below the task destination. When a map is
/// written, `code` gets an annotation pointing at it.
pub fn write_with_map(
    output: &Path,
    code: &str,
    map: Option<(&str, &Path)>,
    relative: &Path,
    annotation: Annotation,
) -> Result<()> {
    let code = match map {
        Some((json, map_dir)) => {
            let target = map_path(map_dir, relative);
            write_file(&target, json.as_bytes())?;

            let from = output.parent().unwrap_or(Path::new(""));
            let url = relative_url(from, &target);
            format!("{}\n{}\n", code.trim_end(), annotation.render(&url))
        }
        None => code.to_string(),
    };

    write_file(output, code.as_bytes())
}

/// Create parent directories and write `bytes`.
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
}

/// Forward-slash URL leading from directory `from` to file `to`.
fn relative_url(from: &Path, to: &Path) -> String {
    let from: Vec<_> = from.components().collect();
    let to: Vec<_> = to.components().collect();
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let ups = from[common..]
        .iter()
        .filter(|c| matches!(c, Component::Normal(_)))
        .map(|_| "..".to_string());
    let downs = to[common..]
        .iter()
        .map(|c| c.as_os_str().to_string_lossy().into_owned());

    ups.chain(downs).collect::<Vec<_>>().join("/")
}

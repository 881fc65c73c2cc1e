//! URL to filesystem path resolution.

use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

/// Resolve URL to filesystem path, handling index.html for directories
pub fn resolve_path(url: &str, serve_root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url);

    // Reject paths with suspicious patterns early
    if clean.split('/').any(|segment| segment == "..") {
        return None;
    }

    let local = serve_root.join(&clean);

    // Canonicalize to verify the target stays under serve_root (symlinks)
    let canonical = local.canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;
    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }

    if canonical.is_dir() {
        let index = canonical.join("index.html");
        if index.is_file() {
            return Some(index);
        }
    }

    None
}

/// Normalize URL: decode, strip query string and fragment, trim slashes
fn normalize_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();

    decoded.trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "home").unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("docs/index.html"), "docs").unwrap();
        fs::create_dir_all(dir.path().join("css")).unwrap();
        fs::write(dir.path().join("css/main style.css"), ".a{}").unwrap();
        dir
    }

    #[test]
    fn test_root_maps_to_index() {
        let dir = site();
        let path = resolve_path("/", dir.path()).unwrap();
        assert!(path.ends_with("index.html"));
    }

    #[test]
    fn test_directory_maps_to_index() {
        let dir = site();
        let path = resolve_path("/docs/?tab=1", dir.path()).unwrap();
        assert!(path.ends_with("docs/index.html"));
    }

    #[test]
    fn test_percent_decoded() {
        let dir = site();
        assert!(resolve_path("/css/main%20style.css", dir.path()).is_some());
    }

    #[test]
    fn test_missing_and_traversal() {
        let dir = site();
        assert!(resolve_path("/nope.html", dir.path()).is_none());
        assert!(resolve_path("/css", dir.path()).is_none());
        assert!(resolve_path("/../etc/passwd", dir.path()).is_none());
        assert!(resolve_path("/%2e%2e/etc/passwd", dir.path()).is_none());
    }
}

//! Content types for files the dev server hands out.

use std::path::Path;

pub mod types {
    pub const HTML: &str = "text/html; charset=utf-8";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
    pub const CSS: &str = "text/css; charset=utf-8";
    pub const JAVASCRIPT: &str = "text/javascript; charset=utf-8";
    pub const JSON: &str = "application/json";
    pub const OCTET_STREAM: &str = "application/octet-stream";
}

/// Extension (lowercase) to content type. Source maps are served as JSON.
const BY_EXTENSION: &[(&[&str], &str)] = &[
    (&["html", "htm"], types::HTML),
    (&["css"], types::CSS),
    (&["js", "mjs", "cjs"], types::JAVASCRIPT),
    (&["json", "map"], types::JSON),
    (&["txt"], types::PLAIN),
    (&["xml"], "application/xml"),
    (&["svg"], "image/svg+xml"),
    (&["png"], "image/png"),
    (&["jpg", "jpeg"], "image/jpeg"),
    (&["gif"], "image/gif"),
    (&["webp"], "image/webp"),
    (&["avif"], "image/avif"),
    (&["ico"], "image/x-icon"),
    (&["woff"], "font/woff"),
    (&["woff2"], "font/woff2"),
    (&["ttf"], "font/ttf"),
    (&["otf"], "font/otf"),
    (&["eot"], "application/vnd.ms-fontobject"),
    (&["pdf"], "application/pdf"),
];

pub fn from_path(path: &Path) -> &'static str {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return types::OCTET_STREAM;
    };
    let ext = ext.to_ascii_lowercase();
    BY_EXTENSION
        .iter()
        .find(|(exts, _)| exts.contains(&ext.as_str()))
        .map_or(types::OCTET_STREAM, |&(_, mime)| mime)
}

pub fn is_html(mime: &str) -> bool {
    mime.starts_with("text/html")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_outputs() {
        assert_eq!(from_path(Path::new("index.html")), types::HTML);
        assert_eq!(from_path(Path::new("css/main.css")), types::CSS);
        assert_eq!(from_path(Path::new("js/app.js")), types::JAVASCRIPT);
        assert_eq!(from_path(Path::new("sourcemaps/js/app.js.map")), types::JSON);
    }

    #[test]
    fn test_copied_assets() {
        assert_eq!(from_path(Path::new("images/logo.PNG")), "image/png");
        assert_eq!(from_path(Path::new("fonts/fa-solid.woff2")), "font/woff2");
        assert_eq!(from_path(Path::new("unknown.xyz")), types::OCTET_STREAM);
        assert_eq!(from_path(Path::new("README")), types::OCTET_STREAM);
    }

    #[test]
    fn test_is_html() {
        assert!(is_html(types::HTML));
        assert!(!is_html(types::CSS));
    }
}

//! Stylesheet transformations: SCSS compile, autoprefix, minify.
//!
//! `grass` compiles SCSS to plain CSS; `lightningcss` then lowers and
//! prefixes declarations for the configured browser targets, optionally
//! minifying and emitting a source map of the result.

use std::path::{Path, PathBuf};

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use parcel_sourcemap::SourceMap;

use super::AssetError;

/// Processed stylesheet plus optional source map JSON.
#[derive(Debug)]
pub struct CssOutput {
    pub code: String,
    pub map: Option<String>,
}

/// Resolve browserslist queries into lightningcss targets.
///
/// An empty list means no lowering or prefixing.
pub fn resolve_targets(queries: &[String]) -> Result<Targets, String> {
    if queries.is_empty() {
        return Ok(Targets::default());
    }
    let browsers = Browsers::from_browserslist(queries).map_err(|e| e.to_string())?;
    Ok(Targets {
        browsers,
        ..Targets::default()
    })
}

/// Partials (`_name.scss`) are only compiled through `@import`/`@use`.
pub fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('_'))
}

/// Output file name for a stylesheet source (`main.scss` -> `main.css`).
pub fn output_name(relative: &Path) -> PathBuf {
    relative.with_extension("css")
}

/// Compile a SCSS (or plain CSS) file into expanded CSS.
pub fn compile_scss(path: &Path, load_paths: &[PathBuf], quiet: bool) -> Result<String, AssetError> {
    let mut search = Vec::with_capacity(load_paths.len() + 1);
    if let Some(parent) = path.parent() {
        search.push(parent.to_path_buf());
    }
    search.extend(load_paths.iter().cloned());

    let options = grass::Options::default()
        .style(grass::OutputStyle::Expanded)
        .load_paths(&search)
        .quiet(quiet);

    grass::from_path(path, &options).map_err(|e| AssetError::Compile(e.to_string()))
}

/// Prefix (and optionally minify) compiled CSS for `targets`.
///
/// `filename` names the input inside the emitted source map.
pub fn process_css(
    css: &str,
    filename: &str,
    targets: Targets,
    minify: bool,
    with_map: bool,
) -> Result<CssOutput, AssetError> {
    let mut stylesheet = StyleSheet::parse(
        css,
        ParserOptions {
            filename: filename.to_string(),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| AssetError::Css(e.to_string()))?;

    stylesheet
        .minify(MinifyOptions {
            targets: targets.clone(),
            ..MinifyOptions::default()
        })
        .map_err(|e| AssetError::Css(e.to_string()))?;

    let mut source_map = if with_map {
        let mut map = SourceMap::new("/");
        map.add_source(filename);
        map.set_source_content(0, css)
            .map_err(|e| AssetError::SourceMap(e.to_string()))?;
        Some(map)
    } else {
        None
    };

    let result = stylesheet
        .to_css(PrinterOptions {
            minify,
            targets,
            source_map: source_map.as_mut(),
            ..PrinterOptions::default()
        })
        .map_err(|e| AssetError::Css(e.to_string()))?;

    let map = match source_map {
        Some(mut map) => Some(
            map.to_json(None)
                .map_err(|e| AssetError::SourceMap(e.to_string()))?,
        ),
        None => None,
    };

    Ok(CssOutput {
        code: result.code,
        map,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn legacy_targets() -> Targets {
        resolve_targets(&["safari >= 7".to_string(), "ie >= 10".to_string()]).unwrap()
    }

    #[test]
    fn test_is_partial() {
        assert!(is_partial(Path::new("sass/_variables.scss")));
        assert!(!is_partial(Path::new("sass/main.scss")));
        assert!(!is_partial(Path::new("sass/_dir/main.scss")));
    }

    #[test]
    fn test_output_name() {
        assert_eq!(output_name(Path::new("pages/home.scss")), PathBuf::from("pages/home.css"));
    }

    #[test]
    fn test_resolve_targets_empty() {
        assert!(resolve_targets(&[]).unwrap().browsers.is_none());
    }

    #[test]
    fn test_resolve_targets_invalid_query() {
        assert!(resolve_targets(&["definitely not a browser".to_string()]).is_err());
    }

    #[test]
    fn test_compile_scss_with_partial() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("_vars.scss"), "$brand: #ff0000;").unwrap();
        fs::write(
            dir.path().join("main.scss"),
            "@import 'vars';\n.a { .b { color: $brand; } }",
        )
        .unwrap();

        let css = compile_scss(&dir.path().join("main.scss"), &[], true).unwrap();
        assert!(css.contains(".a .b"));
        assert!(css.contains("color"));
    }

    #[test]
    fn test_compile_scss_syntax_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.scss"), ".a { color: red;").unwrap();

        let err = compile_scss(&dir.path().join("bad.scss"), &[], true).unwrap_err();
        assert!(matches!(err, AssetError::Compile(_)));
    }

    #[test]
    fn test_process_css_adds_prefixes() {
        let out = process_css(
            ".box { user-select: none; }",
            "main.css",
            legacy_targets(),
            false,
            false,
        )
        .unwrap();

        assert!(out.code.contains("-webkit-user-select"));
        assert!(out.map.is_none());
    }

    #[test]
    fn test_process_css_minify_with_map() {
        let css = ".a {\n  color: red;\n}\n\n.b {\n  margin: 0px;\n}\n";
        let out = process_css(css, "main.css", Targets::default(), true, true).unwrap();

        assert!(out.code.len() < css.len());
        let map: serde_json::Value = serde_json::from_str(out.map.as_deref().unwrap()).unwrap();
        assert_eq!(map["version"], 3);
        assert!(map["sources"].as_array().is_some_and(|s| !s.is_empty()));
    }
}

//! Script transformations: transpile for the configured browsers and minify
//! via oxc.

use std::path::{Path, PathBuf};

use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::diagnostics::OxcDiagnostic;
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::semantic::SemanticBuilder;
use oxc::span::SourceType;
use oxc::transformer::{
    ESFeature, Engine, EngineTargets, EnvOptions, HelperLoaderMode, HelperLoaderOptions,
    TransformOptions, Transformer,
};

use super::AssetError;
use super::lower::Es2015Lowering;
use crate::config::CompatConfig;

/// Minified script plus optional source map JSON.
#[derive(Debug)]
pub struct JsOutput {
    pub code: String,
    pub map: Option<String>,
}

/// Script settings derived from `compat.browsers`.
#[derive(Debug, Clone)]
pub struct ScriptTargets {
    engines: EngineTargets,
    transform: TransformOptions,
    lowering: Es2015Lowering,
}

impl ScriptTargets {
    /// Resolve the browser list. An empty list targets current engines and
    /// lowers nothing.
    pub fn from_compat(compat: &CompatConfig) -> Result<Self, String> {
        let engines = if compat.browsers.is_empty() {
            EngineTargets::default()
        } else {
            let mut engines = EngineTargets::try_from_query(&compat.browsers.join(", "))?;
            fold_in_pre_es2015_engines(&mut engines)?;
            engines
        };

        let transform = TransformOptions {
            env: EnvOptions::from(engines.clone()),
            // plain browser scripts cannot import a helper runtime
            helper_loader: HelperLoaderOptions {
                mode: HelperLoaderMode::External,
                ..HelperLoaderOptions::default()
            },
            ..TransformOptions::default()
        };

        Ok(Self {
            lowering: Es2015Lowering::for_targets(&engines),
            engines,
            transform,
        })
    }

    /// The compact printer picks the shortest quote for each string,
    /// backticks included.
    fn allows_compact_print(&self) -> bool {
        !self.engines.has_feature(ESFeature::ES2015TemplateLiterals)
    }
}

/// The feature tables only list engines that eventually shipped a feature,
/// so IE and the pre-Chromium Android browser would count as supporting
/// everything. They lack all of ES2015; fold them in as the oldest Chrome.
fn fold_in_pre_es2015_engines(engines: &mut EngineTargets) -> Result<(), String> {
    let legacy = engines.contains_key(&Engine::Ie)
        || engines.get(&Engine::Android).is_some_and(|v| v.0 < 5);
    if !legacy {
        return Ok(());
    }

    let oldest = EngineTargets::try_from_query("chrome 4")?;
    for (engine, version) in oldest.iter() {
        engines
            .entry(*engine)
            .and_modify(|current| {
                if *version < *current {
                    *current = *version;
                }
            })
            .or_insert(*version);
    }
    Ok(())
}

/// Rewrite syntax the target browsers lack (arrow functions, template
/// literals, block scoping, exponent operator, ...).
pub fn transpile(source: &str, path: &Path, targets: &ScriptTargets) -> Result<String, AssetError> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::cjs()).parse();
    if !ret.errors.is_empty() {
        return Err(AssetError::Parse(join_diagnostics(&ret.errors)));
    }
    let mut program = ret.program;

    let scoping = SemanticBuilder::new()
        .build(&program)
        .semantic
        .into_scoping();
    let ret = Transformer::new(&allocator, path, &targets.transform)
        .build_with_scoping(scoping, &mut program);
    if !ret.errors.is_empty() {
        return Err(AssetError::Transform(join_diagnostics(&ret.errors)));
    }
    targets
        .lowering
        .apply(&allocator, &mut program, &ret.scoping)?;

    Ok(Codegen::new().build(&program).code)
}

/// Compress, mangle and print a script without introducing syntax the
/// target browsers lack.
///
/// With `with_map`, the map's single source is the file name of `path`.
pub fn minify_js(
    source: &str,
    path: &Path,
    targets: &ScriptTargets,
    with_map: bool,
) -> Result<JsOutput, AssetError> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::cjs()).parse();
    if !ret.errors.is_empty() {
        return Err(AssetError::Parse(join_diagnostics(&ret.errors)));
    }
    let mut program = ret.program;

    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions {
            target: targets.engines.clone(),
            ..CompressOptions::smallest()
        }),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);

    let source_map_path = with_map.then(|| {
        path.file_name()
            .map_or_else(|| path.to_path_buf(), PathBuf::from)
    });
    let codegen_options = if targets.allows_compact_print() {
        CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            source_map_path,
            ..CodegenOptions::default()
        }
    } else {
        // one statement per line, no indentation, always double quotes
        CodegenOptions {
            minify: false,
            comments: CommentOptions::disabled(),
            indent_width: 0,
            source_map_path,
            ..CodegenOptions::default()
        }
    };
    let ret = Codegen::new()
        .with_options(codegen_options)
        .with_scoping(ret.scoping)
        .build(&program);

    Ok(JsOutput {
        code: ret.code,
        map: ret.map.map(|map| map.to_json_string()),
    })
}

fn join_diagnostics(errors: &[OxcDiagnostic]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy() -> ScriptTargets {
        ScriptTargets::from_compat(&CompatConfig::default()).unwrap()
    }

    fn modern() -> ScriptTargets {
        let compat = CompatConfig {
            browsers: vec!["chrome >= 100".to_string()],
            ..CompatConfig::default()
        };
        ScriptTargets::from_compat(&compat).unwrap()
    }

    #[test]
    fn test_default_browsers_resolve() {
        let targets = legacy();
        assert!(!targets.lowering.is_noop());
        assert!(!targets.allows_compact_print());
    }

    #[test]
    fn test_ie_only_list_still_lowers() {
        let compat = CompatConfig {
            browsers: vec!["ie >= 11".to_string()],
            ..CompatConfig::default()
        };
        let targets = ScriptTargets::from_compat(&compat).unwrap();

        let out = transpile("var f = (a) => `${a}`;\n", Path::new("main.js"), &targets).unwrap();
        assert!(!out.contains("=>"));
        assert!(!out.contains('`'));
    }

    #[test]
    fn test_unknown_browser_query_rejected() {
        let compat = CompatConfig {
            browsers: vec!["netscape >= 4".to_string()],
            ..CompatConfig::default()
        };
        assert!(ScriptTargets::from_compat(&compat).is_err());
    }

    #[test]
    fn test_empty_browser_list_lowers_nothing() {
        let compat = CompatConfig {
            browsers: vec![],
            ..CompatConfig::default()
        };
        let targets = ScriptTargets::from_compat(&compat).unwrap();

        assert!(targets.lowering.is_noop());
        let out = transpile("const f = (a) => a;\n", Path::new("main.js"), &targets).unwrap();
        assert!(out.contains("=>"));
    }

    #[test]
    fn test_transpile_arrow_function() {
        let src = "var add = (a, b) => a + b;\nconsole.log(add(1, 2));\n";
        let out = transpile(src, Path::new("main.js"), &legacy()).unwrap();

        assert!(!out.contains("=>"));
        assert!(out.contains("function"));
    }

    #[test]
    fn test_transpile_template_literal() {
        let src = "var who = 'world';\nvar msg = `hello ${who}!`;\n";
        let out = transpile(src, Path::new("main.js"), &legacy()).unwrap();

        assert!(!out.contains('`'));
        assert!(out.contains("\"hello \" + who + \"!\""));
    }

    #[test]
    fn test_transpile_block_scoping() {
        let src = "const limit = 3;\nfor (let i = 0; i < limit; i++) { console.log(i); }\n";
        let out = transpile(src, Path::new("main.js"), &legacy()).unwrap();

        assert!(!out.contains("const "));
        assert!(!out.contains("let "));
        assert!(out.contains("var limit = 3"));
    }

    #[test]
    fn test_transpile_renames_shadowed_binding() {
        let src = "let x = 1;\nif (x) { let x = 2; console.log(x); }\nconsole.log(x);\n";
        let out = transpile(src, Path::new("main.js"), &legacy()).unwrap();

        assert!(out.contains("var x = 1"));
        assert!(out.contains("var _x = 2"));
        assert!(out.contains("console.log(_x)"));
    }

    #[test]
    fn test_transpile_rejects_loop_closure_capture() {
        let src = "for (let i = 0; i < 3; i++) { setTimeout(function () { console.log(i); }); }\n";
        let err = transpile(src, Path::new("main.js"), &legacy()).unwrap_err();

        assert!(matches!(err, AssetError::Transform(ref msg) if msg.contains("`i`")));
    }

    #[test]
    fn test_transpile_keeps_modern_syntax_for_modern_targets() {
        let src = "const f = (a) => `${a}`;\n";
        let out = transpile(src, Path::new("main.js"), &modern()).unwrap();

        assert!(out.contains("=>"));
        assert!(out.contains('`'));
    }

    #[test]
    fn test_transpile_parse_error() {
        let err = transpile("var = ;", Path::new("bad.js"), &legacy()).unwrap_err();
        assert!(matches!(err, AssetError::Parse(_)));
    }

    #[test]
    fn test_minify_js_shrinks() {
        let src = "function greet(name) {\n    var message = 'hello ' + name;\n    return message;\n}\nwindow.greet = greet;\n";
        let out = minify_js(src, Path::new("/dist/js/main.js"), &legacy(), false).unwrap();

        assert!(out.code.len() < src.len());
        assert!(out.map.is_none());
    }

    #[test]
    fn test_minify_js_keeps_es5_output() {
        let src = "document.body.addEventListener('click', function (e) {\n    console.log('clicked ' + e.type);\n});\n";
        let out = minify_js(src, Path::new("main.js"), &legacy(), false).unwrap();

        assert!(!out.code.contains('`'));
        assert!(!out.code.contains("=>"));
        assert!(out.code.contains("\"click\""));
    }

    #[test]
    fn test_minify_js_compact_for_modern_targets() {
        let src = "function greet(name) {\n    return 'hi ' + name;\n}\nwindow.greet = greet;\n";
        let out = minify_js(src, Path::new("main.js"), &modern(), false).unwrap();

        assert_eq!(out.code.trim_end().lines().count(), 1);
    }

    #[test]
    fn test_minify_js_map_names_file() {
        let src = "window.answer = function () { return 40 + 2; };\n";
        let out = minify_js(src, Path::new("/dist/js/main.js"), &legacy(), true).unwrap();

        let map: serde_json::Value = serde_json::from_str(out.map.as_deref().unwrap()).unwrap();
        assert_eq!(map["version"], 3);
        assert_eq!(map["sources"][0], "main.js");
    }
}

// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Stylesheet task.
//!
//! ```text
//! main.scss → glob imports → grass → lightningcss (prefix + minify) → main.min.css
//!                                                                  → main.min.css.map
//! ```
//!
//! The source map relates the minified output to the compiled stylesheet,
//! whose text is embedded in the map.

use super::{read_text, Emitted, TaskContext};
use crate::error::{PipelineError, Result};
use lightningcss::printer::PrinterOptions;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use parcel_sourcemap::SourceMap;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

fn glob_import() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?m)^([ \t]*)@import\s+["']([^"']*\*[^"']*)["']\s*;"#).expect("valid regex")
    })
}

/// Rewrites `@import "dir/*";` into one import per matching stylesheet.
///
/// Patterns resolve against `base`. Matches are sorted and the importing
/// file itself is never included.
pub fn expand_glob_imports(source: &str, base: &Path, self_path: Option<&Path>) -> Result<String> {
    let mut error = None;
    let expanded = glob_import().replace_all(source, |caps: &regex::Captures<'_>| {
        let indent = &caps[1];
        let pattern = &caps[2];
        match glob_matches(base, pattern, self_path) {
            Ok(files) => files
                .iter()
                .map(|f| format!("{}@import \"{}\";", indent, f))
                .collect::<Vec<_>>()
                .join("\n"),
            Err(e) => {
                error.get_or_insert(e);
                String::new()
            }
        }
    });
    match error {
        Some(e) => Err(e),
        None => Ok(expanded.into_owned()),
    }
}

fn glob_matches(base: &Path, pattern: &str, self_path: Option<&Path>) -> Result<Vec<String>> {
    let full = format!("{}/{}", glob::Pattern::escape(&base.to_string_lossy()), pattern);
    let entries = glob::glob(&full).map_err(|e| PipelineError::Glob {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    let mut files: Vec<String> = entries
        .flatten()
        .filter(|p| p.is_file())
        .filter(|p| self_path != Some(p.as_path()))
        .filter(|p| {
            matches!(
                p.extension().and_then(|e| e.to_str()),
                Some("scss" | "sass" | "css")
            )
        })
        .filter_map(|p| crate::mapping::relative_key(base, &p))
        .collect();
    files.sort();
    Ok(files)
}

fn css_error(file: &Path, message: impl ToString) -> PipelineError {
    PipelineError::Css {
        file: file.to_path_buf(),
        message: message.to_string(),
    }
}

/// Compiles one entry stylesheet, returning the CSS and its source map JSON.
pub(crate) fn compile(
    entry: &Path,
    scss_root: &Path,
    browsers: &[String],
    output_name: &str,
) -> Result<(String, String)> {
    let base = entry.parent().unwrap_or(scss_root);
    let source = read_text(entry)?;
    let source = expand_glob_imports(&source, base, Some(entry))?;

    let options = grass::Options::default().load_path(base).load_path(scss_root);
    let compiled = grass::from_string(source, &options).map_err(|e| PipelineError::Sass {
        file: entry.to_path_buf(),
        message: e.to_string(),
    })?;

    let stem = entry
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let virtual_name = format!("{}.css", stem);

    let browsers = Browsers::from_browserslist(browsers).map_err(|e| css_error(entry, e))?;
    let targets = Targets {
        browsers,
        ..Targets::default()
    };

    let mut stylesheet = StyleSheet::parse(
        &compiled,
        ParserOptions {
            filename: virtual_name.clone(),
            ..Default::default()
        },
    )
    .map_err(|e| css_error(entry, e))?;

    stylesheet
        .minify(MinifyOptions {
            targets: targets.clone(),
            ..Default::default()
        })
        .map_err(|e| css_error(entry, e))?;

    let mut source_map = SourceMap::new("/");
    source_map.add_source(&virtual_name);
    source_map
        .set_source_content(0, &compiled)
        .map_err(|e| css_error(entry, format!("{:?}", e)))?;

    let printed = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            source_map: Some(&mut source_map),
            targets,
            ..Default::default()
        })
        .map_err(|e| css_error(entry, e))?;

    let map = source_map
        .to_json(None)
        .map_err(|e| css_error(entry, format!("{:?}", e)))?;

    let css = format!("{}\n/*# sourceMappingURL={}.map */\n", printed.code, output_name);
    Ok((css, map))
}

pub(crate) fn build(ctx: &TaskContext<'_>, sources: &[PathBuf]) -> Result<Vec<Emitted>> {
    let scss_root = ctx.project.dev().join("src/scss");
    let mut emitted = Vec::with_capacity(sources.len() * 2);
    for source in sources {
        let dest = ctx.dest_for(source, Some("min.css"));
        let output_name = dest
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (css, map) = compile(source, &scss_root, &ctx.options.browsers, &output_name)?;
        let map_path = dest.with_file_name(format!("{}.map", output_name));
        emitted.push(Emitted::new(dest, css));
        emitted.push(Emitted::new(map_path, map));
    }
    Ok(emitted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_expand_glob_imports() {
        let dir = tempdir().unwrap();
        let base = dir.path();
        fs::create_dir_all(base.join("components")).unwrap();
        fs::write(base.join("components/_card.scss"), "").unwrap();
        fs::write(base.join("components/_button.scss"), "").unwrap();
        fs::write(base.join("components/notes.txt"), "").unwrap();

        let source = "@import \"vars\";\n  @import \"components/*\";\n.a { b: c }\n";
        let expanded = expand_glob_imports(source, base, None).unwrap();
        assert_eq!(
            expanded,
            "@import \"vars\";\n  @import \"components/_button.scss\";\n  @import \"components/_card.scss\";\n.a { b: c }\n"
        );
    }

    #[test]
    fn test_expand_glob_imports_with_no_matches() {
        let dir = tempdir().unwrap();
        let expanded = expand_glob_imports("@import 'parts/*';\n", dir.path(), None).unwrap();
        assert_eq!(expanded, "\n");
    }

    #[test]
    fn test_compile_resolves_partials_and_prefixes() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("_vars.scss"), "$brand: #ff0000;\n").unwrap();
        fs::write(
            root.join("main.scss"),
            "@import \"vars\";\n.box { color: $brand; user-select: none; display: flex; }\n",
        )
        .unwrap();

        let browsers: Vec<String> = super::super::DEFAULT_BROWSERS
            .iter()
            .map(|s| s.to_string())
            .collect();
        let (css, map) = compile(&root.join("main.scss"), root, &browsers, "main.min.css").unwrap();

        assert!(css.contains(".box{"), "not minified: {}", css);
        assert!(css.contains("color:red"), "color not resolved: {}", css);
        assert!(css.contains("-webkit-") || css.contains("-ms-"), "no prefixes: {}", css);
        assert!(css.trim_end().ends_with("/*# sourceMappingURL=main.min.css.map */"));

        let map: serde_json::Value = serde_json::from_str(&map).unwrap();
        assert_eq!(map["version"], 3);
        assert!(map["mappings"].as_str().is_some());
    }

    #[test]
    fn test_invalid_sass_is_reported() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("main.scss"), ".a { color: $undefined; }\n").unwrap();

        let err = compile(&root.join("main.scss"), root, &[], "main.min.css").unwrap_err();
        assert!(matches!(err, PipelineError::Sass { .. }), "{err}");
    }
}

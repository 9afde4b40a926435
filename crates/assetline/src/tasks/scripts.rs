// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Script task.
//!
//! ```text
//! app.js → include directives → oxc_transformer (target) → oxc_minifier → app.min.js
//! ```
//!
//! Identifiers are never mangled and the printer keeps comments. Helpers
//! the lowered code calls are defined in a prelude (see `runtime`); a helper
//! with no definition fails the file. A missing include fails the whole run
//! before anything is written.

use super::include::IncludeResolver;
use super::runtime;
use super::{Emitted, TaskContext};
use crate::error::{PipelineError, Result};
use oxc_allocator::Allocator;
use oxc_ast::ast::Program;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc_parser::Parser;
use oxc_semantic::SemanticBuilder;
use oxc_span::SourceType;
use oxc_transformer::{HelperLoaderMode, TransformOptions, Transformer};
use std::path::{Path, PathBuf};

fn script_error(file: &Path, messages: impl IntoIterator<Item = String>) -> PipelineError {
    PipelineError::Script {
        file: file.to_path_buf(),
        message: messages.into_iter().collect::<Vec<_>>().join("; "),
    }
}

fn lower<'a>(
    allocator: &'a Allocator,
    path: &Path,
    options: &TransformOptions,
    program: &mut Program<'a>,
) -> Result<()> {
    let scoping = SemanticBuilder::new().build(program).semantic.into_scoping();
    let transformed = Transformer::new(allocator, path, options).build_with_scoping(scoping, program);
    if transformed.errors.is_empty() {
        Ok(())
    } else {
        Err(script_error(
            path,
            transformed.errors.iter().map(|e| e.to_string()),
        ))
    }
}

/// Transpiles `source` to `target` and minifies it.
pub(crate) fn transpile_and_minify(path: &Path, source: &str, target: &str) -> Result<String> {
    let mut transform_options =
        TransformOptions::from_target(target).map_err(|e| script_error(path, [e]))?;
    transform_options.helper_loader.mode = HelperLoaderMode::External;

    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source, SourceType::cjs()).parse();
    if !parsed.errors.is_empty() || parsed.panicked {
        return Err(script_error(
            path,
            parsed.errors.iter().map(|e| e.to_string()),
        ));
    }
    let mut program = parsed.program;

    lower(&allocator, path, &transform_options, &mut program)?;

    Minifier::new(MinifierOptions {
        mangle: None,
        compress: Some(CompressOptions::default()),
    })
    .minify(&allocator, &mut program);

    // The compressor may fold code into newer syntax; lower it again.
    lower(&allocator, path, &transform_options, &mut program)?;

    let printed = Codegen::new()
        // Not `CodegenOptions::minify()`, which also drops comments.
        .with_options(CodegenOptions {
            minify: true,
            ..CodegenOptions::default()
        })
        .build(&program);
    with_helpers(path, printed.code)
}

/// Prepends the definitions of every helper `code` calls.
fn with_helpers(path: &Path, code: String) -> Result<String> {
    let names = runtime::referenced(&code);
    if names.is_empty() {
        return Ok(code);
    }
    match runtime::prelude(&names) {
        Ok(prelude) => Ok(prelude + &code),
        Err(unknown) => Err(script_error(
            path,
            [format!(
                "lowering to the target needs unsupported helper(s): {}",
                unknown.join(", ")
            )],
        )),
    }
}

pub(crate) fn build(ctx: &TaskContext<'_>, sources: &[PathBuf]) -> Result<Vec<Emitted>> {
    let resolver = IncludeResolver::new(vec![ctx.project.dev().join("src/js")]);
    let mut emitted = Vec::with_capacity(sources.len());
    for source in sources {
        let bundle = resolver.resolve(source)?;
        let code = transpile_and_minify(source, &bundle, &ctx.options.script_target)?;
        emitted.push(Emitted::new(ctx.dest_for(source, Some("min.js")), code));
    }
    Ok(emitted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_syntax_is_lowered() {
        let source = "function area(o, side) {\n    const s = o?.side ?? side;\n    return s ** 2;\n}\nwindow.area = area;\n";
        let out = transpile_and_minify(Path::new("app.js"), source, "es2015").unwrap();
        assert!(!out.contains("**"), "exponent survived: {}", out);
        assert!(!out.contains("?."), "optional chain survived: {}", out);
        assert!(!out.contains("??"), "nullish coalescing survived: {}", out);
        assert!(out.contains("area"), "identifier was renamed: {}", out);
    }

    #[test]
    fn test_lowered_helpers_are_bundled() {
        let source = "async function load(fetchIt) {\n    const { id, ...rest } = await fetchIt();\n    return { id, ...rest };\n}\nwindow.load = load;\n";
        let out = transpile_and_minify(Path::new("app.js"), source, "es2015").unwrap();
        assert!(!out.contains("require("), "module import emitted: {}", out);
        assert!(!out.contains("async function"), "async survived: {}", out);
        assert!(out.starts_with("var babelHelpers=babelHelpers||{};"), "{}", out);
        for name in runtime::referenced(&out) {
            assert!(out.contains(&format!("h.{}=", name)), "{} undefined: {}", name, out);
        }
        assert!(out.contains("babelHelpers.asyncToGenerator"), "{}", out);
    }

    #[test]
    fn test_comments_are_kept() {
        let source = "/* keep me */\nfunction run(a) {\n    return a + 1;\n}\nwindow.run = run;\n";
        let out = transpile_and_minify(Path::new("app.js"), source, "es2015").unwrap();
        assert!(out.contains("keep me"), "comment dropped: {}", out);
    }

    #[test]
    fn test_es5_target_is_reported() {
        let err = transpile_and_minify(Path::new("a.js"), "1;", "es5").unwrap_err();
        assert!(matches!(err, PipelineError::Script { .. }));
    }

    #[test]
    fn test_output_is_minified_and_keeps_names() {
        let source = "function greetVisitor(name) {\n    return 'Hello, ' + name;\n}\n\nwindow.greetVisitor = greetVisitor;\n";
        let out = transpile_and_minify(Path::new("app.js"), source, "es2015").unwrap();
        assert!(out.len() < source.len(), "not minified: {}", out);
        assert!(out.contains("greetVisitor"));
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let err = transpile_and_minify(Path::new("bad.js"), "function (", "es2015").unwrap_err();
        assert!(matches!(err, PipelineError::Script { .. }));
    }

    #[test]
    fn test_unknown_target_is_reported() {
        let err = transpile_and_minify(Path::new("a.js"), "1;", "es1999").unwrap_err();
        assert!(matches!(err, PipelineError::Script { .. }));
    }
}

// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Textual include directives for script bundles.
//!
//! Supported forms, one per line:
//!
//! ```text
//! //= include path/to/file.js
//! //= require vendor/lib          (".js" is implied)
//! //= include modules/*.js        (glob, sorted)
//! //= include_tree modules        (every .js below the directory)
//! //= require_directory modules   (every .js directly in the directory)
//! /*= include banner.js */
//! ```
//!
//! Targets resolve against the including file's directory first, then each
//! include path. `require` pulls a file in at most once per bundle; `include`
//! always inlines it. A target that resolves to nothing fails the bundle.

use super::read_text;
use crate::error::{PipelineError, Result};
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

fn directive() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^[ \t]*(?://|/\*)=[ \t]*(include|require)(?:_(tree|directory))?[ \t]+(\S+?)[ \t]*(?:\*/)?[ \t]*$",
        )
        .expect("valid regex")
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    File,
    Tree,
    Directory,
}

#[derive(Debug)]
struct Directive {
    once: bool,
    scope: Scope,
    target: String,
}

fn parse_directive(line: &str) -> Option<Directive> {
    let caps = directive().captures(line)?;
    let scope = match caps.get(2).map(|m| m.as_str()) {
        Some("tree") => Scope::Tree,
        Some("directory") => Scope::Directory,
        _ => Scope::File,
    };
    let target = caps[3].trim_matches(|c| c == '"' || c == '\'').to_string();
    Some(Directive {
        once: &caps[1] == "require",
        scope,
        target,
    })
}

fn has_glob_chars(target: &str) -> bool {
    target.contains(['*', '?', '['])
}

fn is_script(path: &Path) -> bool {
    path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("js")
}

fn glob_scripts(pattern: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = match glob::glob(pattern) {
        Ok(paths) => paths.flatten().filter(|p| is_script(p)).collect(),
        Err(_) => Vec::new(),
    };
    files.sort();
    files
}

fn canonical(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).map_err(|e| PipelineError::io(path, e))
}

/// Resolves include directives for one bundle at a time.
#[derive(Debug, Clone, Default)]
pub struct IncludeResolver {
    include_paths: Vec<PathBuf>,
}

struct Bundle {
    stack: Vec<PathBuf>,
    seen: HashSet<PathBuf>,
}

impl IncludeResolver {
    /// Creates a resolver that falls back to `include_paths` after the including file's directory.
    pub fn new(include_paths: Vec<PathBuf>) -> Self {
        Self { include_paths }
    }

    /// Reads `entry` and returns its text with every directive expanded.
    pub fn resolve(&self, entry: &Path) -> Result<String> {
        let canonical_entry = canonical(entry)?;
        let mut bundle = Bundle {
            stack: Vec::new(),
            seen: HashSet::new(),
        };
        bundle.seen.insert(canonical_entry.clone());
        self.expand(entry, canonical_entry, &mut bundle)
    }

    fn expand(&self, file: &Path, key: PathBuf, bundle: &mut Bundle) -> Result<String> {
        bundle.stack.push(key);
        let source = read_text(file)?;
        let mut out = String::with_capacity(source.len());

        for line in source.split_inclusive('\n') {
            let body = line.trim_end_matches(['\n', '\r']);
            let Some(directive) = parse_directive(body) else {
                out.push_str(line);
                continue;
            };

            let targets = self.locate(file, &directive);
            if targets.is_empty() {
                return Err(PipelineError::MissingInclude {
                    file: file.to_path_buf(),
                    target: directive.target,
                });
            }

            for target in targets {
                let target_key = canonical(&target)?;
                if bundle.stack.contains(&target_key) {
                    let mut chain = bundle.stack.clone();
                    chain.push(target_key);
                    return Err(PipelineError::IncludeCycle(chain));
                }
                if directive.once && bundle.seen.contains(&target_key) {
                    tracing::debug!("Skipping already required {}", target.display());
                    continue;
                }
                bundle.seen.insert(target_key.clone());

                let included = self.expand(&target, target_key, bundle)?;
                out.push_str(&included);
                if !included.ends_with('\n') {
                    out.push('\n');
                }
            }
        }

        bundle.stack.pop();
        Ok(out)
    }

    fn search_bases(&self, file: &Path) -> Vec<PathBuf> {
        let mut bases = Vec::with_capacity(self.include_paths.len() + 1);
        if let Some(dir) = file.parent() {
            bases.push(dir.to_path_buf());
        }
        bases.extend(self.include_paths.iter().cloned());
        bases
    }

    fn locate(&self, file: &Path, directive: &Directive) -> Vec<PathBuf> {
        for base in self.search_bases(file) {
            let escaped = glob::Pattern::escape(&base.to_string_lossy());
            let found = match directive.scope {
                Scope::Tree => {
                    glob_scripts(&format!("{}/{}/**/*.js", escaped, directive.target))
                }
                Scope::Directory => {
                    glob_scripts(&format!("{}/{}/*.js", escaped, directive.target))
                }
                Scope::File if has_glob_chars(&directive.target) => {
                    glob_scripts(&format!("{}/{}", escaped, directive.target))
                }
                Scope::File => {
                    let mut candidate = base.join(&directive.target);
                    if candidate.extension().is_none() {
                        candidate.set_extension("js");
                    }
                    if candidate.is_file() {
                        vec![candidate]
                    } else {
                        Vec::new()
                    }
                }
            };
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }
}

/// Expands include directives in `entry`, using `include_paths` as fallback search roots.
pub fn resolve_includes(entry: &Path, include_paths: &[PathBuf]) -> Result<String> {
    IncludeResolver::new(include_paths.to_vec()).resolve(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_parse_directive_forms() {
        let d = parse_directive("//= include lib/a.js").unwrap();
        assert!(!d.once);
        assert_eq!(d.scope, Scope::File);
        assert_eq!(d.target, "lib/a.js");

        let d = parse_directive("  //=require 'vendor'").unwrap();
        assert!(d.once);
        assert_eq!(d.target, "vendor");

        let d = parse_directive("/*= include_tree modules */").unwrap();
        assert_eq!(d.scope, Scope::Tree);
        assert_eq!(d.target, "modules");

        assert!(parse_directive("// include a.js").is_none());
        assert!(parse_directive("var x = 1; //= include a.js").is_none());
    }

    #[test]
    fn test_nested_includes() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "app.js", "//= include lib/a\nmain();\n");
        write(root, "lib/a.js", "//= include b.js\na();\n");
        write(root, "lib/b.js", "b();");

        let out = resolve_includes(&root.join("app.js"), &[]).unwrap();
        assert_eq!(out, "b();\na();\nmain();\n");
    }

    #[test]
    fn test_include_path_fallback() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "src/js/app.js", "//= include shared\n");
        write(root, "vendor/shared.js", "shared();\n");

        let out = resolve_includes(&root.join("src/js/app.js"), &[root.join("vendor")]).unwrap();
        assert_eq!(out, "shared();\n");
    }

    #[test]
    fn test_require_includes_once() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "app.js", "//= require util\n//= require util\n//= include util\n");
        write(root, "util.js", "u();\n");

        let out = resolve_includes(&root.join("app.js"), &[]).unwrap();
        assert_eq!(out, "u();\nu();\n");
    }

    #[test]
    fn test_glob_and_directory_includes_are_sorted() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "app.js", "//= include parts/*.js\n//= require_tree deep\n");
        write(root, "parts/b.js", "b();\n");
        write(root, "parts/a.js", "a();\n");
        write(root, "parts/readme.md", "no\n");
        write(root, "deep/x/z.js", "z();\n");
        write(root, "deep/y.js", "y();\n");

        let out = resolve_includes(&root.join("app.js"), &[]).unwrap();
        assert_eq!(out, "a();\nb();\nz();\ny();\n");
    }

    #[test]
    fn test_missing_include_fails() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "app.js", "//= include nowhere\n");

        let err = resolve_includes(&root.join("app.js"), &[]).unwrap_err();
        match err {
            PipelineError::MissingInclude { target, .. } => assert_eq!(target, "nowhere"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_cycle_is_detected() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "a.js", "//= include b\n");
        write(root, "b.js", "//= include a\n");

        let err = resolve_includes(&root.join("a.js"), &[]).unwrap_err();
        assert!(matches!(err, PipelineError::IncludeCycle(ref chain) if chain.len() == 3));
    }
}

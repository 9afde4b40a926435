// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! The task mapping: which source globs flow into which transform task.
//!
//! The table is fixed. Every [`TaskSpec`] names a build glob (`sources`),
//! the globs that should trigger a rebuild (`watch`), and a destination
//! subpath under `dist`. Watch globs of distinct tasks claim disjoint files.

use crate::error::{PipelineError, Result};
use crate::reload::ReloadEvent;
use globset::{Glob, GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use std::fmt;
use std::path::{Path, PathBuf};

/// Identifies one transform task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskKind {
    /// Markup pages at the root of `dev`.
    Html,
    /// Sass entry stylesheets.
    Styles,
    /// Script bundles with include directives.
    Scripts,
    /// JSON documents merged into one.
    Json,
    /// Font files, copied verbatim.
    Fonts,
    /// Third-party plugin files, copied verbatim.
    Plugins,
    /// Raster and vector images, optimized.
    Images,
    /// Icon files, copied verbatim.
    Icons,
}

impl TaskKind {
    /// Every task, in table order.
    pub const ALL: [TaskKind; 8] = [
        TaskKind::Html,
        TaskKind::Styles,
        TaskKind::Scripts,
        TaskKind::Json,
        TaskKind::Fonts,
        TaskKind::Plugins,
        TaskKind::Images,
        TaskKind::Icons,
    ];

    /// Returns the task's command name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Html => "html",
            TaskKind::Styles => "scss",
            TaskKind::Scripts => "javascript",
            TaskKind::Json => "json",
            TaskKind::Fonts => "fonts",
            TaskKind::Plugins => "plugins",
            TaskKind::Images => "images",
            TaskKind::Icons => "icons",
        }
    }

    /// The reload event connected sessions receive after this task writes output.
    pub fn reload_event(&self) -> ReloadEvent {
        match self {
            TaskKind::Styles => ReloadEvent::Styles,
            _ => ReloadEvent::Page,
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(TaskKind::Html),
            "scss" | "sass" | "styles" | "css" => Ok(TaskKind::Styles),
            "javascript" | "js" | "scripts" => Ok(TaskKind::Scripts),
            "json" => Ok(TaskKind::Json),
            "fonts" => Ok(TaskKind::Fonts),
            "plugins" => Ok(TaskKind::Plugins),
            "images" | "img" => Ok(TaskKind::Images),
            "icons" => Ok(TaskKind::Icons),
            _ => Err(format!("Unknown task: {}", s)),
        }
    }
}

/// One row of the task mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    /// Task this row belongs to.
    pub kind: TaskKind,
    /// Build glob, relative to `dev`.
    pub sources: &'static str,
    /// Globs that trigger a rebuild, relative to `dev`.
    pub watch: &'static [&'static str],
    /// Destination directory, relative to `dist`.
    pub dest: &'static str,
    /// Skip `_`-prefixed files when building (Sass partials).
    pub skip_partials: bool,
}

const TABLE: [TaskSpec; 8] = [
    TaskSpec {
        kind: TaskKind::Html,
        sources: "*.html",
        watch: &["*.html"],
        dest: "",
        skip_partials: false,
    },
    TaskSpec {
        kind: TaskKind::Styles,
        sources: "src/scss/*.scss",
        watch: &["src/scss/**/*.scss"],
        dest: "src/css",
        skip_partials: true,
    },
    TaskSpec {
        kind: TaskKind::Scripts,
        sources: "src/js/*.js",
        watch: &["src/js/**/*.js"],
        dest: "src/js",
        skip_partials: false,
    },
    TaskSpec {
        kind: TaskKind::Json,
        sources: "src/json/**/*.json",
        watch: &["src/json/**/*.json"],
        dest: "src/json",
        skip_partials: false,
    },
    TaskSpec {
        kind: TaskKind::Fonts,
        sources: "src/fonts/*",
        watch: &["src/fonts/*"],
        dest: "src/fonts",
        skip_partials: false,
    },
    TaskSpec {
        kind: TaskKind::Plugins,
        sources: "src/plugins/*",
        watch: &["src/plugins/*"],
        dest: "src/plugins",
        skip_partials: false,
    },
    TaskSpec {
        kind: TaskKind::Images,
        sources: "images/*",
        watch: &["images/*"],
        dest: "images",
        skip_partials: false,
    },
    TaskSpec {
        kind: TaskKind::Icons,
        sources: "images/icons/*",
        watch: &["images/icons/*"],
        dest: "images/icons",
        skip_partials: false,
    },
];

fn compile_glob(pattern: &str) -> Result<Glob> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| PipelineError::Glob {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

/// Renders a path relative to `dev` with forward slashes, for glob matching.
pub fn relative_key(dev: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(dev).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('_'))
}

impl TaskSpec {
    /// Compiles the build glob.
    pub fn source_matcher(&self) -> Result<GlobMatcher> {
        Ok(compile_glob(self.sources)?.compile_matcher())
    }

    /// Compiles the watch globs into one set.
    pub fn watch_set(&self) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in self.watch {
            builder.add(compile_glob(pattern)?);
        }
        builder.build().map_err(|e| PipelineError::Glob {
            pattern: self.watch.join(", "),
            message: e.to_string(),
        })
    }

    /// Destination directory for this task inside `dist`.
    pub fn dest_dir(&self, dist: &Path) -> PathBuf {
        if self.dest.is_empty() {
            dist.to_path_buf()
        } else {
            dist.join(self.dest)
        }
    }

    /// Lists the regular files under `dev` this task builds, sorted.
    pub fn collect_sources(&self, dev: &Path) -> Result<Vec<PathBuf>> {
        let base = glob::Pattern::escape(&dev.to_string_lossy());
        let pattern = format!("{}/{}", base, self.sources);
        let entries = glob::glob(&pattern).map_err(|e| PipelineError::Glob {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| {
                let path = e.path().to_path_buf();
                PipelineError::io(path, std::io::Error::from(e))
            })?;
            if !path.is_file() {
                continue;
            }
            if self.skip_partials && is_partial(&path) {
                continue;
            }
            files.push(path);
        }
        files.sort();
        Ok(files)
    }
}

/// The fixed table of task specs.
#[derive(Debug, Clone)]
pub struct TaskMapping {
    specs: Vec<TaskSpec>,
}

impl Default for TaskMapping {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskMapping {
    /// Builds the standard mapping.
    pub fn new() -> Self {
        Self {
            specs: TABLE.to_vec(),
        }
    }

    /// All specs, in table order.
    pub fn specs(&self) -> &[TaskSpec] {
        &self.specs
    }

    /// The spec for a task.
    pub fn spec(&self, kind: TaskKind) -> &TaskSpec {
        self.specs
            .iter()
            .find(|s| s.kind == kind)
            .unwrap_or(&TABLE[kind as usize])
    }

    /// The task whose watch globs claim a `dev`-relative path.
    pub fn task_for(&self, relative: &str) -> Result<Option<TaskKind>> {
        for spec in &self.specs {
            if spec.watch_set()?.is_match(relative) {
                return Ok(Some(spec.kind));
            }
        }
        Ok(None)
    }

    /// Checks that no file under `dev` is claimed by two tasks.
    ///
    /// Returns each conflicting path with the tasks that claim it.
    pub fn validate(&self, dev: &Path) -> Result<Vec<(String, Vec<TaskKind>)>> {
        let sets = self
            .specs
            .iter()
            .map(|s| Ok((s.kind, s.watch_set()?)))
            .collect::<Result<Vec<_>>>()?;

        let base = glob::Pattern::escape(&dev.to_string_lossy());
        let pattern = format!("{}/**/*", base);
        let entries = glob::glob(&pattern).map_err(|e| PipelineError::Glob {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;

        let mut conflicts = Vec::new();
        for path in entries.flatten().filter(|p| p.is_file()) {
            let Some(key) = relative_key(dev, &path) else {
                continue;
            };
            let owners: Vec<TaskKind> = sets
                .iter()
                .filter(|(_, set)| set.is_match(&key))
                .map(|(kind, _)| *kind)
                .collect();
            if owners.len() > 1 {
                conflicts.push((key, owners));
            }
        }
        conflicts.sort();
        Ok(conflicts)
    }
}

// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Transform tasks.
//!
//! Every task reads the files matching its build glob, runs them through
//! its chain, and writes the results under `dist`. A task produces all of
//! its outputs in memory before writing any of them, so a failing file
//! aborts the run without touching what an earlier run wrote.
//!
//! | Task | Chain |
//! |------|-------|
//! | `html` | copy (optional whitespace collapse) |
//! | `scss` | glob imports → Sass → prefix → minify → `.min.css` + map |
//! | `javascript` | includes → ES2015 → minify → `.min.js` |
//! | `json` | deep merge → `merge.json` |
//! | `fonts`, `plugins`, `icons` | copy |
//! | `images` | re-encode when smaller, else copy |

mod copy;
mod html;
mod images;
mod include;
mod json;
mod runtime;
mod scripts;
mod styles;

pub use include::{resolve_includes, IncludeResolver};
pub use json::merge_documents;
pub use styles::expand_glob_imports;

use crate::error::{PipelineError, Result};
use crate::mapping::{TaskKind, TaskMapping, TaskSpec};
use crate::project::Project;
use crate::reload::ReloadEvent;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Default browser support matrix for vendor prefixing.
pub const DEFAULT_BROWSERS: [&str; 4] = [">1%", "last 4 versions", "Firefox ESR", "not ie < 10"];

/// Tunables shared by the transform tasks.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskOptions {
    /// Browserslist queries for stylesheet prefixing.
    pub browsers: Vec<String>,
    /// ECMAScript target for script transpilation.
    pub script_target: String,
    /// JPEG re-encode quality, 1-100.
    pub jpeg_quality: u8,
    /// Collapse whitespace between markup tags.
    pub minify_html: bool,
}

impl Default for TaskOptions {
    fn default() -> Self {
        Self {
            browsers: DEFAULT_BROWSERS.iter().map(|s| s.to_string()).collect(),
            script_target: "es2015".to_string(),
            jpeg_quality: 85,
            minify_html: false,
        }
    }
}

/// A file a task wants written, held in memory until the whole run succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emitted {
    /// Absolute destination path.
    pub path: PathBuf,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl Emitted {
    /// Creates an output for `path`.
    pub fn new(path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            bytes: bytes.into(),
        }
    }
}

/// Outcome of a successful task run.
#[derive(Debug, Clone)]
pub struct TaskReport {
    /// Task that ran.
    pub kind: TaskKind,
    /// Files written, in the order they were produced.
    pub outputs: Vec<PathBuf>,
    /// Wall time of the run.
    pub elapsed: Duration,
}

impl TaskReport {
    /// Event to broadcast to connected sessions.
    pub fn reload_event(&self) -> ReloadEvent {
        self.kind.reload_event()
    }
}

/// Everything a task needs to do its work.
pub(crate) struct TaskContext<'a> {
    pub project: &'a Project,
    pub spec: &'a TaskSpec,
    pub options: &'a TaskOptions,
}

impl TaskContext<'_> {
    /// Destination for a source file: same name, optionally with a new extension.
    pub fn dest_for(&self, source: &Path, extension: Option<&str>) -> PathBuf {
        let dir = self.spec.dest_dir(self.project.dist());
        match extension {
            Some(ext) => {
                let stem = source
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                dir.join(format!("{}.{}", stem, ext))
            }
            None => dir.join(source.file_name().unwrap_or_default()),
        }
    }
}

/// Reads a source file as text.
pub(crate) fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))
}

/// Reads a source file as bytes.
pub(crate) fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| PipelineError::io(path, e))
}

/// Writes one output through a sibling temp file and a rename.
pub fn write_output(output: &Emitted) -> Result<()> {
    write_outputs(std::slice::from_ref(output))
}

/// Writes a run's outputs in two phases.
///
/// Every changed output is first staged in a sibling temp file; only when
/// all of them are staged are they renamed into place. A failure while
/// staging removes the temp files and leaves every destination untouched.
/// Unchanged outputs are left alone, which keeps reruns byte-identical and
/// avoids touching modification times.
pub fn write_outputs(outputs: &[Emitted]) -> Result<()> {
    let mut staged: Vec<(PathBuf, &Emitted)> = Vec::new();
    for output in outputs {
        match stage(output) {
            Ok(Some(temp)) => staged.push((temp, output)),
            Ok(None) => tracing::debug!("Unchanged {}", output.path.display()),
            Err(e) => {
                discard(&staged);
                return Err(e);
            }
        }
    }

    for (i, (temp, output)) in staged.iter().enumerate() {
        if let Err(e) = fs::rename(temp, &output.path) {
            discard(&staged[i..]);
            return Err(PipelineError::io(&output.path, e));
        }
        tracing::debug!("Wrote {} ({} bytes)", output.path.display(), output.bytes.len());
    }
    Ok(())
}

/// Writes `output` to a fresh temp file next to its destination, or returns
/// `None` when the destination already holds the same bytes.
fn stage(output: &Emitted) -> Result<Option<PathBuf>> {
    let path = &output.path;
    if let Ok(existing) = fs::read(path) {
        if existing == output.bytes {
            return Ok(None);
        }
    }

    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;

    let temp = parent.join(temp_name(path));
    if let Err(e) = fs::write(&temp, &output.bytes) {
        let _ = fs::remove_file(&temp);
        return Err(PipelineError::io(&temp, e));
    }
    Ok(Some(temp))
}

/// Temp file name unique to this process and call, so concurrent runs
/// never share one.
fn temp_name(path: &Path) -> String {
    static NEXT: AtomicU64 = AtomicU64::new(0);
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!(
        ".{}.{}-{}.tmp",
        file_name,
        std::process::id(),
        NEXT.fetch_add(1, Ordering::Relaxed)
    )
}

fn discard(staged: &[(PathBuf, &Emitted)]) {
    for (temp, _) in staged {
        let _ = fs::remove_file(temp);
    }
}

/// Runs one task against a project.
pub fn run_task(project: &Project, kind: TaskKind, options: &TaskOptions) -> Result<TaskReport> {
    let mapping = TaskMapping::new();
    run_with_mapping(project, &mapping, kind, options)
}

/// Runs one task using an explicit mapping.
pub fn run_with_mapping(
    project: &Project,
    mapping: &TaskMapping,
    kind: TaskKind,
    options: &TaskOptions,
) -> Result<TaskReport> {
    let start = Instant::now();
    let spec = mapping.spec(kind);
    let ctx = TaskContext {
        project,
        spec,
        options,
    };
    let sources = spec.collect_sources(project.dev())?;
    tracing::info!("Running {} on {} file(s)", kind, sources.len());

    let emitted = match kind {
        TaskKind::Html => html::build(&ctx, &sources)?,
        TaskKind::Styles => styles::build(&ctx, &sources)?,
        TaskKind::Scripts => scripts::build(&ctx, &sources)?,
        TaskKind::Json => json::build(&ctx, &sources)?,
        TaskKind::Fonts | TaskKind::Plugins | TaskKind::Icons => copy::build(&ctx, &sources)?,
        TaskKind::Images => images::build(&ctx, &sources)?,
    };

    write_outputs(&emitted)?;
    let outputs: Vec<PathBuf> = emitted.into_iter().map(|output| output.path).collect();

    let elapsed = start.elapsed();
    tracing::info!("{} wrote {} file(s) in {}ms", kind, outputs.len(), elapsed.as_millis());
    Ok(TaskReport {
        kind,
        outputs,
        elapsed,
    })
}

/// Runs every task in table order. A failing task does not stop the rest.
pub fn run_all(project: &Project, options: &TaskOptions) -> Vec<(TaskKind, Result<TaskReport>)> {
    let mapping = TaskMapping::new();
    TaskKind::ALL
        .iter()
        .map(|kind| {
            let result = run_with_mapping(project, &mapping, *kind, options);
            if let Err(e) = &result {
                tracing::error!("{} failed: {}", kind, e);
            }
            (*kind, result)
        })
        .collect()
}

// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]

//! # assetline
//!
//! Front-end asset build pipeline for static sites.
//!
//! A project has a `dev` source tree and a `dist` build tree. A fixed
//! [`TaskMapping`] decides which source files flow through which transform
//! task and where the results land:
//!
//! - `*.html` is copied to `dist/`
//! - `src/scss/*.scss` is compiled, prefixed and minified to `dist/src/css/*.min.css`
//! - `src/js/*.js` has its includes resolved, is transpiled and minified to `dist/src/js/*.min.js`
//! - `src/json/**/*.json` is merged into `dist/src/json/merge.json`
//! - fonts, plugins and icons are copied; images are optimized
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use assetline::{run_task, Project, TaskKind, TaskOptions};
//!
//! let project = Project::open("./my-site")?;
//! let report = run_task(&project, TaskKind::Styles, &TaskOptions::default())?;
//! println!("wrote {} file(s)", report.outputs.len());
//! ```

/// Error types.
pub mod error;
/// The glob → task → destination table.
pub mod mapping;
/// Project layout.
pub mod project;
/// Reload signals for connected browsers.
pub mod reload;
/// Transform tasks.
pub mod tasks;

pub use error::{PipelineError, Result};
pub use mapping::{TaskKind, TaskMapping, TaskSpec};
pub use project::Project;
pub use reload::ReloadEvent;
pub use tasks::{run_all, run_task, run_with_mapping, TaskOptions, TaskReport};

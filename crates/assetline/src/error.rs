// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Error types for the asset pipeline.
//!
//! [`PipelineError`] covers the three failure classes a task run can hit:
//!
//! - **Configuration errors**: the project root or `dev` tree is missing
//! - **Transform errors**: a source file fails its chain (unresolved include,
//!   invalid Sass, unparsable script, malformed JSON, undecodable image)
//! - **I/O errors**: a source cannot be read or a destination cannot be written
//!
//! Errors are local to the task that raised them. Nothing is retried.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for pipeline operations.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The project layout is unusable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading a source or writing an output failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File or directory the operation touched.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A glob pattern could not be compiled.
    #[error("Invalid glob pattern '{pattern}': {message}")]
    Glob {
        /// The offending pattern.
        pattern: String,
        /// Parser message.
        message: String,
    },

    /// A script include directive points at nothing.
    #[error("{file}: include target '{target}' not found")]
    MissingInclude {
        /// File holding the directive.
        file: PathBuf,
        /// Target as written in the directive.
        target: String,
    },

    /// Script includes form a loop.
    #[error("Include cycle: {}", format_cycle(.0))]
    IncludeCycle(Vec<PathBuf>),

    /// Sass compilation failed.
    #[error("Sass error in {file}: {message}")]
    Sass {
        /// Entry stylesheet.
        file: PathBuf,
        /// Compiler message.
        message: String,
    },

    /// Prefixing, minifying, or printing CSS failed.
    #[error("CSS error in {file}: {message}")]
    Css {
        /// Entry stylesheet.
        file: PathBuf,
        /// Processor message.
        message: String,
    },

    /// Parsing, transpiling, or minifying a script failed.
    #[error("Script error in {file}: {message}")]
    Script {
        /// Entry script.
        file: PathBuf,
        /// Diagnostic text.
        message: String,
    },

    /// A JSON document is malformed or not an object.
    #[error("JSON error in {file}: {message}")]
    Json {
        /// Offending document.
        file: PathBuf,
        /// Parser message.
        message: String,
    },

    /// An image could not be decoded or re-encoded.
    #[error("Image error in {file}: {message}")]
    Image {
        /// Offending image.
        file: PathBuf,
        /// Codec message.
        message: String,
    },
}

fn format_cycle(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl PipelineError {
    /// Wraps an I/O error with the path it happened on.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Returns true for errors raised by a transformation chain rather than the filesystem.
    pub fn is_transform_error(&self) -> bool {
        matches!(
            self,
            Self::MissingInclude { .. }
                | Self::IncludeCycle(_)
                | Self::Sass { .. }
                | Self::Css { .. }
                | Self::Script { .. }
                | Self::Json { .. }
                | Self::Image { .. }
        )
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! # assetline CLI
//!
//! Command-line tools for building a static site's assets.
//!
//! ## Commands
//!
//! - `assetline` / `assetline dev` - Watch `dev`, rebuild on change and serve `dist` with live reload
//! - `assetline build` - Run every task once
//! - `assetline clean` - Remove `dist`
//! - `assetline serve` - Serve `dist` without watching
//! - `assetline watch` - Rebuild on change without a server
//! - `assetline scss` (and every other task name) - Run one task
//!
//! ## Modules
//!
//! - [`commands`] - CLI command implementations
//! - [`config`] - `assetline.toml` loading
//! - [`server`] - Dev server and live reload
//! - [`watcher`] - File watching and the task queue

#![warn(missing_docs)]

/// CLI command implementations.
pub mod commands;
/// Configuration management.
pub mod config;
/// Human-facing progress lines.
pub mod output;
/// Development server with live reload.
pub mod server;
/// File system watching and the task queue.
pub mod watcher;

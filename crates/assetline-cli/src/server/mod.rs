// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Development server components.
//!
//! # Components
//!
//! - `http`: static file server over `dist` using Axum
//! - `livereload`: WebSocket-based reload notifications
//! - `registry`: the set of connected sessions

/// HTTP server implementation using Axum.
pub mod http;
/// Live reload WebSocket handler.
pub mod livereload;
/// Connected session tracking.
pub mod registry;

pub use http::{create_server, router, serve};
pub use registry::{Session, SessionRegistry};

// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Static server command.
//!
//! Serves `dist` as it is. Nothing is built and nothing is watched, but the
//! live reload endpoint is still mounted so open pages keep their socket.

use assetline::Project;
use std::sync::Arc;

use crate::output;
use crate::server::{create_server, SessionRegistry};

/// Serves `dist` on `addr` until Ctrl+C.
pub async fn run(project: &Project, addr: &str, quiet: bool) -> anyhow::Result<()> {
    if !project.dist().exists() {
        tracing::warn!(
            "{} does not exist yet; run `assetline build` first",
            project.dist().display()
        );
    }

    if !quiet {
        output::server_address("Server:", &format!("http://{}", addr));
        println!();
    }

    let registry = Arc::new(SessionRegistry::new());
    create_server(addr, project.dist(), registry).await
}

// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Watch-only command: rebuild on change, no server.

use assetline::{Project, TaskMapping};
use console::style;
use std::sync::Arc;
use tokio::signal;

use crate::commands::check_mapping;
use crate::config::Config;
use crate::server::SessionRegistry;
use crate::watcher::{run_queue, task_queue, TaskRunner, Watcher};

/// Watches `dev` and runs tasks until Ctrl+C.
pub async fn run(project: &Project, config: &Config, quiet: bool) -> anyhow::Result<()> {
    let mapping = TaskMapping::new();
    check_mapping(project, &mapping)?;

    let (tx, rx) = task_queue();
    let watcher = Watcher::new(project.dev(), config.debounce(), tx)?;
    watcher.subscribe_all(&mapping)?;

    // Nobody listens for reloads here; the registry just absorbs them.
    let registry = Arc::new(SessionRegistry::new());
    let runner = TaskRunner::new(project.clone(), mapping, config.task_options(), registry, quiet);
    let consumer = tokio::spawn(run_queue(rx, runner));

    if !quiet {
        println!(
            "{} {}",
            style("Watching for changes in:").cyan(),
            style(project.dev().display()).dim()
        );
        println!("Press Ctrl+C to stop...");
        println!();
    }

    signal::ctrl_c().await?;

    drop(watcher);
    consumer.abort();
    if !quiet {
        println!("\nStopping file watcher...");
    }
    Ok(())
}

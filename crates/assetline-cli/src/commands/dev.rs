// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Development command: watch, rebuild and serve with live reload.

use assetline::{Project, TaskMapping};
use console::style;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;

use crate::commands::{build, check_mapping};
use crate::config::Config;
use crate::output;
use crate::server::{create_server, router, SessionRegistry};
use crate::watcher::{run_queue, task_queue, SubscriptionHandle, TaskRunner, Watcher};

/// A running watcher and task queue wired to a session registry.
///
/// Dropping it stops the watcher and the queue consumer.
pub struct Orchestrator {
    project: Project,
    registry: Arc<SessionRegistry>,
    watcher: Watcher,
    subscriptions: Vec<SubscriptionHandle>,
    consumer: JoinHandle<()>,
}

impl Orchestrator {
    /// Starts watching `dev` and consuming the task queue.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(project: Project, config: &Config, quiet: bool) -> anyhow::Result<Self> {
        let mapping = TaskMapping::new();
        check_mapping(&project, &mapping)?;

        let registry = Arc::new(SessionRegistry::new());
        let (tx, rx) = task_queue();
        let watcher = Watcher::new(project.dev(), config.debounce(), tx)?;
        let subscriptions = watcher.subscribe_all(&mapping)?;

        let runner = TaskRunner::new(
            project.clone(),
            mapping,
            config.task_options(),
            registry.clone(),
            quiet,
        );
        let consumer = tokio::spawn(run_queue(rx, runner));

        Ok(Self {
            project,
            registry,
            watcher,
            subscriptions,
            consumer,
        })
    }

    /// The registry reload events are sent to.
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// The per-task subscriptions, in table order.
    pub fn subscriptions(&self) -> &[SubscriptionHandle] {
        &self.subscriptions
    }

    /// The underlying watcher.
    pub fn watcher(&self) -> &Watcher {
        &self.watcher
    }

    /// Routes serving `dist` with live reload wired to this orchestrator.
    pub fn router(&self) -> axum::Router {
        router(self.project.dist(), self.registry.clone())
    }

    /// Serves on `addr` until Ctrl+C.
    pub async fn serve(self, addr: &str) -> anyhow::Result<()> {
        create_server(addr, self.project.dist(), self.registry.clone()).await
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.consumer.abort();
    }
}

/// Runs the dev command.
pub async fn run(
    project: &Project,
    config: &Config,
    addr: &str,
    initial_build: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    if initial_build {
        let start = Instant::now();
        let options = config.task_options();
        let build_project = project.clone();
        let failures = tokio::task::spawn_blocking(move || {
            build::build_all(&build_project, &options, quiet)
        })
        .await?;

        if failures > 0 {
            eprintln!(
                "  {} {}",
                style("✗").red(),
                style(format!("Initial build: {} task(s) failed", failures)).red()
            );
        } else if !quiet {
            println!(
                "  {} {} {}",
                style("✓").green(),
                style("Initial build").dim(),
                style(format!("{}ms", start.elapsed().as_millis())).dim()
            );
        }
    }

    let orchestrator = Orchestrator::start(project.clone(), config, quiet)?;

    if !quiet {
        output::server_address("Server:", &format!("http://{}", addr));
        output::watching();
    }

    orchestrator.serve(addr).await
}

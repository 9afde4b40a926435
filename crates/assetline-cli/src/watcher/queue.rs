// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! The task work queue and its consumer.

use assetline::{run_with_mapping, Project, Result, TaskKind, TaskMapping, TaskOptions, TaskReport};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinError;

use crate::output;
use crate::server::SessionRegistry;

/// Sending half of the work queue.
pub type TaskSender = mpsc::UnboundedSender<TaskKind>;
/// Receiving half of the work queue.
pub type TaskReceiver = mpsc::UnboundedReceiver<TaskKind>;

/// Creates the work queue.
pub fn task_queue() -> (TaskSender, TaskReceiver) {
    mpsc::unbounded_channel()
}

/// A run whose worker never returned, such as a panicking transform.
#[derive(Debug, thiserror::Error)]
#[error("{kind} run did not complete: {source}")]
pub struct TaskAborted {
    /// Task that was running.
    pub kind: TaskKind,
    #[source]
    source: JoinError,
}

/// Runs queued tasks and signals reloads.
///
/// Runs of the same task are serialized; runs of different tasks may
/// overlap.
#[derive(Clone)]
pub struct TaskRunner {
    project: Arc<Project>,
    mapping: Arc<TaskMapping>,
    options: Arc<TaskOptions>,
    registry: Arc<SessionRegistry>,
    locks: Arc<HashMap<TaskKind, Mutex<()>>>,
    quiet: bool,
}

impl TaskRunner {
    /// Creates a runner for `project` that reports to `registry`.
    pub fn new(
        project: Project,
        mapping: TaskMapping,
        options: TaskOptions,
        registry: Arc<SessionRegistry>,
        quiet: bool,
    ) -> Self {
        Self {
            project: Arc::new(project),
            mapping: Arc::new(mapping),
            options: Arc::new(options),
            registry,
            locks: Arc::new(TaskKind::ALL.iter().map(|k| (*k, Mutex::new(()))).collect()),
            quiet,
        }
    }

    /// Runs one task on the blocking pool.
    ///
    /// A run waits for an earlier run of the same task to finish, so the
    /// last queued run writes the final outputs. On success every connected
    /// session receives the task's reload event. On failure nothing is sent
    /// and the error is returned: a [`assetline::PipelineError`] from the
    /// task, or [`TaskAborted`] when the worker did not return.
    pub async fn run(&self, kind: TaskKind) -> anyhow::Result<TaskReport> {
        let _guard = match self.locks.get(&kind) {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };

        let project = self.project.clone();
        let mapping = self.mapping.clone();
        let options = self.options.clone();
        let joined = tokio::task::spawn_blocking(move || {
            run_with_mapping(&project, &mapping, kind, &options)
        })
        .await;

        self.finish(kind, joined)
    }

    fn finish(
        &self,
        kind: TaskKind,
        joined: std::result::Result<Result<TaskReport>, JoinError>,
    ) -> anyhow::Result<TaskReport> {
        match joined {
            Ok(Ok(report)) => {
                output::task_succeeded(&report, self.quiet);
                let reached = self.registry.notify(report.reload_event());
                tracing::info!("{} done, notified {} session(s)", kind, reached);
                Ok(report)
            }
            Ok(Err(e)) => {
                tracing::error!("{} failed: {}", kind, e);
                output::task_failed(kind, &e);
                Err(e.into())
            }
            Err(source) => {
                let e = TaskAborted { kind, source };
                tracing::error!("{}", e);
                output::task_failed(kind, &e);
                Err(e.into())
            }
        }
    }
}

/// Consumes the queue until every sender is gone.
///
/// Each task runs in its own spawned future, so runs of different tasks
/// may overlap and finish in any order. Runs of one task happen one at a
/// time, in the order they were queued.
pub async fn run_queue(mut receiver: TaskReceiver, runner: TaskRunner) {
    while let Some(kind) = receiver.recv().await {
        let runner = runner.clone();
        tokio::spawn(async move {
            let _ = runner.run(kind).await;
        });
    }
    tracing::debug!("Task queue closed");
}

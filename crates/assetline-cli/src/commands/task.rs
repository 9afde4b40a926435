// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Single task command.

use assetline::{run_task, Project, TaskKind};

use crate::config::Config;
use crate::output;

/// Runs one task and prints its result line.
pub fn run(project: &Project, config: &Config, kind: TaskKind, quiet: bool) -> anyhow::Result<()> {
    match run_task(project, kind, &config.task_options()) {
        Ok(report) => {
            output::task_succeeded(&report, quiet);
            for path in &report.outputs {
                tracing::debug!("{} -> {}", kind, path.display());
            }
            Ok(())
        }
        Err(e) => {
            output::task_failed(kind, &e);
            Err(e.into())
        }
    }
}

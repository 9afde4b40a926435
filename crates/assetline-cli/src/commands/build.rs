// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Full build command.

use assetline::{run_with_mapping, Project, TaskKind, TaskMapping, TaskOptions};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::output;

/// Runs every task once, in table order.
///
/// A failing task does not stop the others. Returns the number of failures.
pub fn build_all(project: &Project, options: &TaskOptions, quiet: bool) -> usize {
    let mapping = TaskMapping::new();
    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(TaskKind::ALL.len() as u64)
    };
    if let Ok(bar_style) = ProgressStyle::default_bar()
        .template("  {spinner:.green} Building [{bar:30.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(bar_style.progress_chars("━━╺"));
    }
    pb.enable_steady_tick(Duration::from_millis(100));

    let mut failures = 0;
    for kind in TaskKind::ALL {
        pb.set_message(kind.as_str());
        let result = run_with_mapping(project, &mapping, kind, options);
        pb.suspend(|| match &result {
            Ok(report) => output::task_succeeded(report, quiet),
            Err(e) => {
                tracing::error!("{} failed: {}", kind, e);
                output::task_failed(kind, e);
            }
        });
        if result.is_err() {
            failures += 1;
        }
        pb.inc(1);
    }
    pb.finish_and_clear();
    failures
}

/// Runs the build command.
pub fn run(project: &Project, config: &Config, quiet: bool) -> anyhow::Result<()> {
    let start = Instant::now();
    let failures = build_all(project, &config.task_options(), quiet);

    if failures > 0 {
        anyhow::bail!("{} task(s) failed", failures);
    }

    if !quiet {
        println!(
            "{} {} {}",
            style("Build complete!").green().bold(),
            style("Assets written in").dim(),
            style(format!("{}ms", start.elapsed().as_millis())).cyan()
        );
    }
    Ok(())
}

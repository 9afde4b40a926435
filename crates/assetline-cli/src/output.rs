// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Human-facing progress lines.

use assetline::{TaskKind, TaskReport};
use std::fmt;
use console::style;
use std::path::Path;

/// Prints the startup banner.
pub fn banner(root: &Path) {
    println!("{}", style("Asset build started").green().bold());
    println!("{} {}", style("Project:").yellow(), style(root.display()).yellow());
    println!();
}

/// Prints the line for a finished task.
pub fn task_succeeded(report: &TaskReport, quiet: bool) {
    if quiet {
        return;
    }
    println!(
        "  {} {} {} {}",
        style("✓").green(),
        style(report.kind).cyan(),
        style(format!("{} file(s)", report.outputs.len())).dim(),
        style(format!("{}ms", report.elapsed.as_millis())).dim()
    );
}

/// Prints the line for a failed task. Failures are shown even when quiet.
pub fn task_failed(kind: TaskKind, error: &dyn fmt::Display) {
    eprintln!(
        "  {} {} {}",
        style("✗").red(),
        style(kind).red().bold(),
        style(error).red()
    );
}

/// Prints a server address line.
pub fn server_address(label: &str, url: &str) {
    println!("{} {}", style(label).cyan(), style(url).green().bold());
}

/// Prints the watching status line.
pub fn watching() {
    println!(
        "{} {}",
        style("Status:").cyan(),
        style("Watching for changes...").dim()
    );
    println!();
}

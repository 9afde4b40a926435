// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

use assetline::Project;
use console::style;

/// Removes the `dist` tree.
pub fn run(project: &Project, quiet: bool) -> anyhow::Result<()> {
    project.clean()?;
    if !quiet {
        println!(
            "{} {}",
            style("Removed").green(),
            style(project.dist().display()).dim()
        );
    }
    Ok(())
}

// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! CLI command implementations.
//!
//! - `dev`: watch, rebuild and serve with live reload (the default)
//! - `build`: run every task once
//! - `clean`: remove the `dist` tree
//! - `serve`: serve `dist` without watching
//! - `watch`: watch and rebuild without a server
//! - `task`: run a single named task

/// Full build command.
pub mod build;
/// Build tree removal command.
pub mod clean;
/// Watch, rebuild and serve command.
pub mod dev;
/// Static server command.
pub mod serve;
/// Single task command.
pub mod task;
/// Watch-only command.
pub mod watch;

use crate::config::Config;
use assetline::{Project, TaskMapping};
use std::path::Path;

/// Opens the project at `folder` and loads its configuration.
pub fn open_project(folder: &Path) -> anyhow::Result<(Project, Config)> {
    let root = if folder.is_absolute() {
        folder.to_path_buf()
    } else {
        std::env::current_dir()?.join(folder)
    };
    let project = Project::open(&root)?;
    let config = Config::load(project.root())?;
    Ok((project, config))
}

/// Host and port from CLI flags, falling back to the config file.
pub fn server_addr(config: &Config, host: Option<String>, port: Option<u16>) -> String {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    format!("{}:{}", host, port)
}

/// Warns about files claimed by more than one task.
pub fn check_mapping(project: &Project, mapping: &TaskMapping) -> anyhow::Result<()> {
    for (path, owners) in mapping.validate(project.dev())? {
        let names: Vec<_> = owners.iter().map(|k| k.as_str()).collect();
        tracing::warn!("{} is claimed by {}", path, names.join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_cli_flags_override_config() {
        let config = Config::default();
        assert_eq!(server_addr(&config, None, None), "127.0.0.1:3000");
        assert_eq!(server_addr(&config, Some("0.0.0.0".into()), Some(8080)), "0.0.0.0:8080");
    }

    #[test]
    fn test_open_project_requires_dev() {
        let dir = tempdir().unwrap();
        assert!(open_project(dir.path()).is_err());

        fs::create_dir_all(dir.path().join("dev")).unwrap();
        let (project, config) = open_project(dir.path()).unwrap();
        assert_eq!(project.dist(), dir.path().join("dist"));
        assert_eq!(config.server.port, 3000);
    }
}

// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Project configuration.
//!
//! Configuration is loaded from `assetline.toml` at the project root. The
//! file is optional and every key has a default.
//!
//! # Example Configuration
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 3000
//!
//! [watch]
//! debounce_ms = 750
//!
//! [styles]
//! browsers = [">1%", "last 4 versions", "Firefox ESR", "not ie < 10"]
//!
//! [scripts]
//! target = "es2015"
//!
//! [images]
//! jpeg_quality = 85
//!
//! [html]
//! minify = false
//! ```

use assetline::tasks::DEFAULT_BROWSERS;
use assetline::TaskOptions;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Name of the configuration file at the project root.
pub const CONFIG_FILE: &str = "assetline.toml";

/// Main configuration structure loaded from `assetline.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Development server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// File watcher settings.
    #[serde(default)]
    pub watch: WatchConfig,
    /// Stylesheet task settings.
    #[serde(default)]
    pub styles: StylesConfig,
    /// Script task settings.
    #[serde(default)]
    pub scripts: ScriptsConfig,
    /// Image task settings.
    #[serde(default)]
    pub images: ImagesConfig,
    /// Markup task settings.
    #[serde(default)]
    pub html: HtmlConfig,
}

/// Development server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server host (default: "127.0.0.1").
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port (default: 3000).
    #[serde(default = "default_port")]
    pub port: u16,
}

/// File watcher configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    /// Debounce window in milliseconds (default: 750).
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

/// Stylesheet configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StylesConfig {
    /// Browserslist queries used for vendor prefixing.
    #[serde(default = "default_browsers")]
    pub browsers: Vec<String>,
}

/// Script configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptsConfig {
    /// ECMAScript target, `es2015` or newer (default: "es2015").
    #[serde(default = "default_script_target")]
    pub target: String,
}

/// Image configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ImagesConfig {
    /// JPEG quality, 1-100 (default: 85).
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

/// Markup configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HtmlConfig {
    /// Collapse whitespace between tags (default: false).
    #[serde(default)]
    pub minify: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_debounce_ms() -> u64 {
    750
}

fn default_browsers() -> Vec<String> {
    DEFAULT_BROWSERS.iter().map(|s| s.to_string()).collect()
}

fn default_script_target() -> String {
    "es2015".to_string()
}

fn default_jpeg_quality() -> u8 {
    85
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            browsers: default_browsers(),
        }
    }
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            target: default_script_target(),
        }
    }
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

impl Config {
    /// Loads configuration from `assetline.toml` in the project root.
    ///
    /// If no configuration file exists, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be parsed.
    pub fn load(root: &Path) -> anyhow::Result<Self> {
        let config_path = root.join(CONFIG_FILE);

        if !config_path.exists() {
            tracing::debug!("No {} in {}, using defaults", CONFIG_FILE, root.display());
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid {}: {}", config_path.display(), e))?;
        Ok(config)
    }

    /// Debounce window for the file watcher.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.watch.debounce_ms)
    }

    /// Options handed to every transform task.
    pub fn task_options(&self) -> TaskOptions {
        TaskOptions {
            browsers: self.styles.browsers.clone(),
            script_target: self.scripts.target.clone(),
            jpeg_quality: self.images.jpeg_quality,
            minify_html: self.html.minify,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.debounce(), Duration::from_millis(750));
        assert_eq!(config.task_options(), TaskOptions::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "[server]\nport = 8080\n\n[images]\njpeg_quality = 70\n",
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.task_options().jpeg_quality, 70);
        assert_eq!(config.task_options().script_target, "es2015");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[server\nport = ").unwrap();
        let err = Config::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains(CONFIG_FILE));
    }
}

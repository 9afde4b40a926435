// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Watcher → task queue → session registry, against a real file system.

use std::fs;
use std::path::Path;
use std::time::Duration;

use assetline::{Project, ReloadEvent, TaskKind};
use assetline_cli::commands::dev::Orchestrator;
use assetline_cli::config::Config;
use assetline_cli::server::Session;
use tempfile::tempdir;

fn fast_config() -> Config {
    let mut config = Config::default();
    config.watch.debounce_ms = 100;
    config
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

async fn expect_event(session: &mut Session) -> ReloadEvent {
    tokio::time::timeout(Duration::from_secs(10), session.next_event())
        .await
        .expect("no reload within the watch cycle")
        .expect("registry closed")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_html_change_reloads_page() {
    let dir = tempdir().unwrap();
    write(dir.path(), "dev/index.html", "<p>one</p>");
    let project = Project::open(dir.path()).unwrap();

    let orchestrator = Orchestrator::start(project, &fast_config(), true).unwrap();
    let mut session = orchestrator.registry().connect();
    tokio::time::sleep(Duration::from_millis(300)).await;

    write(dir.path(), "dev/index.html", "<p>two</p>");

    assert_eq!(expect_event(&mut session).await, ReloadEvent::Page);
    assert_eq!(
        fs::read_to_string(dir.path().join("dist/index.html")).unwrap(),
        "<p>two</p>"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stylesheet_change_refreshes_styles() {
    let dir = tempdir().unwrap();
    write(dir.path(), "dev/src/scss/main.scss", "@import \"vars\";\n.a { color: $c; }\n");
    write(dir.path(), "dev/src/scss/_vars.scss", "$c: red;\n");
    let project = Project::open(dir.path()).unwrap();

    let orchestrator = Orchestrator::start(project, &fast_config(), true).unwrap();
    let mut session = orchestrator.registry().connect();
    tokio::time::sleep(Duration::from_millis(300)).await;

    // Editing a partial rebuilds the entry that imports it.
    write(dir.path(), "dev/src/scss/_vars.scss", "$c: blue;\n");

    assert_eq!(expect_event(&mut session).await, ReloadEvent::Styles);
    let css = fs::read_to_string(dir.path().join("dist/src/css/main.min.css")).unwrap();
    assert!(css.contains("color:#00f") || css.contains("color:blue"), "{}", css);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancelled_subscription_stops_dispatch() {
    let dir = tempdir().unwrap();
    write(dir.path(), "dev/index.html", "<p>one</p>");
    write(dir.path(), "dev/src/fonts/a.woff2", "font");
    let project = Project::open(dir.path()).unwrap();

    let orchestrator = Orchestrator::start(project, &fast_config(), true).unwrap();
    for handle in orchestrator.subscriptions() {
        if handle.kind() == TaskKind::Html {
            handle.cancel();
        }
    }
    let mut session = orchestrator.registry().connect();
    tokio::time::sleep(Duration::from_millis(300)).await;

    write(dir.path(), "dev/index.html", "<p>two</p>");
    write(dir.path(), "dev/src/fonts/a.woff2", "font2");

    assert_eq!(expect_event(&mut session).await, ReloadEvent::Page);
    assert!(dir.path().join("dist/src/fonts/a.woff2").exists());
    assert!(!dir.path().join("dist/index.html").exists());
}

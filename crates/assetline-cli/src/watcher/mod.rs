// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! File system watching for rebuilds.
//!
//! `Watcher` keeps one recursive, debounced watch on the `dev` tree and
//! dispatches each batch of changes to the subscriptions whose globs match.
//! A matching task is sent to the work queue once per batch.
//!
//! # Features
//!
//! - Debounced file change events (750ms by default)
//! - One cancellable subscription per mapping entry
//! - Recursive directory watching

mod queue;

pub use queue::{run_queue, task_queue, TaskAborted, TaskReceiver, TaskRunner, TaskSender};

use assetline::mapping::relative_key;
use assetline::{TaskKind, TaskMapping, TaskSpec};
use globset::GlobSet;
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{new_debouncer_opt, DebounceEventResult, Debouncer, FileIdMap};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One glob subscription.
struct Subscription {
    id: u64,
    kind: TaskKind,
    globs: GlobSet,
    active: Arc<AtomicBool>,
}

type Subscriptions = Arc<Mutex<Vec<Subscription>>>;

/// Handle returned by [`Watcher::subscribe`].
#[derive(Debug, Clone)]
pub struct SubscriptionHandle {
    id: u64,
    kind: TaskKind,
    active: Arc<AtomicBool>,
}

impl SubscriptionHandle {
    /// Subscription id, unique per watcher.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Task this subscription dispatches.
    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Stops dispatch for this glob. Batches already queued still run.
    pub fn cancel(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    /// Whether the subscription still dispatches.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

/// Watches the `dev` tree and feeds the task queue.
pub struct Watcher {
    #[allow(dead_code)]
    debouncer: Debouncer<RecommendedWatcher, FileIdMap>,
    subscriptions: Subscriptions,
    next_id: AtomicU64,
}

impl Watcher {
    /// Starts a debounced recursive watch on `dev`.
    ///
    /// No subscriptions exist yet; use [`Watcher::subscribe`] or
    /// [`Watcher::subscribe_all`] to start dispatching.
    pub fn new(dev: &Path, debounce: Duration, queue: TaskSender) -> anyhow::Result<Self> {
        let subscriptions: Subscriptions = Arc::new(Mutex::new(Vec::new()));

        let mut roots = vec![dev.to_path_buf()];
        if let Ok(canonical) = dev.canonicalize() {
            if canonical != dev {
                roots.push(canonical);
            }
        }

        let dispatch = subscriptions.clone();
        let mut debouncer = new_debouncer_opt::<_, RecommendedWatcher, FileIdMap>(
            debounce,
            None,
            move |result: DebounceEventResult| match result {
                Ok(events) => {
                    let subs = dispatch.lock().unwrap_or_else(|e| e.into_inner());
                    let tasks = tasks_for_batch(&roots, &subs, events.iter().map(|e| &e.event));
                    drop(subs);
                    for kind in tasks {
                        tracing::debug!("Queueing {}", kind);
                        if queue.send(kind).is_err() {
                            tracing::warn!("Task queue closed, dropping {}", kind);
                        }
                    }
                }
                Err(errors) => {
                    for error in errors {
                        tracing::warn!("Watch error: {}", error);
                    }
                }
            },
            FileIdMap::new(),
            notify::Config::default(),
        )?;

        debouncer.watch(dev, RecursiveMode::Recursive)?;
        tracing::info!("Watching {}", dev.display());

        Ok(Self {
            debouncer,
            subscriptions,
            next_id: AtomicU64::new(1),
        })
    }

    /// Subscribes a task to its watch globs.
    pub fn subscribe(&self, spec: &TaskSpec) -> anyhow::Result<SubscriptionHandle> {
        let globs = spec.watch_set()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let active = Arc::new(AtomicBool::new(true));

        self.subscriptions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Subscription {
                id,
                kind: spec.kind,
                globs,
                active: active.clone(),
            });
        tracing::debug!("Subscribed {} to {}", spec.kind, spec.watch.join(", "));

        Ok(SubscriptionHandle {
            id,
            kind: spec.kind,
            active,
        })
    }

    /// Subscribes every entry of the mapping, in table order.
    pub fn subscribe_all(&self, mapping: &TaskMapping) -> anyhow::Result<Vec<SubscriptionHandle>> {
        mapping.specs().iter().map(|spec| self.subscribe(spec)).collect()
    }

    /// Number of subscriptions that still dispatch.
    pub fn active_subscriptions(&self) -> usize {
        let mut subs = self.subscriptions.lock().unwrap_or_else(|e| e.into_inner());
        subs.retain(|s| {
            let active = s.active.load(Ordering::SeqCst);
            if !active {
                tracing::debug!("Dropping subscription {} ({})", s.id, s.kind);
            }
            active
        });
        subs.len()
    }
}

/// Events that can bring new content into place.
fn is_content_event(kind: &EventKind) -> bool {
    match kind {
        EventKind::Create(_) => true,
        EventKind::Modify(ModifyKind::Metadata(_)) => false,
        EventKind::Modify(_) => true,
        EventKind::Any => true,
        EventKind::Remove(_) | EventKind::Access(_) | EventKind::Other => false,
    }
}

fn relative_to_roots(roots: &[PathBuf], path: &Path) -> Option<String> {
    roots.iter().find_map(|root| relative_key(root, path))
}

/// Maps one debounced batch to the tasks to run, each at most once.
///
/// A rename reports both the old and the new path; only paths that still
/// exist are considered for it, so a file renamed away does not rebuild.
fn tasks_for_batch<'a>(
    roots: &[PathBuf],
    subscriptions: &[Subscription],
    events: impl IntoIterator<Item = &'a Event>,
) -> Vec<TaskKind> {
    let mut tasks = BTreeSet::new();

    for event in events {
        if !is_content_event(&event.kind) {
            continue;
        }
        let is_rename = matches!(event.kind, EventKind::Modify(ModifyKind::Name(_)));

        for path in &event.paths {
            if is_rename && !path.exists() {
                continue;
            }
            let Some(key) = relative_to_roots(roots, path) else {
                continue;
            };
            for sub in subscriptions {
                if sub.active.load(Ordering::SeqCst) && sub.globs.is_match(&key) {
                    tasks.insert(sub.kind);
                }
            }
        }
    }

    tasks.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, MetadataKind, RemoveKind, RenameMode};
    use std::fs;
    use tempfile::tempdir;

    fn subs(mapping: &TaskMapping) -> Vec<Subscription> {
        mapping
            .specs()
            .iter()
            .enumerate()
            .map(|(i, spec)| Subscription {
                id: i as u64,
                kind: spec.kind,
                globs: spec.watch_set().unwrap(),
                active: Arc::new(AtomicBool::new(true)),
            })
            .collect()
    }

    fn modified(path: PathBuf) -> Event {
        Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content))).add_path(path)
    }

    #[test]
    fn test_batch_dedupes_tasks() {
        let roots = vec![PathBuf::from("/site/dev")];
        let subs = subs(&TaskMapping::new());
        let events = vec![
            modified(PathBuf::from("/site/dev/src/scss/main.scss")),
            modified(PathBuf::from("/site/dev/src/scss/_vars.scss")),
            modified(PathBuf::from("/site/dev/src/scss/components/_card.scss")),
            modified(PathBuf::from("/site/dev/index.html")),
        ];

        let tasks = tasks_for_batch(&roots, &subs, &events);
        assert_eq!(tasks, vec![TaskKind::Html, TaskKind::Styles]);
    }

    #[test]
    fn test_batch_ignores_removes_and_unmatched() {
        let roots = vec![PathBuf::from("/site/dev")];
        let subs = subs(&TaskMapping::new());
        let events = vec![
            Event::new(EventKind::Remove(RemoveKind::File))
                .add_path(PathBuf::from("/site/dev/index.html")),
            Event::new(EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)))
                .add_path(PathBuf::from("/site/dev/src/js/app.js")),
            modified(PathBuf::from("/site/dev/notes/readme.txt")),
            modified(PathBuf::from("/elsewhere/index.html")),
        ];

        assert!(tasks_for_batch(&roots, &subs, &events).is_empty());
    }

    #[test]
    fn test_batch_skips_cancelled_subscription() {
        let roots = vec![PathBuf::from("/site/dev")];
        let subs = subs(&TaskMapping::new());
        for sub in subs.iter().filter(|s| s.kind == TaskKind::Scripts) {
            sub.active.store(false, Ordering::SeqCst);
        }
        let events = vec![
            Event::new(EventKind::Create(CreateKind::File))
                .add_path(PathBuf::from("/site/dev/src/js/app.js")),
            Event::new(EventKind::Create(CreateKind::File))
                .add_path(PathBuf::from("/site/dev/images/icons/x.svg")),
        ];

        assert_eq!(tasks_for_batch(&roots, &subs, &events), vec![TaskKind::Icons]);
    }

    #[test]
    fn test_rename_into_place_triggers() {
        let dir = tempdir().unwrap();
        let dev = dir.path().join("dev");
        fs::create_dir_all(dev.join("src/json")).unwrap();
        let target = dev.join("src/json/data.json");
        fs::write(&target, "{}").unwrap();

        let subs = subs(&TaskMapping::new());
        let rename = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(dev.join("src/js/old.js"))
            .add_path(target);

        let tasks = tasks_for_batch(&[dev], &subs, &[rename]);
        assert_eq!(tasks, vec![TaskKind::Json]);
    }

    #[tokio::test]
    async fn test_subscription_handles() {
        let dir = tempdir().unwrap();
        let dev = dir.path().join("dev");
        fs::create_dir_all(&dev).unwrap();

        let (tx, _rx) = task_queue();
        let watcher = Watcher::new(&dev, Duration::from_millis(50), tx).unwrap();
        let handles = watcher.subscribe_all(&TaskMapping::new()).unwrap();
        assert_eq!(handles.len(), TaskKind::ALL.len());
        assert_eq!(watcher.active_subscriptions(), TaskKind::ALL.len());

        handles[0].cancel();
        assert!(!handles[0].is_active());
        assert_eq!(watcher.active_subscriptions(), TaskKind::ALL.len() - 1);
    }
}

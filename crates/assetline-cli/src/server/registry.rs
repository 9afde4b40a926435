// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Connected live-reload sessions.

use assetline::ReloadEvent;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

/// Tracks connected browser sessions and fans reload events out to them.
///
/// Shared by `Arc` between the server, which connects sessions, and the
/// task queue, which signals reloads.
#[derive(Debug)]
pub struct SessionRegistry {
    sender: broadcast::Sender<ReloadEvent>,
    sessions: Mutex<HashSet<u64>>,
    next_id: AtomicU64,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            sender,
            sessions: Mutex::new(HashSet::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Registers a session. It is removed again when the returned value drops.
    pub fn connect(self: &Arc<Self>) -> Session {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        // Subscribe before publishing the id so a counted session never misses an event.
        let receiver = self.sender.subscribe();
        self.lock().insert(id);
        tracing::debug!("Session {} connected", id);
        Session {
            id,
            receiver,
            registry: Arc::clone(self),
        }
    }

    /// Sends an event to every connected session, returning how many were reached.
    pub fn notify(&self, event: ReloadEvent) -> usize {
        let reached = self.sender.send(event).unwrap_or(0);
        tracing::debug!("Sent {} to {} session(s)", event, reached);
        reached
    }

    /// Number of connected sessions.
    pub fn session_count(&self) -> usize {
        self.lock().len()
    }

    fn disconnect(&self, id: u64) {
        if self.lock().remove(&id) {
            tracing::debug!("Session {} disconnected", id);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<u64>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// One connected browser.
#[derive(Debug)]
pub struct Session {
    id: u64,
    receiver: broadcast::Receiver<ReloadEvent>,
    registry: Arc<SessionRegistry>,
}

impl Session {
    /// Session id, unique per registry.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Waits for the next reload event.
    ///
    /// A session that fell behind gets a full page reload. The session keeps
    /// its registry alive, so the stream stays open for as long as the
    /// session exists; `None` only reports a closed channel and callers
    /// treat it as the end of the stream.
    pub async fn next_event(&mut self) -> Option<ReloadEvent> {
        match self.receiver.recv().await {
            Ok(event) => Some(event),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!("Session {} lagged by {} event(s)", self.id, skipped);
                Some(ReloadEvent::Page)
            }
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.registry.disconnect(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_and_drop() {
        let registry = Arc::new(SessionRegistry::new());
        let a = registry.connect();
        let b = registry.connect();
        assert_ne!(a.id(), b.id());
        assert_eq!(registry.session_count(), 2);

        drop(a);
        assert_eq!(registry.session_count(), 1);
        drop(b);
        assert_eq!(registry.session_count(), 0);
    }

    #[test]
    fn test_notify_without_sessions() {
        let registry = SessionRegistry::new();
        assert_eq!(registry.notify(ReloadEvent::Page), 0);
    }

    #[tokio::test]
    async fn test_notify_reaches_every_session() {
        let registry = Arc::new(SessionRegistry::new());
        let mut a = registry.connect();
        let mut b = registry.connect();

        assert_eq!(registry.notify(ReloadEvent::Styles), 2);
        assert_eq!(a.next_event().await, Some(ReloadEvent::Styles));
        assert_eq!(b.next_event().await, Some(ReloadEvent::Styles));
    }

    #[tokio::test]
    async fn test_lagged_session_gets_page_reload() {
        let registry = Arc::new(SessionRegistry::new());
        let mut session = registry.connect();
        for _ in 0..CHANNEL_CAPACITY + 1 {
            registry.notify(ReloadEvent::Styles);
        }
        assert_eq!(session.next_event().await, Some(ReloadEvent::Page));
    }

    #[tokio::test]
    async fn test_session_stays_open_without_outside_handles() {
        let registry = Arc::new(SessionRegistry::new());
        let mut session = registry.connect();
        drop(registry);

        let waited = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            session.next_event(),
        )
        .await;
        assert!(waited.is_err(), "stream ended early: {:?}", waited);
    }

    #[tokio::test]
    async fn test_concurrent_connects() {
        let registry = Arc::new(SessionRegistry::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let session = registry.connect();
                registry.notify(ReloadEvent::Page);
                session.id()
            }));
        }
        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap());
        }
        assert_eq!(ids.len(), 16);
        assert_eq!(registry.session_count(), 0);
    }
}

//! Session pool
//!
//! Enforces the resource policy for constrained boards: the active feed
//! is eagerly connected, the next feed in cycle order may be pre-warmed
//! to hide switch latency, and nothing else runs: at most two decode
//! pipelines exist at any moment.

use std::collections::HashMap;

use crate::feeds::FeedRegistry;

use super::backend::BackendFactory;
use super::{SessionConfig, StreamSession};

/// Live sessions keyed by feed index
pub struct SessionPool<F: BackendFactory> {
    factory: F,
    registry: FeedRegistry,
    config: SessionConfig,
    sessions: HashMap<usize, StreamSession>,
}

impl<F: BackendFactory> SessionPool<F> {
    /// Create an empty pool over the given feeds
    pub fn new(factory: F, registry: FeedRegistry, config: SessionConfig) -> Self {
        Self {
            factory,
            registry,
            config,
            sessions: HashMap::new(),
        }
    }

    /// The session for a feed index, if one is live
    pub fn session(&self, index: usize) -> Option<&StreamSession> {
        self.sessions.get(&(index % self.registry.count()))
    }

    /// Number of live sessions
    pub fn live_count(&self) -> usize {
        self.sessions.len()
    }

    /// Reconcile the pool against the wanted set
    ///
    /// Starts the active (and optionally pre-warm) session if missing and
    /// stops everything else. Stopping awaits the session's bounded-time
    /// shutdown so pipeline resources are actually released before a
    /// replacement starts.
    pub async fn retain(&mut self, active: usize, prewarm: Option<usize>) {
        let count = self.registry.count();
        let active = active % count;
        let prewarm = prewarm.map(|i| i % count).filter(|&i| i != active);

        let wanted = |index: usize| index == active || prewarm == Some(index);

        let to_stop: Vec<usize> = self
            .sessions
            .keys()
            .copied()
            .filter(|&i| !wanted(i))
            .collect();
        for index in to_stop {
            if let Some(session) = self.sessions.remove(&index) {
                tracing::debug!(feed = %session.feed().name, index, "stopping session");
                session.shutdown().await;
            }
        }

        for index in [Some(active), prewarm].into_iter().flatten() {
            if !self.sessions.contains_key(&index) {
                let feed = self.registry.get(index).clone();
                tracing::info!(feed = %feed.name, index, "starting session");
                let backend = self.factory.create(&feed);
                self.sessions
                    .insert(index, StreamSession::spawn(index, feed, backend, self.config));
            }
        }
    }

    /// Stop every session and wait for resource release
    pub async fn shutdown(mut self) {
        for (_, session) in self.sessions.drain() {
            session.shutdown().await;
        }
    }
}

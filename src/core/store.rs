// Process-wide cache of the latest market snapshot
//
// Single writer (the streaming client), many readers (independent display
// surfaces). Publication always replaces the whole snapshot reference; the
// published value is never mutated, so readers can hold an Arc across frames
// and compare references to decide whether to recompute a projection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tracing::debug;

use crate::core::snapshot::MarketSnapshot;

type Listener = Box<dyn Fn(&Arc<MarketSnapshot>) + Send + Sync>;

/// Handle returned by `subscribe`, used to unregister the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

pub struct MarketDataStore {
    snapshot: RwLock<Option<Arc<MarketSnapshot>>>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_id: AtomicU64,
}

impl Default for MarketDataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketDataStore {
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(None),
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Latest published snapshot, or None before the first frame. Callers
    /// should render `fallback_snapshot()` while this is None.
    pub fn snapshot(&self) -> Option<Arc<MarketSnapshot>> {
        self.snapshot.read().unwrap().clone()
    }

    /// Register a listener invoked synchronously on every publication, in
    /// subscription order. Listeners must not block and must not call
    /// `subscribe`/`unsubscribe` from inside the callback.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&Arc<MarketSnapshot>) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .unwrap()
            .push((id, Box::new(listener)));
        SubscriptionId(id)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.lock().unwrap().retain(|(lid, _)| *lid != id.0);
    }

    /// Drop every listener registration. Called on stream teardown.
    pub fn clear_subscribers(&self) {
        self.listeners.lock().unwrap().clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }

    /// Replace the current snapshot and fan it out. Single-writer: only the
    /// streaming client calls this.
    pub fn publish(&self, snapshot: MarketSnapshot) {
        let snapshot = Arc::new(snapshot);
        *self.snapshot.write().unwrap() = Some(Arc::clone(&snapshot));

        let listeners = self.listeners.lock().unwrap();
        for (_, listener) in listeners.iter() {
            listener(&snapshot);
        }
    }

    /// Republish the current snapshot flagged stale. Used while the stream is
    /// disconnected so views keep the last good data but can badge it.
    pub fn mark_stale(&self) {
        let current = self.snapshot();
        match current {
            Some(snapshot) if !snapshot.stale => {
                let mut stale = (*snapshot).clone();
                stale.stale = true;
                self.publish(stale);
            }
            _ => debug!("no live snapshot to mark stale"),
        }
    }
}

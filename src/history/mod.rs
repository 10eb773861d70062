//! History synchronization for Lenslate
//!
//! The HistoryStore issues create/patch mutations against a DocumentStore
//! and exposes a live, ordered view of the owner's entries. Views are
//! authoritative-copy-only: every snapshot from the store replaces the
//! previous view wholesale and is re-sorted; local writes are never merged
//! optimistically and become visible only through the next snapshot.

pub mod store;
pub mod types;

pub use store::{DocumentStore, MemoryDocumentStore, SqliteDocumentStore};
pub use types::{sort_view, HistoryEntry, HistoryPatch, NewHistoryEntry};

use std::sync::Arc;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::{Stream, StreamExt};

use crate::error::Result;

/// Live, ordered access to a user's translation history
///
/// Cheap to clone; all clones share the underlying store.
#[derive(Clone)]
pub struct HistoryStore {
    store: Arc<dyn DocumentStore>,
}

impl HistoryStore {
    /// Create a history store over the given document store
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Subscribe to the owner's live history view
    ///
    /// Restartable: a fresh subscription immediately carries the full
    /// current set.
    pub async fn subscribe(&self, owner_id: &str) -> Result<HistorySubscription> {
        let receiver = self.store.watch(owner_id).await?;
        Ok(HistorySubscription { receiver })
    }

    /// Append a new entry; the store assigns id and timestamp
    ///
    /// Fire-and-forget from the pipeline's perspective: errors are
    /// surfaced to the caller but never retried here.
    pub async fn append(&self, owner_id: &str, entry: NewHistoryEntry) -> Result<String> {
        self.store.create(owner_id, entry).await
    }

    /// Patch an entry's favorite flag and/or notes
    ///
    /// Errors are surfaced, not retried. Concurrent patches to different
    /// ids carry no ordering guarantee; the store's snapshots are the
    /// source of truth.
    pub async fn patch(&self, owner_id: &str, id: &str, patch: HistoryPatch) -> Result<()> {
        if patch.is_empty() {
            tracing::debug!(id = %id, "Skipping empty history patch");
            return Ok(());
        }
        self.store.update(owner_id, id, patch).await
    }
}

/// A live subscription to one owner's history view
///
/// Every delivered snapshot is re-sorted descending by creation time, with
/// timestamp-less entries last.
pub struct HistorySubscription {
    receiver: watch::Receiver<Vec<HistoryEntry>>,
}

impl HistorySubscription {
    /// The current view, sorted
    pub fn current(&self) -> Vec<HistoryEntry> {
        let mut view = self.receiver.borrow().clone();
        sort_view(&mut view);
        view
    }

    /// Wait for the next snapshot and return the re-sorted view
    ///
    /// Returns `None` once the store side has gone away.
    pub async fn next_view(&mut self) -> Option<Vec<HistoryEntry>> {
        self.receiver.changed().await.ok()?;
        Some(self.current())
    }

    /// Consume the subscription as an unbounded stream of sorted views
    ///
    /// The first item is the current view; subsequent items follow store
    /// mutations.
    pub fn into_stream(self) -> impl Stream<Item = Vec<HistoryEntry>> {
        WatchStream::new(self.receiver).map(|mut view| {
            sort_view(&mut view);
            view
        })
    }
}

//! Per-list cache of the latest subscription snapshot
//!
//! The subscription feed is the single source of truth: every push replaces the
//! cached items wholesale, and consumers rebuild their views from the cache.
//! The reconciler mutes the change notifications while a save is in flight (so
//! the UI does not flash half-reordered state) without ever blocking the
//! snapshots themselves, which its uid-recovery poll reads.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::item::{EntityId, TodoItem, TodoItemWithEntity};

/// See [`ListStore::updates`]
pub type UpdateReceiver = tokio::sync::watch::Receiver<u64>;

/// Holds the last-seen items of every subscribed list.
///
/// Owned behind an `Arc` by whoever holds the subscriptions; everyone else only
/// reads snapshots and listens for update notifications.
pub struct ListStore {
    lists: Mutex<HashMap<EntityId, Vec<TodoItem>>>,
    muted: AtomicBool,
    update_tx: tokio::sync::watch::Sender<u64>,
    update_rx: tokio::sync::watch::Receiver<u64>,
}

impl ListStore {
    pub fn new() -> Self {
        let (update_tx, update_rx) = tokio::sync::watch::channel(0);
        Self {
            lists: Mutex::new(HashMap::new()),
            muted: AtomicBool::new(false),
            update_tx,
            update_rx,
        }
    }

    /// Record a subscription push for `list`.
    ///
    /// The snapshot always replaces the cached one; the re-render notification
    /// is skipped while the store is muted.
    pub fn apply_push(&self, list: &EntityId, items: Vec<TodoItem>) {
        log::trace!("Subscription push for {}: {} items", list, items.len());
        self.lists.lock().unwrap().insert(list.clone(), items);
        if self.muted.load(Ordering::SeqCst) == false {
            self.notify();
        }
    }

    /// The latest snapshot of `list` (empty if never pushed), tagged with the
    /// owning list so downstream grouping code knows where each item lives.
    pub fn snapshot(&self, list: &EntityId) -> Vec<TodoItemWithEntity> {
        self.lists
            .lock()
            .unwrap()
            .get(list)
            .map(|items| {
                items
                    .iter()
                    .map(|item| TodoItemWithEntity::new(list.clone(), item.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Suppress re-render notifications (snapshots keep updating)
    pub fn mute(&self) {
        self.muted.store(true, Ordering::SeqCst);
    }

    /// Resume notifications, and deliver one for whatever arrived while muted
    pub fn unmute(&self) {
        self.muted.store(false, Ordering::SeqCst);
        self.notify();
    }

    /// A channel that ticks on every un-muted push. Use
    /// [`UpdateReceiver::changed`] to await the next re-render trigger.
    pub fn updates(&self) -> UpdateReceiver {
        self.update_rx.clone()
    }

    fn notify(&self) {
        self.update_tx.send_modify(|generation| *generation += 1);
    }
}

impl Default for ListStore {
    fn default() -> Self {
        Self::new()
    }
}

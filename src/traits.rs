//! The host-facing seams of this crate
//!
//! None of the mutation calls return the mutated item: the host only confirms
//! changes through the next subscription push (see [`crate::store`]). This is
//! why the reconciler has to poll snapshots to recover host-assigned uids.

use std::error::Error;

use async_trait::async_trait;
use bitflags::bitflags;

use crate::item::{EntityId, NewTodo, TodoItem, TodoItemWithEntity};

bitflags! {
    /// Per-list feature bits advertised by the host.
    ///
    /// Only [`ListCapabilities::DUE_DATETIME`] changes this engine's behavior
    /// (see [`crate::due::apply_due_timestamp`]); the other bits are carried so
    /// that consumers can gate their own UI affordances on them.
    pub struct ListCapabilities: u32 {
        const CREATE_ITEM  = 1;
        const DELETE_ITEM  = 2;
        const UPDATE_ITEM  = 4;
        const MOVE_ITEM    = 8;
        /// The list can store a date-only due value
        const DUE_DATE     = 16;
        /// The list can store a due value with time-of-day precision
        const DUE_DATETIME = 32;
        const DESCRIPTION  = 64;
    }
}

/// The host's todo mutation API.
///
/// All calls are asynchronous and fire-and-forget from the data's point of
/// view: a successful return only means the host accepted the call, and the
/// authoritative result arrives via the subscription feed.
#[async_trait]
pub trait TodoHost {
    /// Update an existing item in place (rename, status, description, due)
    async fn update_item(&self, list: &EntityId, item: &TodoItem) -> Result<(), Box<dyn Error>>;

    /// Create a new item. The host assigns the uid; it is only observable
    /// through a later subscription push.
    async fn create_item(&self, list: &EntityId, fields: &NewTodo) -> Result<(), Box<dyn Error>>;

    /// Delete items by uid
    async fn delete_items(&self, list: &EntityId, uids: &[String]) -> Result<(), Box<dyn Error>>;

    /// Reorder an item to sit immediately after `previous_uid`, or first in the
    /// list when `previous_uid` is `None`
    async fn move_item(
        &self,
        list: &EntityId,
        uid: &str,
        previous_uid: Option<&str>,
    ) -> Result<(), Box<dyn Error>>;

    /// The feature bits the given list advertises
    fn capabilities(&self, list: &EntityId) -> ListCapabilities;

    /// Record a completion event on the host's event bus, for automations and
    /// history sensors. Must be invoked exactly once per completion.
    async fn fire_completion_event(&self, item: &TodoItemWithEntity) -> Result<(), Box<dyn Error>>;
}

/// A generic "show this message to the user" channel, used only by the
/// top-level reconciliation entry points when an operation fails.
#[async_trait]
pub trait NotificationSink {
    async fn notify(&self, message: &str);
}

/// A sink that only logs. Useful for consumers that have no notification UI.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn notify(&self, message: &str) {
        log::error!("{}", message);
    }
}

//! This crate is the scheduling and reconciliation core behind a family of
//! home-automation dashboard todo widgets.
//!
//! The host owns the todo lists and pushes item snapshots over a subscription
//! feed; this crate classifies items into day buckets and urgency states
//! ([`sections`], [`due`]), computes candidate snooze dates around a recurring
//! calendar blackout window ([`target_days`]), and executes drag-and-drop
//! intents against the host's mutation API ([`reconciler`]). \
//! Because none of the host's mutation calls return the mutated item, all
//! confirmation flows back through the subscription feed (cached in a
//! [`ListStore`](store::ListStore)); the reconciler polls that cache to
//! recover host-assigned uids when an item is recreated in another list.
//!
//! Rendering, gesture capture, and the transport behind the host traits are
//! deliberately out of scope.

pub mod traits;

pub mod item;
pub use item::{EntityId, NewTodo, TodoItem, TodoItemWithEntity, TodoStatus};
pub mod metadata;
pub use metadata::ItemMetadata;
pub mod due;
pub mod actions;
pub mod target_days;
pub mod sections;
pub mod history;
pub mod store;
pub use store::ListStore;
pub mod reconciler;
pub use reconciler::{Placement, Reconciler, UpdateIntent};

pub mod bindings;
pub mod coordinator;
pub mod clock;
pub mod config;
pub mod mock_host;

//! Applying a requested change-set to a todo item

use chrono::{DateTime, Local};

use crate::due::{apply_due_timestamp, is_snoozed_later_today};
use crate::item::{TodoItem, TodoItemWithEntity, TodoStatus};
use crate::metadata::ItemMetadata;
use crate::traits::ListCapabilities;

/// A requested change-set. Fields left as `None` are not touched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TodoActions {
    pub status: Option<TodoStatus>,
    pub due: Option<DateTime<Local>>,
    pub urgent: Option<bool>,
}

/// The outcome of [`apply_todo_actions`]: the fully resolved item, plus whether
/// the change-set completed the item (in which case the caller must fire the
/// host's completion event, exactly once).
#[derive(Clone, Debug, PartialEq)]
pub struct AppliedActions {
    pub item: TodoItemWithEntity,
    pub completed: bool,
}

/// True iff the item carries the urgent metadata flag and still needs action.
/// Completed items are never urgent, whatever their metadata says.
pub fn is_urgent(item: &TodoItem) -> bool {
    if item.status.is_completed() {
        return false;
    }
    ItemMetadata::parse(item.description.as_deref())
        .urgent
        .unwrap_or(false)
}

/// Returns an updated copy of `item` with `actions` applied.
///
/// The rules run in a fixed order:
/// 1. a status equal to the current one is dropped (no redundant host calls);
/// 2. completing without an explicit due stamps `due = now` (the completion
///    time, consumed by history sensors);
/// 3. the status is applied;
/// 4. a requested (or rule-2) due runs through the due codec;
/// 5. an item snoozed to later today is forced urgent, even over an explicit
///    `urgent: false` in the same change-set;
/// 6. the resulting urgency is written into metadata;
/// 7. a completion transition is reported back through
///    [`AppliedActions::completed`].
///
/// The input is never mutated.
pub fn apply_todo_actions(
    capabilities: ListCapabilities,
    item: &TodoItemWithEntity,
    actions: &TodoActions,
    now: DateTime<Local>,
) -> AppliedActions {
    let mut actions = actions.clone();
    if actions.status == Some(item.todo.status) {
        actions.status = None;
    }

    // Record the completion time, unless we're explicitly completing at a
    // specific instant
    if actions.status == Some(TodoStatus::Completed) && actions.due.is_none() {
        actions.due = Some(now);
    }

    let mut updated = item.clone();
    if let Some(status) = actions.status {
        updated.todo.status = status;
    }
    if let Some(due) = actions.due {
        updated = apply_due_timestamp(capabilities, &updated, due);
    }
    // Any same-day snooze is urgent by policy; there is deliberately no opt-out
    if is_snoozed_later_today(&updated.todo, now) {
        actions.urgent = Some(true);
    }
    if let Some(urgent) = actions.urgent {
        updated.todo.description = Some(ItemMetadata::update(
            updated.todo.description.as_deref(),
            |meta| meta.urgent = Some(urgent),
        ));
    }

    AppliedActions {
        item: updated,
        completed: actions.status == Some(TodoStatus::Completed),
    }
}

//! Todo items, as pushed by the host's subscription feed

use serde::{Deserialize, Serialize};

/// The identifier of a todo list entity (e.g. `todo.kitchen`).
///
/// This is an opaque key assigned by the host; this crate never parses it.
pub type EntityId = String;

/// The host models completion as a two-state status string.
///
/// Overdue-ness and urgency are *not* part of the status: they are derived from
/// the due timestamp and the metadata blob (see [`crate::due`] and [`crate::metadata`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TodoStatus {
    #[serde(rename = "needs_action")]
    NeedsAction,
    #[serde(rename = "completed")]
    Completed,
}

impl TodoStatus {
    pub fn is_completed(&self) -> bool {
        match self {
            TodoStatus::Completed => true,
            _ => false,
        }
    }
}

/// A single todo item, exactly as the host serializes it.
///
/// * `uid` is assigned by the host; an empty string denotes an item that has not
///   been created yet. Clients must never invent a uid themselves.
/// * `due` may be a date-only string (`YYYY-MM-DD`) or a full timestamp
///   (contains a `T`), depending on the owning list's capabilities.
/// * `description` doubles as a metadata side channel, see [`crate::metadata`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TodoItem {
    pub uid: String,
    pub summary: String,
    pub status: TodoStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
}

impl TodoItem {
    /// A brand new item that exists client-side only. The host will assign the
    /// real uid once the item shows up in a subscription push.
    pub fn new(summary: String) -> Self {
        Self {
            uid: String::new(),
            summary,
            status: TodoStatus::NeedsAction,
            description: None,
            due: None,
        }
    }

    /// Whether the host has confirmed this item yet
    pub fn is_created(&self) -> bool {
        self.uid.is_empty() == false
    }
}

/// A [`TodoItem`] together with the list that owns it.
///
/// Exactly one list owns an item at a time. "Moving" an item to another list is
/// a delete+create pair, never an in-place `entity_id` change: the host has no
/// cross-list move primitive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TodoItemWithEntity {
    #[serde(rename = "entityId")]
    pub entity_id: EntityId,
    #[serde(flatten)]
    pub todo: TodoItem,
}

impl TodoItemWithEntity {
    pub fn new(entity_id: EntityId, todo: TodoItem) -> Self {
        Self { entity_id, todo }
    }

    pub fn uid(&self) -> &str { &self.todo.uid }
    pub fn summary(&self) -> &str { &self.todo.summary }
    pub fn status(&self) -> TodoStatus { self.todo.status }
}

/// The fields a create call may carry. The host refuses to create items that
/// are already completed, hence no `status` here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewTodo {
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
}

impl From<&TodoItem> for NewTodo {
    fn from(item: &TodoItem) -> Self {
        Self {
            summary: item.summary.clone(),
            description: item.description.clone(),
            due: item.due.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_round_trip_keeps_wire_names() {
        let item = TodoItemWithEntity::new(
            "todo.kitchen".to_string(),
            TodoItem {
                uid: "42".to_string(),
                summary: "Buy milk".to_string(),
                status: TodoStatus::NeedsAction,
                description: None,
                due: Some("2024-03-10".to_string()),
            },
        );

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["status"], "needs_action");
        assert_eq!(json["entityId"], "todo.kitchen");
        // The inner item is flattened, not nested
        assert_eq!(json["summary"], "Buy milk");
        assert!(json.get("todo").is_none());

        let back: TodoItemWithEntity = serde_json::from_value(json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn empty_uid_means_not_created() {
        assert!(TodoItem::new("New task".to_string()).is_created() == false);
    }
}

//! Indexing past completions
//!
//! Maps a caller-chosen key (usually the summary) to the most recent item of
//! that key completed before today. Consumers use this to show "last done"
//! hints next to template thumbnails.

use std::collections::HashMap;

use chrono::{DateTime, Local};

use crate::due::compute_due_timestamp;
use crate::item::TodoItem;

/// Build the index from a list snapshot.
///
/// Only items whose due timestamp falls on a day before today participate;
/// among those sharing a key, the most recent wins. Items the key extractor
/// rejects are skipped.
pub fn history_index<K>(
    items: &[TodoItem],
    key: K,
    now: DateTime<Local>,
) -> HashMap<String, TodoItem>
where
    K: Fn(&TodoItem) -> Option<String>,
{
    let today = now.date_naive();

    let mut past: Vec<&TodoItem> = items
        .iter()
        .filter(|item| {
            compute_due_timestamp(item).map_or(false, |due| due.date_naive() < today)
        })
        .collect();
    // Most recent first; due strings are ISO-ordered so the string sort is
    // already chronological
    past.sort_by(|a, b| b.due.cmp(&a.due));

    let mut index = HashMap::new();
    for item in past {
        if let Some(key) = key(item) {
            index.entry(key).or_insert_with(|| item.clone());
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::TodoStatus;
    use chrono::{NaiveDate, TimeZone};

    fn item(summary: &str, due: Option<&str>) -> TodoItem {
        TodoItem {
            uid: format!("uid-{}-{}", summary, due.unwrap_or("none")),
            summary: summary.to_string(),
            status: TodoStatus::Completed,
            description: None,
            due: due.map(str::to_string),
        }
    }

    fn monday_noon() -> DateTime<Local> {
        Local
            .from_local_datetime(
                &NaiveDate::from_ymd_opt(2024, 4, 22)
                    .unwrap()
                    .and_hms_opt(12, 0, 0)
                    .unwrap(),
            )
            .earliest()
            .unwrap()
    }

    #[test]
    fn most_recent_past_item_wins_per_key() {
        let items = vec![
            item("Mop floors", Some("2024-04-10T09:00:00")),
            item("Mop floors", Some("2024-04-18T09:00:00")),
            item("Water plants", Some("2024-04-15T09:00:00")),
            // Today and the future never participate
            item("Mop floors", Some("2024-04-22T09:00:00")),
            item("Water plants", Some("2024-04-25T09:00:00")),
            // No due, no index entry
            item("Dust shelves", None),
        ];

        let index = history_index(&items, |item| Some(item.summary.clone()), monday_noon());

        assert_eq!(index.len(), 2);
        assert_eq!(
            index["Mop floors"].due.as_deref(),
            Some("2024-04-18T09:00:00")
        );
        assert_eq!(
            index["Water plants"].due.as_deref(),
            Some("2024-04-15T09:00:00")
        );
    }

    #[test]
    fn rejected_keys_are_skipped() {
        let items = vec![item("Mop floors", Some("2024-04-18T09:00:00"))];
        let index = history_index(&items, |_| None, monday_noon());
        assert!(index.is_empty());
    }
}

//! Translating between logical due timestamps and the host's due field
//!
//! Lists that lack time-of-day precision get the date part in `due` and the
//! time part in the metadata blob's `dueTime` key; this module hides that split
//! from the rest of the crate.

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone};

use crate::actions::is_urgent;
use crate::item::{TodoItem, TodoItemWithEntity};
use crate::metadata::ItemMetadata;
use crate::traits::ListCapabilities;

/// Resolve a wall-clock time in the local timezone.
/// Times that fall inside a DST gap are pushed forward by an hour.
pub(crate) fn resolve_local(naive: NaiveDateTime) -> Option<DateTime<Local>> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(instant) => Some(instant),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => Local
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest(),
    }
}

fn parse_wall_time(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .ok()
}

fn parse_full_timestamp(due: &str) -> Option<DateTime<Local>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(due) {
        return Some(instant.with_timezone(&Local));
    }
    // Some hosts omit the offset; such timestamps are local wall-clock time
    let naive = NaiveDateTime::parse_from_str(due, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(due, "%Y-%m-%dT%H:%M"))
        .ok()?;
    resolve_local(naive)
}

/// Resolves an item's logical due timestamp, reading the metadata side channel
/// if necessary.
///
/// Returns `None` when the item has no due value (or an unparseable one).
/// A bare `YYYY-MM-DD` resolves to local midnight, never UTC midnight, so a
/// date-only due never drifts into the neighboring day.
pub fn compute_due_timestamp(item: &TodoItem) -> Option<DateTime<Local>> {
    let due = item.due.as_deref()?;
    if due.contains('T') {
        return parse_full_timestamp(due);
    }

    let date = NaiveDate::parse_from_str(due, "%Y-%m-%d").ok()?;
    let meta = ItemMetadata::parse(item.description.as_deref());
    if let Some(time) = meta.due_time.as_deref().and_then(parse_wall_time) {
        return resolve_local(date.and_time(time));
    }
    resolve_local(date.and_hms_opt(0, 0, 0)?)
}

/// Returns a copy of `item` with its due field set to `due`.
///
/// When the owning list supports datetime precision the full timestamp goes
/// into `due`. Otherwise `due` keeps only the date and the time moves into the
/// metadata blob, merging with (never clobbering) whatever else is stored there.
pub fn apply_due_timestamp(
    capabilities: ListCapabilities,
    item: &TodoItemWithEntity,
    due: DateTime<Local>,
) -> TodoItemWithEntity {
    let mut updated = item.clone();
    if capabilities.contains(ListCapabilities::DUE_DATETIME) {
        updated.todo.due = Some(due.to_rfc3339_opts(SecondsFormat::Secs, false));
    } else {
        updated.todo.due = Some(due.format("%Y-%m-%d").to_string());
        updated.todo.description = Some(ItemMetadata::update(
            item.todo.description.as_deref(),
            |meta| meta.due_time = Some(due.format("%H:%M:%S").to_string()),
        ));
    }
    updated
}

/// True iff the item's due timestamp lies strictly between `now` and the end of
/// the current local day (23:59:59.999).
pub fn is_snoozed_later_today(item: &TodoItem, now: DateTime<Local>) -> bool {
    let due = match compute_due_timestamp(item) {
        None => return false,
        Some(due) => due,
    };
    let end_of_day = now
        .date_naive()
        .and_hms_milli_opt(23, 59, 59, 999)
        .and_then(resolve_local);
    match end_of_day {
        None => false,
        Some(end_of_day) => due > now && due < end_of_day,
    }
}

/// Whether a todo item should currently be shown as a popup card.
///
/// Completed items are never shown; snoozed items appear only once their due
/// timestamp has elapsed; and `urgent_only` views hide everything that is not
/// flagged urgent.
pub fn should_show_todo_card(item: &TodoItem, urgent_only: bool, now: DateTime<Local>) -> bool {
    if item.status.is_completed() {
        return false;
    }
    if urgent_only && is_urgent(item) == false {
        return false;
    }
    match compute_due_timestamp(item) {
        None => true,
        Some(due) => due <= now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{TodoItem, TodoStatus};

    fn item_with_due(due: Option<&str>, description: Option<&str>) -> TodoItem {
        TodoItem {
            uid: "1".to_string(),
            summary: "Water plants".to_string(),
            status: TodoStatus::NeedsAction,
            description: description.map(str::to_string),
            due: due.map(str::to_string),
        }
    }

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Local> {
        resolve_local(
            NaiveDate::from_ymd_opt(y, mo, d)
                .unwrap()
                .and_hms_opt(h, mi, s)
                .unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn no_due_means_no_timestamp() {
        assert_eq!(compute_due_timestamp(&item_with_due(None, None)), None);
    }

    #[test]
    fn bare_date_resolves_to_local_midnight() {
        let due = compute_due_timestamp(&item_with_due(Some("2024-03-10"), None)).unwrap();
        assert_eq!(due, local(2024, 3, 10, 0, 0, 0));
        // No day drift: formatting back as a date gives the original string
        assert_eq!(due.format("%Y-%m-%d").to_string(), "2024-03-10");
    }

    #[test]
    fn bare_date_with_metadata_time() {
        let item = item_with_due(Some("2024-03-10"), Some(r#"{"dueTime":"14:30:00"}"#));
        assert_eq!(compute_due_timestamp(&item).unwrap(), local(2024, 3, 10, 14, 30, 0));
    }

    #[test]
    fn malformed_metadata_falls_back_to_midnight() {
        let item = item_with_due(Some("2024-03-10"), Some("oops"));
        assert_eq!(compute_due_timestamp(&item).unwrap(), local(2024, 3, 10, 0, 0, 0));
    }

    #[test]
    fn full_timestamp_wins_over_metadata() {
        let item = item_with_due(
            Some("2024-03-10T09:15:00"),
            Some(r#"{"dueTime":"23:00:00"}"#),
        );
        assert_eq!(compute_due_timestamp(&item).unwrap(), local(2024, 3, 10, 9, 15, 0));
    }

    #[test]
    fn apply_round_trips_with_datetime_capability() {
        let item = TodoItemWithEntity::new("todo.kitchen".to_string(), item_with_due(None, None));
        let due = local(2024, 3, 10, 23, 0, 0);

        let updated = apply_due_timestamp(ListCapabilities::DUE_DATETIME, &item, due);
        assert!(updated.todo.due.as_ref().unwrap().contains('T'));
        assert_eq!(compute_due_timestamp(&updated.todo).unwrap(), due);
    }

    #[test]
    fn apply_splits_time_into_metadata_without_datetime_capability() {
        let item = TodoItemWithEntity::new(
            "todo.kitchen".to_string(),
            item_with_due(None, Some(r#"{"emoji":"🌱"}"#)),
        );
        let due = local(2024, 3, 10, 23, 0, 0);

        let updated = apply_due_timestamp(ListCapabilities::empty(), &item, due);
        assert_eq!(updated.todo.due.as_deref(), Some("2024-03-10"));

        let meta = ItemMetadata::parse(updated.todo.description.as_deref());
        assert_eq!(meta.due_time.as_deref(), Some("23:00:00"));
        // Existing metadata keys are merged, not replaced
        assert_eq!(meta.emoji.as_deref(), Some("🌱"));

        // The wall-clock time still reconstructs exactly
        assert_eq!(compute_due_timestamp(&updated.todo).unwrap(), due);
    }

    #[test]
    fn day_boundary_round_trips_without_drift() {
        let item = TodoItemWithEntity::new("todo.kitchen".to_string(), item_with_due(None, None));
        let midnight = local(2024, 6, 1, 0, 0, 0);

        for caps in [ListCapabilities::DUE_DATETIME, ListCapabilities::empty()].iter() {
            let updated = apply_due_timestamp(*caps, &item, midnight);
            let back = compute_due_timestamp(&updated.todo).unwrap();
            assert_eq!(back.date_naive(), midnight.date_naive());
            assert_eq!(back, midnight);
        }
    }

    #[test]
    fn snoozed_later_today_is_a_strict_window() {
        let now = local(2024, 3, 10, 12, 0, 0);

        let later_today = item_with_due(Some("2024-03-10T23:00:00"), None);
        assert!(is_snoozed_later_today(&later_today, now));

        let earlier_today = item_with_due(Some("2024-03-10T08:00:00"), None);
        assert!(is_snoozed_later_today(&earlier_today, now) == false);

        let tomorrow = item_with_due(Some("2024-03-11T08:00:00"), None);
        assert!(is_snoozed_later_today(&tomorrow, now) == false);

        let no_due = item_with_due(None, None);
        assert!(is_snoozed_later_today(&no_due, now) == false);
    }

    #[test]
    fn visibility_honors_snooze_and_urgency() {
        let now = local(2024, 3, 10, 12, 0, 0);

        let mut item = item_with_due(Some("2024-03-09"), Some(r#"{"urgent":false}"#));
        assert!(should_show_todo_card(&item, false, now));
        // Past due but not urgent: excluded from an urgent-only view
        assert!(should_show_todo_card(&item, true, now) == false);

        item.description = Some(r#"{"urgent":true}"#.to_string());
        assert!(should_show_todo_card(&item, true, now));

        // A future snooze hides the card until it elapses
        item.due = Some("2024-03-10T18:00:00".to_string());
        assert!(should_show_todo_card(&item, false, now) == false);

        // No due date at all: always visible
        item.due = None;
        assert!(should_show_todo_card(&item, false, now));

        item.status = TodoStatus::Completed;
        assert!(should_show_todo_card(&item, false, now) == false);
        assert!(should_show_todo_card(&item, true, now) == false);
    }
}

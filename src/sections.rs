//! Partitioning list snapshots into the board's drop-target buckets
//!
//! Grouping is a pure function of (items, target days, now); the only state a
//! consumer keeps between pushes is the identity strings exposed by
//! [`BoardView`], which exist to avoid recreating drag surfaces mid-animation.

use chrono::{DateTime, Datelike, Days, Local, NaiveDate};

use crate::due::{compute_due_timestamp, resolve_local};
use crate::item::{TodoItemWithEntity, TodoStatus};
use crate::metadata::ItemMetadata;
use crate::target_days::DateOption;

/// One drop-target bucket (e.g. "Tuesday", "Done Today")
#[derive(Clone, Debug, PartialEq)]
pub struct DaySection {
    pub date: DateTime<Local>,
    pub label: String,
    /// The status applied to items dropped here
    pub status: TodoStatus,
    pub items: Vec<TodoItemWithEntity>,
    pub empty_message: String,
}

/// A board column: one section, or two stacked sections sharing a date
/// ("Done Today" above "Today")
pub type DayColumn = Vec<DaySection>;

/// An entry of the template panel: a caption row or a draggable item
#[derive(Clone, Debug, PartialEq)]
pub enum TemplateEntry {
    Header(String),
    Item(TodoItemWithEntity),
}

fn start_of_day(day: NaiveDate) -> Option<DateTime<Local>> {
    resolve_local(day.and_hms_opt(0, 0, 0)?)
}

/// The day an item belongs to for bucketing purposes. Items without a resolved
/// due timestamp count as "today" (completion without a recorded time is only
/// a transient state, see the action applier).
fn due_day(item: &TodoItemWithEntity, today: NaiveDate) -> NaiveDate {
    compute_due_timestamp(&item.todo)
        .map(|due| due.date_naive())
        .unwrap_or(today)
}

/// Partition the main list across past-day, today, and upcoming-target buckets.
pub fn group_days(
    items: &[TodoItemWithEntity],
    target_days: &[DateOption],
    now: DateTime<Local>,
) -> Vec<DayColumn> {
    let today = now.date_naive();
    let week_start = today - Days::new(u64::from(today.weekday().num_days_from_sunday()));
    let mut columns = Vec::new();

    // Past days of this week, as drop targets for back-dated completions
    let mut day = week_start;
    while day != today {
        if let Some(date) = start_of_day(day) {
            columns.push(vec![DaySection {
                date,
                label: date.format("%A").to_string(),
                status: TodoStatus::Completed,
                items: items
                    .iter()
                    .filter(|item| item.status().is_completed() && due_day(item, today) == day)
                    .cloned()
                    .collect(),
                empty_message: "Drop completed todos here".to_string(),
            }]);
        }
        day = day + Days::new(1);
    }

    // Today is two stacked buckets: done, and pending (due today or overdue)
    if let Some(date) = start_of_day(today) {
        columns.push(vec![
            DaySection {
                date,
                label: "Done Today".to_string(),
                status: TodoStatus::Completed,
                items: items
                    .iter()
                    .filter(|item| item.status().is_completed() && due_day(item, today) == today)
                    .cloned()
                    .collect(),
                empty_message: "Drop completed todos here".to_string(),
            },
            DaySection {
                date,
                label: "Today".to_string(),
                status: TodoStatus::NeedsAction,
                items: items
                    .iter()
                    .filter(|item| {
                        item.status() == TodoStatus::NeedsAction && due_day(item, today) <= today
                    })
                    .cloned()
                    .collect(),
                empty_message: "Drop today's tasks items here".to_string(),
            },
        ]);
    }

    // Snooze targets, limited to the remainder of the current week
    let week_end = week_start + Days::new(7);
    for option in target_days {
        let option_day = option.date.date_naive();
        if option_day >= week_end {
            continue;
        }
        columns.push(vec![DaySection {
            date: option.date,
            label: option.label.clone(),
            status: TodoStatus::NeedsAction,
            items: items
                .iter()
                .filter(|item| due_day(item, today) == option_day)
                .cloned()
                .collect(),
            empty_message: "Drop todos here to snooze".to_string(),
        }]);
    }

    columns
}

/// Filter the due-less long-term list for display.
///
/// NeedsAction items are always kept. Completed items stay visible through the
/// day they were completed (so the completion can still be undone), then drop
/// out; completed items with no recorded completion time drop out immediately.
pub fn filter_long_term(
    items: &[TodoItemWithEntity],
    now: DateTime<Local>,
) -> Vec<TodoItemWithEntity> {
    let today = match start_of_day(now.date_naive()) {
        None => return items.to_vec(),
        Some(today) => today,
    };
    items
        .iter()
        .filter(|item| {
            item.status() == TodoStatus::NeedsAction
                || compute_due_timestamp(&item.todo).map_or(false, |due| due > today)
        })
        .cloned()
        .collect()
}

fn category_of(item: &TodoItemWithEntity) -> String {
    ItemMetadata::parse(item.todo.description.as_deref())
        .category
        .unwrap_or_else(|| "Other".to_string())
}

/// Group template items by their metadata category.
///
/// A single category renders flat; multiple categories get caption rows.
/// Completed templates are never shown.
pub fn group_templates(templates: &[TodoItemWithEntity]) -> Vec<TemplateEntry> {
    let mut groups: Vec<(String, Vec<TodoItemWithEntity>)> = Vec::new();
    for item in templates {
        if item.status() != TodoStatus::NeedsAction {
            continue;
        }
        let category = category_of(item);
        match groups.iter_mut().find(|(name, _)| name == &category) {
            Some((_, members)) => members.push(item.clone()),
            None => groups.push((category, vec![item.clone()])),
        }
    }

    if groups.len() == 1 {
        let (_, members) = groups.remove(0);
        return members.into_iter().map(TemplateEntry::Item).collect();
    }
    groups
        .into_iter()
        .flat_map(|(name, members)| {
            std::iter::once(TemplateEntry::Header(name))
                .chain(members.into_iter().map(TemplateEntry::Item))
        })
        .collect()
}

/// Everything the board renders, computed in one pass over the current
/// snapshots. The `*_hash`/`*_version` strings are drag-surface identities:
/// when they change, the consumer recreates the corresponding drag DOM.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoardView {
    pub day_columns: Vec<DayColumn>,
    pub long_term: Vec<TodoItemWithEntity>,
    pub templates: Vec<TemplateEntry>,
    /// Changes when long-term items are added, removed, or reordered, but not
    /// when one is merely checked off, so the checkbox animation survives
    pub long_term_render_hash: String,
    /// Changes when any visible item count changes, to clear stale drag clones
    /// of template items
    pub template_version: String,
}

impl BoardView {
    pub fn compute(
        target_list: &[TodoItemWithEntity],
        full_long_term: &[TodoItemWithEntity],
        template_list: &[TodoItemWithEntity],
        target_days: &[DateOption],
        now: DateTime<Local>,
    ) -> Self {
        let day_columns = group_days(target_list, target_days, now);
        let long_term = filter_long_term(full_long_term, now);
        let templates = group_templates(template_list);

        let long_term_render_hash = long_term
            .iter()
            .map(|item| item.uid())
            .collect::<Vec<_>>()
            .join(",");
        let visible: usize = day_columns
            .iter()
            .flat_map(|column| column.iter())
            .map(|section| section.items.len())
            .sum();
        let template_version = format!("{}-{}", visible, long_term.len());

        Self { day_columns, long_term, templates, long_term_render_hash, template_version }
    }
}

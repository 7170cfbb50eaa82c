//! Candidate snooze dates around the recurring calendar blackout window
//!
//! The generator is a pure function of its input signals and "now". It has no
//! timer of its own: consumers recompute whenever the bound entities change
//! (see [`crate::bindings`]), which the host pushes for the time-sensitive
//! calendar sensors anyway.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveTime, Weekday};

use crate::due::resolve_local;

/// Hour of day (local) that day-granular snooze targets resolve to
const MORNING_HOUR: u32 = 8;

/// External calendar/config signals feeding the generator.
///
/// `is_eve` and the two boundary dates come from the host's religious-calendar
/// integration; the time option lists come from two list-like configuration
/// entities and are concatenated.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EveSignals {
    /// Whether "now" is inside the eve period (blackout window)
    pub is_eve: bool,
    /// The upcoming eve day
    pub erev_date: Option<NaiveDate>,
    /// The first day after the blackout window ends
    pub motzei_date: Option<NaiveDate>,
    pub snooze_times_primary: Vec<String>,
    pub snooze_times_extra: Vec<String>,
}

/// A selectable day/time target
#[derive(Clone, Debug, PartialEq)]
pub struct DateOption {
    pub label: String,
    pub date: DateTime<Local>,
}

/// A quick-pick entry: either a single target or a labeled submenu of targets
#[derive(Clone, Debug, PartialEq)]
pub enum QuickOption {
    Single(DateOption),
    Menu { label: String, options: Vec<DateOption> },
}

/// The generator's output: a short quick-pick row plus the full-week submenu
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TargetDays {
    pub quick_options: Vec<QuickOption>,
    pub full_week: Vec<DateOption>,
}

impl TargetDays {
    pub fn compute(signals: &EveSignals, now: DateTime<Local>) -> Self {
        Self {
            quick_options: compute_quick_options(signals, now),
            full_week: compute_full_week(signals, now),
        }
    }
}

fn motzei_label(signals: &EveSignals) -> String {
    let kind = match signals.motzei_date.map(|date| date.weekday()) {
        Some(Weekday::Sat) => "שבת",
        _ => "יום טוב",
    };
    format!("מוצאי {}", kind)
}

fn day_at_morning(day: NaiveDate) -> Option<DateTime<Local>> {
    resolve_local(day.and_hms_opt(MORNING_HOUR, 0, 0)?)
}

/// Intraday choices sourced from the two configuration entities.
/// Labels look like `3:30 PM`; unparseable entries are dropped.
fn compute_time_menu(signals: &EveSignals, now: DateTime<Local>) -> Vec<DateOption> {
    signals
        .snooze_times_primary
        .iter()
        .chain(signals.snooze_times_extra.iter())
        .filter_map(|label| {
            let time = NaiveTime::parse_from_str(label.trim(), "%I:%M %p").ok()?;
            let date = resolve_local(now.date_naive().and_time(time))?;
            Some(DateOption { label: label.clone(), date })
        })
        .filter(|option| now < option.date)
        .collect()
}

fn compute_quick_options(signals: &EveSignals, now: DateTime<Local>) -> Vec<QuickOption> {
    let mut options = Vec::new();

    if signals.is_eve == false {
        let times = compute_time_menu(signals, now);
        if times.is_empty() == false {
            options.push(QuickOption::Menu { label: "Today at…".to_string(), options: times });
        }
    }

    let tomorrow = now.date_naive().succ_opt().and_then(day_at_morning);
    if let Some(date) = tomorrow {
        let label = match signals.is_eve {
            true => motzei_label(signals),
            false => "Tomorrow".to_string(),
        };
        options.push(QuickOption::Single(DateOption { label, date }));
    }

    // Drop single options that have already passed; submenus filter themselves
    options.retain(|option| match option {
        QuickOption::Menu { .. } => true,
        QuickOption::Single(single) => now < single.date,
    });
    options
}

/// The week ahead, one 08:00 target per day starting tomorrow.
///
/// Days inside the blackout window are not listed at all; the eve day and the
/// after-window day get their localized labels instead of the weekday name.
/// (Ordinary Fridays are left as plain weekdays: every week has an eve of its
/// own, and only holiday eves need calling out.)
fn compute_full_week(signals: &EveSignals, now: DateTime<Local>) -> Vec<DateOption> {
    let today = now.date_naive();
    let mut options = Vec::new();

    for offset in 1..7 {
        let day = match today.checked_add_days(chrono::Days::new(offset)) {
            None => break,
            Some(day) => day,
        };
        let date = match day_at_morning(day) {
            None => continue,
            Some(date) => date,
        };

        let mut label = date.format("%A").to_string();
        if signals.erev_date == Some(day) && day.weekday() != Weekday::Fri {
            label = format!("{} (ערב יום טוב)", label);
        } else if signals.motzei_date == Some(day) {
            label = motzei_label(signals);
        } else if let (Some(erev), Some(motzei)) = (signals.erev_date, signals.motzei_date) {
            // Strictly inside the window: not a valid target at all
            if erev < day && day < motzei {
                continue;
            }
        }

        options.push(DateOption { label, date });
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Local> {
        Local
            .from_local_datetime(
                &NaiveDate::from_ymd_opt(y, mo, d)
                    .unwrap()
                    .and_hms_opt(h, mi, 0)
                    .unwrap(),
            )
            .earliest()
            .unwrap()
    }

    fn date(y: i32, mo: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, mo, d).unwrap()
    }

    // 2024-04-22 is a Monday
    fn plain_monday_noon() -> DateTime<Local> {
        local(2024, 4, 22, 12, 0)
    }

    #[test]
    fn quick_options_outside_the_eve_window() {
        let signals = EveSignals {
            snooze_times_primary: vec!["8:00 AM".to_string(), "3:30 PM".to_string()],
            snooze_times_extra: vec!["9:00 PM".to_string()],
            ..EveSignals::default()
        };
        let now = plain_monday_noon();

        let options = compute_quick_options(&signals, now);
        assert_eq!(options.len(), 2);
        match &options[0] {
            QuickOption::Menu { label, options } => {
                assert_eq!(label, "Today at…");
                // 8:00 AM has already passed and is filtered out
                let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
                assert_eq!(labels, vec!["3:30 PM", "9:00 PM"]);
            }
            other => panic!("expected a time menu, got {:?}", other),
        }
        match &options[1] {
            QuickOption::Single(single) => {
                assert_eq!(single.label, "Tomorrow");
                assert_eq!(single.date, local(2024, 4, 23, 8, 0));
            }
            other => panic!("expected the tomorrow option, got {:?}", other),
        }
    }

    #[test]
    fn eve_window_suppresses_the_time_menu_and_relabels_tomorrow() {
        let signals = EveSignals {
            is_eve: true,
            erev_date: Some(date(2024, 4, 22)),
            motzei_date: Some(date(2024, 4, 23)),
            snooze_times_primary: vec!["9:00 PM".to_string()],
            ..EveSignals::default()
        };
        let now = plain_monday_noon();

        let options = compute_quick_options(&signals, now);
        assert_eq!(options.len(), 1);
        match &options[0] {
            QuickOption::Single(single) => {
                // Tuesday is not a Saturday, so this is a holiday motzei
                assert_eq!(single.label, "מוצאי יום טוב");
                assert_eq!(single.date, local(2024, 4, 23, 8, 0));
            }
            other => panic!("expected a single option, got {:?}", other),
        }
    }

    #[test]
    fn full_week_lists_six_mornings_by_weekday() {
        let week = compute_full_week(&EveSignals::default(), plain_monday_noon());

        let labels: Vec<&str> = week.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"]
        );
        assert!(week.iter().all(|o| o.date.time() == NaiveTime::from_hms_opt(8, 0, 0).unwrap()));
    }

    #[test]
    fn full_week_skips_days_inside_the_blackout_window() {
        let signals = EveSignals {
            // A two-day holiday: eve Wednesday, ends Saturday night
            erev_date: Some(date(2024, 4, 24)),
            motzei_date: Some(date(2024, 4, 27)),
            ..EveSignals::default()
        };
        let week = compute_full_week(&signals, plain_monday_noon());

        let labels: Vec<&str> = week.iter().map(|o| o.label.as_str()).collect();
        // Thursday and Friday fall strictly inside the window and disappear;
        // Saturday is the motzei
        assert_eq!(
            labels,
            vec!["Tuesday", "Wednesday (ערב יום טוב)", "מוצאי שבת", "Sunday"]
        );
    }

    #[test]
    fn ordinary_fridays_are_not_labeled_as_eves() {
        let signals = EveSignals {
            erev_date: Some(date(2024, 4, 26)), // the upcoming Friday
            motzei_date: Some(date(2024, 4, 27)),
            ..EveSignals::default()
        };
        let week = compute_full_week(&signals, plain_monday_noon());

        let labels: Vec<&str> = week.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Tuesday", "Wednesday", "Thursday", "Friday", "מוצאי שבת", "Sunday"]
        );
    }
}

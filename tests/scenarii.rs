//! Shared fixtures for the integration tests
#![allow(dead_code)]

use chrono::{DateTime, Local, NaiveDate, TimeZone};

use corkboard::{TodoItem, TodoItemWithEntity, TodoStatus};

pub fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Local> {
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

/// 2024-04-22 is a Monday; most scenarios run "at noon that day"
pub fn monday_noon() -> DateTime<Local> {
    local(2024, 4, 22, 12, 0)
}

pub fn todo(uid: &str, summary: &str, status: TodoStatus, due: Option<&str>) -> TodoItem {
    TodoItem {
        uid: uid.to_string(),
        summary: summary.to_string(),
        status,
        description: None,
        due: due.map(str::to_string),
    }
}

pub fn owned(entity_id: &str, item: TodoItem) -> TodoItemWithEntity {
    TodoItemWithEntity::new(entity_id.to_string(), item)
}

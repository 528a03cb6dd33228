use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::{ClockTime, duration_label};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarEvent {
    pub uuid: Uuid,

    pub title: String,

    pub date: NaiveDate,

    #[serde(default)]
    pub start_time: Option<ClockTime>,

    #[serde(default)]
    pub end_time: Option<ClockTime>,

    /// Task this event was created from. Only consulted when that task is
    /// deleted.
    #[serde(default)]
    pub task_uuid: Option<Uuid>,
}

impl CalendarEvent {
    pub fn all_day(title: String, date: NaiveDate) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            title,
            date,
            start_time: None,
            end_time: None,
            task_uuid: None,
        }
    }

    pub fn timed(title: String, date: NaiveDate, start: ClockTime, end: ClockTime) -> Self {
        Self {
            start_time: Some(start),
            end_time: Some(end),
            ..Self::all_day(title, date)
        }
    }

    pub fn linked_to(mut self, task_uuid: Uuid) -> Self {
        self.task_uuid = Some(task_uuid);
        self
    }

    /// Row the event occupies in hour-slot views; untimed events sit in the
    /// midnight row.
    pub fn slot_hour(&self) -> u32 {
        self.start_time.map(|start| start.hour()).unwrap_or(0)
    }

    pub fn time_range_label(&self) -> Option<String> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some(format!(
                "{start} - {end} ({})",
                duration_label(start, end)
            )),
            (Some(start), None) => Some(start.to_string()),
            _ => None,
        }
    }

    pub fn chronological(a: &Self, b: &Self) -> Ordering {
        a.date
            .cmp(&b.date)
            .then_with(|| a.start_time.cmp(&b.start_time))
            .then_with(|| a.title.cmp(&b.title))
    }
}

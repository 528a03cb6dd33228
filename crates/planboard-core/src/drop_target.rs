//! Drop-target identifiers for calendar cells.
//!
//! Hour-slot views (week, four-day) tag every cell with
//! `"<date>-<hour>"`, the day view only needs `"hour-<n>"` because the date is
//! the focused day, and month cells carry the bare date string. Dates are
//! written as `Sun Oct 18 2026`.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

use crate::calendar::{HOURS_PER_DAY, ViewMode};

const SLOT_DATE_FORMAT: &str = "%a %b %d %Y";
const HOUR_SLOT_PREFIX: &str = "hour-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropSlot {
    pub date: NaiveDate,
    /// `None` for whole-day cells.
    pub hour: Option<u32>,
}

pub fn day_cell_id(date: NaiveDate) -> String {
    date.format(SLOT_DATE_FORMAT).to_string()
}

pub fn slot_id(date: NaiveDate, hour: u32) -> String {
    format!("{}-{hour}", day_cell_id(date))
}

pub fn hour_slot_id(hour: u32) -> String {
    format!("{HOUR_SLOT_PREFIX}{hour}")
}

/// Builds the identifier a cell carries in `view`.
pub fn cell_id(view: ViewMode, date: NaiveDate, hour: u32) -> String {
    match view {
        ViewMode::Day => hour_slot_id(hour),
        ViewMode::FourDay | ViewMode::Week => slot_id(date, hour),
        ViewMode::Month => day_cell_id(date),
    }
}

fn dated_slot_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<date>[A-Za-z]{3} [A-Za-z]{3} \d{1,2} \d{4})-(?P<hour>\d{1,2})$").ok()
    })
    .as_ref()
}

fn parse_slot_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), SLOT_DATE_FORMAT).ok()
}

fn parse_hour(raw: &str) -> Option<u32> {
    if raw.is_empty() || raw.len() > 2 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<u32>().ok().filter(|hour| *hour < HOURS_PER_DAY)
}

/// Resolves a drop target back to a date and hour for the active view.
/// Identifiers that do not belong to `view` yield `None`.
pub fn decode(id: &str, view: ViewMode, focus: NaiveDate) -> Option<DropSlot> {
    let id = id.trim();
    let slot = match view {
        ViewMode::Day => {
            let hour = parse_hour(id.strip_prefix(HOUR_SLOT_PREFIX)?)?;
            DropSlot {
                date: focus,
                hour: Some(hour),
            }
        }
        ViewMode::FourDay | ViewMode::Week => {
            let caps = dated_slot_re()?.captures(id)?;
            let date = parse_slot_date(caps.name("date")?.as_str())?;
            let hour = parse_hour(caps.name("hour")?.as_str())?;
            DropSlot {
                date,
                hour: Some(hour),
            }
        }
        ViewMode::Month => DropSlot {
            date: parse_slot_date(id)?,
            hour: None,
        },
    };

    debug!(id, view = %view, date = %slot.date, hour = ?slot.hour, "decoded drop target");
    Some(slot)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn encodes_like_browser_date_strings() {
        assert_eq!(slot_id(date(2026, 10, 4), 9), "Sun Oct 04 2026-9");
        assert_eq!(hour_slot_id(14), "hour-14");
        assert_eq!(day_cell_id(date(2026, 2, 28)), "Sat Feb 28 2026");
    }

    #[test]
    fn decodes_week_slots() {
        let focus = date(2026, 10, 18);
        let slot = decode("Tue Oct 20 2026-15", ViewMode::Week, focus).expect("slot");
        assert_eq!(slot.date, date(2026, 10, 20));
        assert_eq!(slot.hour, Some(15));

        let slot = decode("Mon Oct 19 2026-0", ViewMode::FourDay, focus).expect("slot");
        assert_eq!(slot.hour, Some(0));
    }

    #[test]
    fn day_view_uses_focused_date() {
        let focus = date(2026, 10, 18);
        let slot = decode("hour-7", ViewMode::Day, focus).expect("slot");
        assert_eq!(slot, DropSlot { date: focus, hour: Some(7) });
    }

    #[test]
    fn month_cells_have_no_hour() {
        let focus = date(2026, 10, 1);
        let slot = decode("Fri Oct 30 2026", ViewMode::Month, focus).expect("slot");
        assert_eq!(slot, DropSlot { date: date(2026, 10, 30), hour: None });
    }

    #[test]
    fn rejects_foreign_or_malformed_ids() {
        let focus = date(2026, 10, 18);
        assert_eq!(decode("hour-7", ViewMode::Week, focus), None);
        assert_eq!(decode("Sun Oct 18 2026-9", ViewMode::Day, focus), None);
        assert_eq!(decode("hour-24", ViewMode::Day, focus), None);
        assert_eq!(decode("Sun Oct 18 2026-30", ViewMode::Week, focus), None);
        assert_eq!(decode("sidebar", ViewMode::Month, focus), None);
    }

    #[test]
    fn hour_slots_take_plain_digits_only() {
        let focus = date(2026, 10, 18);
        assert_eq!(decode("hour-+7", ViewMode::Day, focus), None);
        assert_eq!(decode("hour-007", ViewMode::Day, focus), None);
        assert_eq!(decode("hour-", ViewMode::Day, focus), None);
        assert_eq!(
            decode("hour-07", ViewMode::Day, focus),
            Some(DropSlot { date: focus, hour: Some(7) })
        );
    }

    #[test]
    fn cell_ids_decode_in_their_own_view() {
        let focus = date(2026, 10, 18);
        for view in ViewMode::all() {
            let id = cell_id(view, focus, 11);
            let slot = decode(&id, view, focus).expect("own id decodes");
            assert_eq!(slot.date, focus);
        }
    }
}

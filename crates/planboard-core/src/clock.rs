use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, PlannerResult};

const MINUTES_PER_HOUR: u32 = 60;
const LAST_MINUTE_OF_DAY: u32 = 23 * 60 + 59;

/// Wall-clock time of day with minute precision, written as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    hour: u32,
    minute: u32,
}

impl ClockTime {
    pub fn new(hour: u32, minute: u32) -> PlannerResult<Self> {
        if hour > 23 || minute > 59 {
            return Err(PlannerError::InvalidClockTime(format!("{hour}:{minute}")));
        }
        Ok(Self { hour, minute })
    }

    /// Top of the given hour, clamped to the last hour of the day.
    pub fn on_the_hour(hour: u32) -> Self {
        Self {
            hour: hour.min(23),
            minute: 0,
        }
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    pub fn minutes_of_day(&self) -> u32 {
        self.hour * MINUTES_PER_HOUR + self.minute
    }

    fn from_minutes_of_day(minutes: u32) -> Self {
        let minutes = minutes.min(LAST_MINUTE_OF_DAY);
        Self {
            hour: minutes / MINUTES_PER_HOUR,
            minute: minutes % MINUTES_PER_HOUR,
        }
    }

    /// Saturates at 23:59 instead of wrapping into the next day.
    pub fn plus_minutes(&self, minutes: u32) -> Self {
        Self::from_minutes_of_day(self.minutes_of_day().saturating_add(minutes))
    }
}

impl FromStr for ClockTime {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let invalid = || PlannerError::InvalidClockTime(raw.to_string());

        let (h, m) = raw.split_once(':').ok_or_else(invalid)?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(invalid());
        }
        let hour = h.parse::<u32>().map_err(|_| invalid())?;
        let minute = m.parse::<u32>().map_err(|_| invalid())?;
        Self::new(hour, minute).map_err(|_| invalid())
    }
}

impl TryFrom<String> for ClockTime {
    type Error = PlannerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Signed distance in minutes from `start` to `end` on the same day.
pub fn minutes_between(start: ClockTime, end: ClockTime) -> i64 {
    i64::from(end.minutes_of_day()) - i64::from(start.minutes_of_day())
}

/// Human label for the span between two times, or `"Invalid"` when the
/// span is empty or negative.
pub fn duration_label(start: ClockTime, end: ClockTime) -> String {
    let total = minutes_between(start, end);
    if total <= 0 {
        return "Invalid".to_string();
    }

    let hours = total / i64::from(MINUTES_PER_HOUR);
    let minutes = total % i64::from(MINUTES_PER_HOUR);

    match (hours, minutes) {
        (0, m) => format!("{m} min"),
        (h, 0) => format!("{h} hr"),
        (h, m) => format!("{h} hr {m} min"),
    }
}

/// Same as [`duration_label`] over raw `HH:MM` strings; unparseable input
/// is reported as `"Invalid"` too.
pub fn calculate_duration(start: &str, end: &str) -> String {
    match (start.parse::<ClockTime>(), end.parse::<ClockTime>()) {
        (Ok(start), Ok(end)) => duration_label(start, end),
        _ => "Invalid".to_string(),
    }
}

pub fn validate_range(start: ClockTime, end: ClockTime) -> PlannerResult<()> {
    if end.minutes_of_day() <= start.minutes_of_day() {
        return Err(PlannerError::EndNotAfterStart);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(raw: &str) -> ClockTime {
        raw.parse().expect("valid clock time")
    }

    #[test]
    fn duration_labels_match_dialog_summary() {
        assert_eq!(calculate_duration("09:00", "10:00"), "1 hr");
        assert_eq!(calculate_duration("09:00", "09:30"), "30 min");
        assert_eq!(calculate_duration("09:15", "11:00"), "1 hr 45 min");
        assert_eq!(calculate_duration("10:00", "09:00"), "Invalid");
        assert_eq!(calculate_duration("10:00", "10:00"), "Invalid");
        assert_eq!(calculate_duration("nine", "10:00"), "Invalid");
    }

    #[test]
    fn parses_single_digit_hour() {
        let parsed = t("9:05");
        assert_eq!(parsed.hour(), 9);
        assert_eq!(parsed.minute(), 5);
        assert_eq!(parsed.to_string(), "09:05");
    }

    #[test]
    fn rejects_out_of_range_times() {
        assert!("24:00".parse::<ClockTime>().is_err());
        assert!("12:60".parse::<ClockTime>().is_err());
        assert!("12:5".parse::<ClockTime>().is_err());
        assert!("".parse::<ClockTime>().is_err());
    }

    #[test]
    fn range_requires_end_after_start() {
        assert!(validate_range(t("09:00"), t("09:01")).is_ok());
        assert_eq!(
            validate_range(t("09:00"), t("09:00")),
            Err(PlannerError::EndNotAfterStart)
        );
        assert_eq!(
            validate_range(t("18:00"), t("08:00")),
            Err(PlannerError::EndNotAfterStart)
        );
    }

    #[test]
    fn plus_minutes_saturates_at_end_of_day() {
        assert_eq!(t("09:00").plus_minutes(90), t("10:30"));
        assert_eq!(t("23:00").plus_minutes(120), t("23:59"));
    }
}

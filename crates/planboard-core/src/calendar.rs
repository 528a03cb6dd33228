use std::fmt;
use std::str::FromStr;

use chrono::{
  Datelike,
  Duration,
  NaiveDate,
  Utc,
  Weekday
};
use chrono_tz::Tz;
use serde::{
  Deserialize,
  Serialize
};

use crate::error::{
  PlannerError,
  PlannerResult
};

pub const HOURS_PER_DAY: u32 = 24;
const FOUR_DAY_SPAN: i64 = 4;
const WEEK_SPAN: i64 = 7;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ViewMode {
  Day,
  FourDay,
  Week,
  Month
}

impl ViewMode {
  pub fn all() -> [Self; 4] {
    [
      Self::Day,
      Self::FourDay,
      Self::Week,
      Self::Month
    ]
  }

  pub fn as_key(self) -> &'static str {
    match self {
      | Self::Day => "day",
      | Self::FourDay => "four-day",
      | Self::Week => "week",
      | Self::Month => "month"
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      | Self::Day => "Day",
      | Self::FourDay => "4 Days",
      | Self::Week => "Week",
      | Self::Month => "Month"
    }
  }

  pub fn from_key(
    key: &str
  ) -> Option<Self> {
    match key
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "day" => Some(Self::Day),
      | "four-day" | "4day"
      | "4-day" | "fourday" => {
        Some(Self::FourDay)
      }
      | "week" => Some(Self::Week),
      | "month" => Some(Self::Month),
      | _ => None
    }
  }

  /// Views laid out as hour rows rather
  /// than day cells.
  pub fn has_hour_slots(self) -> bool {
    !matches!(self, Self::Month)
  }
}

impl FromStr for ViewMode {
  type Err = PlannerError;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    Self::from_key(s).ok_or_else(|| {
      PlannerError::UnknownView(
        s.to_string()
      )
    })
  }
}

impl fmt::Display for ViewMode {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_key())
  }
}

pub fn parse_week_start(
  raw: &str
) -> Option<Weekday> {
  match raw
    .trim()
    .to_ascii_lowercase()
    .as_str()
  {
    | "sunday" | "sun" => {
      Some(Weekday::Sun)
    }
    | "monday" | "mon" => {
      Some(Weekday::Mon)
    }
    | _ => None
  }
}

pub fn parse_date(
  raw: &str
) -> Result<NaiveDate, PlannerError> {
  NaiveDate::parse_from_str(
    raw.trim(),
    "%Y-%m-%d"
  )
  .map_err(|_| {
    PlannerError::InvalidDate(
      raw.to_string()
    )
  })
}

pub fn today_in_timezone(
  timezone: Tz
) -> NaiveDate {
  Utc::now()
    .with_timezone(&timezone)
    .date_naive()
}

pub fn add_days(
  date: NaiveDate,
  days: i64
) -> NaiveDate {
  date
    .checked_add_signed(Duration::days(
      days
    ))
    .unwrap_or(date)
}

pub fn start_of_week(
  day: NaiveDate,
  week_start: Weekday
) -> NaiveDate {
  let day_idx = day
    .weekday()
    .num_days_from_monday()
    as i64;
  let start_idx = week_start
    .num_days_from_monday()
    as i64;
  let diff =
    (7 + day_idx - start_idx) % 7;
  add_days(day, -diff)
}

fn contiguous_dates(
  first: NaiveDate,
  count: i64
) -> Vec<NaiveDate> {
  (0..count)
    .map(|offset| {
      add_days(first, offset)
    })
    .collect()
}

pub fn week_dates(
  day: NaiveDate,
  week_start: Weekday
) -> Vec<NaiveDate> {
  contiguous_dates(
    start_of_week(day, week_start),
    WEEK_SPAN
  )
}

/// The four-day strip is anchored on the
/// start of the week containing `day`.
pub fn four_day_dates(
  day: NaiveDate,
  week_start: Weekday
) -> Vec<NaiveDate> {
  contiguous_dates(
    start_of_week(day, week_start),
    FOUR_DAY_SPAN
  )
}

pub fn first_day_of_month(
  year: i32,
  month: u32
) -> PlannerResult<NaiveDate> {
  NaiveDate::from_ymd_opt(
    year, month, 1
  )
  .ok_or(PlannerError::InvalidMonth {
    year,
    month
  })
}

fn dates_of_month(
  first: NaiveDate
) -> Vec<NaiveDate> {
  first
    .iter_days()
    .take_while(|day| {
      day.month() == first.month()
    })
    .collect()
}

pub fn last_day_of_month(
  year: i32,
  month: u32
) -> PlannerResult<NaiveDate> {
  let first =
    first_day_of_month(year, month)?;
  Ok(
    dates_of_month(first)
      .last()
      .copied()
      .unwrap_or(first)
  )
}

pub fn days_in_month(
  year: i32,
  month: u32
) -> PlannerResult<u32> {
  Ok(last_day_of_month(year, month)?.day())
}

pub fn first_weekday_of_month(
  year: i32,
  month: u32
) -> PlannerResult<Weekday> {
  Ok(
    first_day_of_month(year, month)?
      .weekday()
  )
}

/// Empty cells ahead of day 1 in a
/// month grid whose columns begin on
/// `week_start`.
pub fn leading_blank_days(
  year: i32,
  month: u32,
  week_start: Weekday
) -> PlannerResult<u32> {
  let first =
    first_day_of_month(year, month)?;
  Ok(
    (first - start_of_week(first, week_start))
      .num_days() as u32
  )
}

pub fn month_cells(
  year: i32,
  month: u32,
  week_start: Weekday
) -> PlannerResult<Vec<Option<NaiveDate>>> {
  let blanks = leading_blank_days(
    year, month, week_start
  )?;
  let first =
    first_day_of_month(year, month)?;

  Ok(
    (0..blanks)
      .map(|_| None)
      .chain(
        dates_of_month(first)
          .into_iter()
          .map(Some)
      )
      .collect()
  )
}

pub fn shift_months(
  date: NaiveDate,
  months: i32
) -> NaiveDate {
  let mut year = date.year();
  let mut month =
    date.month() as i32 + months;

  while month < 1 {
    month += 12;
    year = year.saturating_sub(1);
  }
  while month > 12 {
    month -= 12;
    year = year.saturating_add(1);
  }

  let month = month as u32;
  days_in_month(year, month)
    .ok()
    .and_then(|last| {
      NaiveDate::from_ymd_opt(
        year,
        month,
        date.day().min(last)
      )
    })
    .unwrap_or(date)
}

/// Previous/next navigation. Month steps
/// land on the first of the target month.
pub fn shift_focus(
  current: NaiveDate,
  view: ViewMode,
  step: i64
) -> NaiveDate {
  match view {
    | ViewMode::Month => {
      let shifted = shift_months(
        current,
        step as i32
      );
      shifted
        .with_day(1)
        .unwrap_or(shifted)
    }
    | ViewMode::Week => {
      add_days(current, step * WEEK_SPAN)
    }
    | ViewMode::FourDay => {
      add_days(
        current,
        step * FOUR_DAY_SPAN
      )
    }
    | ViewMode::Day => {
      add_days(current, step)
    }
  }
}

pub fn visible_dates(
  focus: NaiveDate,
  view: ViewMode,
  week_start: Weekday
) -> Vec<NaiveDate> {
  match view {
    | ViewMode::Day => vec![focus],
    | ViewMode::FourDay => {
      four_day_dates(focus, week_start)
    }
    | ViewMode::Week => {
      week_dates(focus, week_start)
    }
    | ViewMode::Month => dates_of_month(
      focus.with_day(1).unwrap_or(focus)
    )
  }
}

pub fn period_label(
  focus: NaiveDate,
  view: ViewMode,
  week_start: Weekday
) -> String {
  match view {
    | ViewMode::Month => {
      focus.format("%B %Y").to_string()
    }
    | ViewMode::Week => {
      let first =
        start_of_week(focus, week_start);
      format!(
        "Week of {}",
        first.format("%B %-d")
      )
    }
    | ViewMode::FourDay => {
      start_of_week(focus, week_start)
        .format("%b %-d")
        .to_string()
    }
    | ViewMode::Day => focus
      .format("%A, %B %-d, %Y")
      .to_string()
  }
}

pub fn hour_label(hour: u32) -> String {
  match hour {
    | 0 => "12 AM".to_string(),
    | 1..=11 => format!("{hour} AM"),
    | 12 => "12 PM".to_string(),
    | _ => format!("{} PM", hour - 12)
  }
}

/// Column headers for a 7-column grid
/// beginning on `week_start`.
pub fn weekday_labels(
  week_start: Weekday
) -> Vec<&'static str> {
  let mut day = week_start;
  let mut labels =
    Vec::with_capacity(7);
  for _ in 0..7 {
    labels.push(weekday_short(day));
    day = day.succ();
  }
  labels
}

fn weekday_short(
  day: Weekday
) -> &'static str {
  match day {
    | Weekday::Sun => "Sun",
    | Weekday::Mon => "Mon",
    | Weekday::Tue => "Tue",
    | Weekday::Wed => "Wed",
    | Weekday::Thu => "Thu",
    | Weekday::Fri => "Fri",
    | Weekday::Sat => "Sat"
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  #[test]
  fn week_is_seven_contiguous_days_from_sunday()
  {
    let mut day = date(2026, 1, 1);
    for _ in 0..60 {
      let week =
        week_dates(day, Weekday::Sun);
      assert_eq!(week.len(), 7);
      assert_eq!(
        week[0].weekday(),
        Weekday::Sun
      );
      assert!(week.contains(&day));
      for pair in week.windows(2) {
        assert_eq!(
          pair[1],
          add_days(pair[0], 1)
        );
      }
      day = add_days(day, 5);
    }
  }

  #[test]
  fn week_can_start_on_monday() {
    let sunday = date(2026, 10, 18);
    let week =
      week_dates(sunday, Weekday::Mon);
    assert_eq!(week[0], date(2026, 10, 12));
    assert_eq!(week[6], sunday);
  }

  #[test]
  fn month_lengths_follow_leap_years() {
    assert_eq!(days_in_month(2024, 2), Ok(29));
    assert_eq!(days_in_month(2026, 2), Ok(28));
    assert_eq!(days_in_month(2000, 2), Ok(29));
    assert_eq!(days_in_month(1900, 2), Ok(28));
    assert_eq!(days_in_month(2026, 1), Ok(31));
    assert_eq!(days_in_month(2026, 4), Ok(30));
    assert_eq!(days_in_month(2026, 12), Ok(31));
  }

  #[test]
  fn month_helpers_reject_invalid_months()
  {
    for (year, month) in
      [(2026, 0), (2026, 13), (300_000, 2)]
    {
      let err = PlannerError::InvalidMonth {
        year,
        month
      };
      assert_eq!(
        days_in_month(year, month),
        Err(err.clone())
      );
      assert_eq!(
        first_weekday_of_month(year, month),
        Err(err.clone())
      );
      assert_eq!(
        last_day_of_month(year, month),
        Err(err.clone())
      );
      assert_eq!(
        month_cells(
          year,
          month,
          Weekday::Sun
        ),
        Err(err)
      );
    }
  }

  #[test]
  fn month_grid_pads_to_first_weekday() {
    // October 2026 begins on a Thursday.
    assert_eq!(
      first_weekday_of_month(2026, 10),
      Ok(Weekday::Thu)
    );
    let cells =
      month_cells(2026, 10, Weekday::Sun)
        .expect("valid month");
    assert_eq!(cells.len(), 4 + 31);
    assert!(cells[..4]
      .iter()
      .all(Option::is_none));
    assert_eq!(
      cells[4],
      Some(date(2026, 10, 1))
    );
    assert_eq!(
      leading_blank_days(
        2026,
        10,
        Weekday::Mon
      ),
      Ok(3)
    );
  }

  #[test]
  fn month_navigation_lands_on_first_day() {
    let focus = date(2026, 1, 31);
    assert_eq!(
      shift_focus(
        focus,
        ViewMode::Month,
        1
      ),
      date(2026, 2, 1)
    );
    assert_eq!(
      shift_focus(
        focus,
        ViewMode::Month,
        -1
      ),
      date(2025, 12, 1)
    );
  }

  #[test]
  fn hour_slot_navigation_moves_by_span()
  {
    let focus = date(2026, 10, 18);
    assert_eq!(
      shift_focus(focus, ViewMode::Week, -1),
      date(2026, 10, 11)
    );
    assert_eq!(
      shift_focus(
        focus,
        ViewMode::FourDay,
        1
      ),
      date(2026, 10, 22)
    );
    assert_eq!(
      shift_focus(focus, ViewMode::Day, 1),
      date(2026, 10, 19)
    );
  }

  #[test]
  fn four_day_strip_starts_at_week_start()
  {
    let days = four_day_dates(
      date(2026, 10, 21),
      Weekday::Sun
    );
    assert_eq!(
      days,
      vec![
        date(2026, 10, 18),
        date(2026, 10, 19),
        date(2026, 10, 20),
        date(2026, 10, 21),
      ]
    );
  }

  #[test]
  fn hour_labels_use_twelve_hour_clock() {
    assert_eq!(hour_label(0), "12 AM");
    assert_eq!(hour_label(9), "9 AM");
    assert_eq!(hour_label(12), "12 PM");
    assert_eq!(hour_label(23), "11 PM");
  }

  #[test]
  fn period_labels_per_view() {
    let focus = date(2026, 10, 20);
    assert_eq!(
      period_label(
        focus,
        ViewMode::Month,
        Weekday::Sun
      ),
      "October 2026"
    );
    assert_eq!(
      period_label(
        focus,
        ViewMode::Week,
        Weekday::Sun
      ),
      "Week of October 18"
    );
    assert_eq!(
      period_label(
        focus,
        ViewMode::Day,
        Weekday::Sun
      ),
      "Tuesday, October 20, 2026"
    );
  }

  #[test]
  fn view_keys_round_trip() {
    for view in ViewMode::all() {
      assert_eq!(
        ViewMode::from_key(view.as_key()),
        Some(view)
      );
    }
    assert_eq!(
      "4day".parse::<ViewMode>(),
      Ok(ViewMode::FourDay)
    );
    assert!(
      "year".parse::<ViewMode>().is_err()
    );
  }
}

use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use chrono::{
  Local,
  NaiveDate,
  Weekday
};
use chrono_tz::Tz;
use serde::{
  Deserialize,
  Serialize
};
use tracing::{
  debug,
  info,
  warn
};

use crate::calendar::{
  ViewMode,
  parse_week_start,
  today_in_timezone
};
use crate::clock::ClockTime;
use crate::task::{
  Difficulty,
  Priority,
  TaskDraft
};

const CONFIG_FILE_NAME: &str =
  "planboard.toml";
const CONFIG_DIR_NAME: &str =
  "planboard";
const CONFIG_ENV_VAR: &str =
  "PLANBOARD_CONFIG";

#[derive(
  Debug,
  Clone,
  PartialEq,
  Serialize,
  Deserialize,
)]
pub struct Config {
  #[serde(default)]
  pub calendar:     CalendarSection,
  #[serde(default)]
  pub schedule:     ScheduleSection,
  #[serde(default)]
  pub task:         TaskSection,
  #[serde(default)]
  pub display:      DisplaySection,
  #[serde(skip)]
  pub loaded_files: Vec<PathBuf>
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Serialize,
  Deserialize,
)]
pub struct CalendarSection {
  #[serde(
    default = "default_view_key"
  )]
  pub default_view: String,
  #[serde(
    default = "default_week_start"
  )]
  pub week_start:   String,
  #[serde(default)]
  pub timezone:     Option<String>
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Serialize,
  Deserialize,
)]
pub struct ScheduleSection {
  #[serde(
    default = "default_start_time"
  )]
  pub default_start: String,
  #[serde(
    default = "default_end_time"
  )]
  pub default_end:   String
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Serialize,
  Deserialize,
)]
pub struct TaskSection {
  #[serde(
    default = "default_level_key"
  )]
  pub default_difficulty: String,
  #[serde(
    default = "default_level_key"
  )]
  pub default_priority:   String,
  #[serde(
    default = "default_duration_minutes"
  )]
  pub default_duration:   u32
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Serialize,
  Deserialize,
)]
pub struct DisplaySection {
  #[serde(default = "default_true")]
  pub color: bool
}

fn default_view_key() -> String {
  ViewMode::Month.as_key().to_string()
}

fn default_week_start() -> String {
  "sunday".to_string()
}

fn default_start_time() -> String {
  "09:00".to_string()
}

fn default_end_time() -> String {
  "10:00".to_string()
}

fn default_level_key() -> String {
  "medium".to_string()
}

fn default_duration_minutes() -> u32 {
  30
}

fn default_true() -> bool {
  true
}

impl Default for CalendarSection {
  fn default() -> Self {
    Self {
      default_view: default_view_key(),
      week_start:   default_week_start(),
      timezone:     None
    }
  }
}

impl Default for ScheduleSection {
  fn default() -> Self {
    Self {
      default_start:
        default_start_time(),
      default_end:   default_end_time()
    }
  }
}

impl Default for TaskSection {
  fn default() -> Self {
    Self {
      default_difficulty:
        default_level_key(),
      default_priority:
        default_level_key(),
      default_duration:
        default_duration_minutes()
    }
  }
}

impl Default for DisplaySection {
  fn default() -> Self {
    Self {
      color: true
    }
  }
}

impl Default for Config {
  fn default() -> Self {
    Self {
      calendar:     CalendarSection::default(),
      schedule:     ScheduleSection::default(),
      task:         TaskSection::default(),
      display:      DisplaySection::default(),
      loaded_files: vec![]
    }
  }
}

impl Config {
  #[tracing::instrument(skip(
    config_override
  ))]
  pub fn load(
    config_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let path = resolve_config_path(
      config_override
    )?;

    let Some(path) = path else {
      warn!(
        "no planboard.toml found; \
         using defaults"
      );
      return Ok(Self::default());
    };

    info!(config = %path.display(), "loading config");
    Self::load_file(&path)
  }

  #[tracing::instrument]
  pub fn load_file(
    path: &Path
  ) -> anyhow::Result<Self> {
    let text =
      fs::read_to_string(path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;

    let mut cfg =
      Self::from_toml_str(&text)
        .with_context(|| {
          format!(
            "failed to parse {}",
            path.display()
          )
        })?;
    cfg
      .loaded_files
      .push(path.to_path_buf());
    Ok(cfg)
  }

  pub fn from_toml_str(
    text: &str
  ) -> anyhow::Result<Self> {
    let mut cfg =
      toml::from_str::<Self>(text)
        .map_err(|e| {
          anyhow!("invalid config: {e}")
        })?;
    cfg.sanitize();
    Ok(cfg)
  }

  /// Applies `section.key=value` pairs on
  /// top of the loaded file.
  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) -> anyhow::Result<()>
  where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k.trim();
      let value = v.trim().to_string();
      debug!(key = %key, value = %value, "applying override");

      match key {
        | "calendar.default_view" => {
          self.calendar.default_view =
            value
        }
        | "calendar.week_start" => {
          self.calendar.week_start =
            value
        }
        | "calendar.timezone" => {
          self.calendar.timezone =
            Some(value)
        }
        | "schedule.default_start" => {
          self.schedule.default_start =
            value
        }
        | "schedule.default_end" => {
          self.schedule.default_end =
            value
        }
        | "task.default_difficulty" => {
          self.task.default_difficulty =
            value
        }
        | "task.default_priority" => {
          self.task.default_priority =
            value
        }
        | "task.default_duration" => {
          self.task.default_duration =
            value.parse().map_err(|_| {
              anyhow!(
                "task.default_duration \
                 must be a number of \
                 minutes, got: {value}"
              )
            })?
        }
        | "display.color" => {
          self.display.color =
            parse_bool(&value)
              .ok_or_else(|| {
                anyhow!(
                  "display.color must \
                   be on/off, got: \
                   {value}"
                )
              })?
        }
        | other => {
          return Err(anyhow!(
            "unknown config key: \
             {other}"
          ));
        }
      }
    }

    self.sanitize();
    Ok(())
  }

  fn sanitize(&mut self) {
    if ViewMode::from_key(
      &self.calendar.default_view
    )
    .is_none()
    {
      tracing::error!(
        value = %self.calendar.default_view,
        "invalid calendar.default_view; using month"
      );
      self.calendar.default_view =
        default_view_key();
    }

    if parse_week_start(
      &self.calendar.week_start
    )
    .is_none()
    {
      tracing::error!(
        value = %self.calendar.week_start,
        "invalid calendar.week_start; using sunday"
      );
      self.calendar.week_start =
        default_week_start();
    }

    if let Some(raw) =
      self.calendar.timezone.as_deref()
      && parse_timezone(raw).is_none()
    {
      tracing::error!(
        timezone = %raw,
        "invalid timezone id; using local time"
      );
      self.calendar.timezone = None;
    }

    let start = self
      .schedule
      .default_start
      .parse::<ClockTime>();
    let end = self
      .schedule
      .default_end
      .parse::<ClockTime>();
    let valid_range = match (start, end)
    {
      | (Ok(start), Ok(end)) => {
        end > start
      }
      | _ => false
    };
    if !valid_range {
      tracing::error!(
        start = %self.schedule.default_start,
        end = %self.schedule.default_end,
        "invalid schedule defaults; using 09:00-10:00"
      );
      self.schedule =
        ScheduleSection::default();
    }

    if self
      .task
      .default_difficulty
      .parse::<Difficulty>()
      .is_err()
    {
      tracing::error!(
        value = %self.task.default_difficulty,
        "invalid task.default_difficulty; using medium"
      );
      self.task.default_difficulty =
        default_level_key();
    }

    if self
      .task
      .default_priority
      .parse::<Priority>()
      .is_err()
    {
      tracing::error!(
        value = %self.task.default_priority,
        "invalid task.default_priority; using medium"
      );
      self.task.default_priority =
        default_level_key();
    }

    if self.task.default_duration == 0
    {
      tracing::error!(
        "task.default_duration must be positive; using 30"
      );
      self.task.default_duration =
        default_duration_minutes();
    }
  }

  pub fn default_view(&self) -> ViewMode {
    ViewMode::from_key(
      &self.calendar.default_view
    )
    .unwrap_or(ViewMode::Month)
  }

  pub fn week_start(&self) -> Weekday {
    parse_week_start(
      &self.calendar.week_start
    )
    .unwrap_or(Weekday::Sun)
  }

  pub fn timezone(&self) -> Option<Tz> {
    self
      .calendar
      .timezone
      .as_deref()
      .and_then(parse_timezone)
  }

  pub fn today(&self) -> NaiveDate {
    match self.timezone() {
      | Some(tz) => today_in_timezone(tz),
      | None => Local::now().date_naive()
    }
  }

  pub fn schedule_defaults(
    &self
  ) -> (ClockTime, ClockTime) {
    let start = self
      .schedule
      .default_start
      .parse()
      .unwrap_or_else(|_| {
        ClockTime::on_the_hour(9)
      });
    let end = self
      .schedule
      .default_end
      .parse()
      .unwrap_or_else(|_| {
        ClockTime::on_the_hour(10)
      });
    (start, end)
  }

  /// Blank create-task dialog prefilled
  /// with the configured defaults.
  pub fn task_draft(
    &self,
    title: impl Into<String>
  ) -> TaskDraft {
    let mut draft = TaskDraft::new(title);
    draft.difficulty = self
      .task
      .default_difficulty
      .parse()
      .unwrap_or(Difficulty::Medium);
    draft.priority = self
      .task
      .default_priority
      .parse()
      .unwrap_or(Priority::Medium);
    draft.duration =
      self.task.default_duration;
    draft
  }
}

fn parse_timezone(
  raw: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return None;
  }
  trimmed.parse::<Tz>().ok()
}

fn parse_bool(
  raw: &str
) -> Option<bool> {
  match raw
    .trim()
    .to_ascii_lowercase()
    .as_str()
  {
    | "on" | "yes" | "true" | "1" => {
      Some(true)
    }
    | "off" | "no" | "false" | "0" => {
      Some(false)
    }
    | _ => None
  }
}

fn resolve_config_path(
  config_override: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = config_override {
    if !path.exists() {
      return Err(anyhow!(
        "config file does not exist: \
         {}",
        path.display()
      ));
    }
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(raw) =
    std::env::var(CONFIG_ENV_VAR)
  {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
      return Ok(Some(PathBuf::from(
        trimmed
      )));
    }
  }

  let candidate =
    dirs::config_dir().map(|dir| {
      dir
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME)
    });

  Ok(candidate.filter(|p| p.exists()))
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::*;

  #[test]
  fn empty_file_yields_defaults() {
    let cfg = Config::from_toml_str("")
      .expect("parse empty config");
    assert_eq!(
      cfg.default_view(),
      ViewMode::Month
    );
    assert_eq!(
      cfg.week_start(),
      Weekday::Sun
    );
    let (start, end) =
      cfg.schedule_defaults();
    assert_eq!(start.to_string(), "09:00");
    assert_eq!(end.to_string(), "10:00");
    assert_eq!(
      cfg.task_draft("x").duration,
      30
    );
  }

  #[test]
  fn invalid_values_fall_back() {
    let cfg = Config::from_toml_str(
      r#"
[calendar]
default_view = "year"
week_start = "friday"
timezone = "Mars/Olympus"

[schedule]
default_start = "11:00"
default_end = "10:00"

[task]
default_priority = "urgent"
default_duration = 0
"#
    )
    .expect("parse config");

    assert_eq!(
      cfg.default_view(),
      ViewMode::Month
    );
    assert_eq!(
      cfg.week_start(),
      Weekday::Sun
    );
    assert!(cfg.timezone().is_none());
    assert_eq!(
      cfg.schedule,
      ScheduleSection::default()
    );
    let draft = cfg.task_draft("x");
    assert_eq!(
      draft.priority,
      Priority::Medium
    );
    assert_eq!(draft.duration, 30);
  }

  #[test]
  fn loads_file_and_applies_overrides() {
    let mut file =
      tempfile::NamedTempFile::new()
        .expect("temp file");
    file
      .write_all(
        br#"
[calendar]
default_view = "week"
timezone = "Europe/Paris"

[task]
default_difficulty = "hard"
"#
      )
      .expect("write config");

    let mut cfg =
      Config::load(Some(file.path()))
        .expect("load config");
    assert_eq!(cfg.loaded_files.len(), 1);
    assert_eq!(
      cfg.default_view(),
      ViewMode::Week
    );
    assert!(cfg.timezone().is_some());
    assert_eq!(
      cfg.task_draft("x").difficulty,
      Difficulty::Hard
    );

    cfg
      .apply_overrides(vec![
        (
          "calendar.week_start"
            .to_string(),
          "monday".to_string()
        ),
        (
          "display.color".to_string(),
          "off".to_string()
        ),
      ])
      .expect("apply overrides");
    assert_eq!(
      cfg.week_start(),
      Weekday::Mon
    );
    assert!(!cfg.display.color);
  }

  #[test]
  fn rejects_unknown_override_keys() {
    let mut cfg = Config::default();
    let err = cfg
      .apply_overrides(vec![(
        "calendar.colour".to_string(),
        "red".to_string()
      )])
      .expect_err("unknown key");
    assert!(
      err
        .to_string()
        .contains("calendar.colour")
    );
  }

  #[test]
  fn missing_override_path_is_an_error()
  {
    let dir = tempfile::tempdir()
      .expect("tempdir");
    let missing =
      dir.path().join("absent.toml");
    assert!(
      Config::load(Some(&missing))
        .is_err()
    );
  }
}

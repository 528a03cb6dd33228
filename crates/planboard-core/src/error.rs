use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlannerError {
    #[error("task not found: {0}")]
    TaskNotFound(u64),

    #[error("folder not found: {0}")]
    FolderNotFound(u64),

    #[error("event not found: {0}")]
    EventNotFound(Uuid),

    #[error("title must not be blank")]
    BlankTitle,

    #[error("invalid clock time '{0}', expected HH:MM")]
    InvalidClockTime(String),

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid month {month} of year {year}")]
    InvalidMonth { year: i32, month: u32 },

    #[error("unknown calendar view '{0}'")]
    UnknownView(String),

    #[error("unknown {kind} '{value}'")]
    UnknownKey { kind: &'static str, value: String },

    #[error("End time must be after start time!")]
    EndNotAfterStart,
}

pub type PlannerResult<T> = Result<T, PlannerError>;

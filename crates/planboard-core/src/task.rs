use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PlannerError, PlannerResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_key(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(PlannerError::UnknownKey {
                kind: "difficulty",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_key(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl FromStr for Priority {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(PlannerError::UnknownKey {
                kind: "priority",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,

    pub uuid: Uuid,

    pub title: String,

    pub completed: bool,

    #[serde(default)]
    pub due_date: Option<NaiveDate>,

    #[serde(default)]
    pub difficulty: Option<Difficulty>,

    /// Estimated effort in minutes.
    #[serde(default)]
    pub duration: Option<u32>,

    #[serde(default)]
    pub priority: Option<Priority>,

    #[serde(default)]
    pub folder_id: Option<u64>,
}

impl Task {
    pub fn new(id: u64, title: String) -> Self {
        Self {
            id,
            uuid: Uuid::new_v4(),
            title,
            completed: false,
            due_date: None,
            difficulty: None,
            duration: None,
            priority: None,
            folder_id: None,
        }
    }

    pub fn from_draft(id: u64, draft: TaskDraft) -> PlannerResult<Self> {
        let title = normalize_title(&draft.title).ok_or(PlannerError::BlankTitle)?;
        Ok(Self {
            due_date: draft.due_date,
            difficulty: Some(draft.difficulty),
            duration: Some(draft.duration),
            priority: Some(draft.priority),
            folder_id: draft.folder_id,
            ..Self::new(id, title)
        })
    }

    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }
}

/// Payload of the create-task dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub difficulty: Difficulty,
    pub duration: u32,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    pub folder_id: Option<u64>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            difficulty: Difficulty::Medium,
            duration: 30,
            due_date: None,
            priority: Priority::Medium,
            folder_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskFolder {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub collapsed: bool,
}

pub(crate) fn normalize_title(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::calendar::{ViewMode, add_days, hour_label};
use crate::clock::{ClockTime, validate_range};
use crate::drop_target;
use crate::error::{PlannerError, PlannerResult};
use crate::event::CalendarEvent;
use crate::notice::Notice;
use crate::task::{Task, TaskDraft, TaskFolder, normalize_title};

/// Minutes given to a dropped task that carries no duration of its own.
pub const DEFAULT_DROP_MINUTES: u32 = 60;

/// In-memory sidebar and calendar state. Nothing here outlives the process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Board {
    pub tasks: Vec<Task>,
    pub folders: Vec<TaskFolder>,
    pub events: Vec<CalendarEvent>,
}

#[derive(Debug, Default)]
pub struct SearchHits<'a> {
    pub tasks: Vec<&'a Task>,
    pub events: Vec<&'a CalendarEvent>,
}

impl SearchHits<'_> {
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.events.is_empty()
    }
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starter content shown on first load.
    pub fn with_samples(today: NaiveDate) -> Self {
        let mut board = Self::new();

        let work = board.push_folder("Work".to_string());
        let personal = board.push_folder("Personal".to_string());

        let mut prep = Task::new(1, "Team meeting preparation".to_string());
        prep.due_date = Some(today);
        prep.folder_id = Some(work);

        let mut review = Task::new(2, "Review project proposal".to_string());
        review.folder_id = Some(work);

        let mut docs = Task::new(3, "Update documentation".to_string());
        docs.completed = true;
        docs.folder_id = Some(personal);

        board.tasks = vec![prep, review, docs];
        board.events = vec![
            CalendarEvent::all_day("Team Standup".to_string(), today),
            CalendarEvent::all_day("Client Presentation".to_string(), add_days(today, 1)),
        ];

        debug!(
            tasks = board.tasks.len(),
            folders = board.folders.len(),
            events = board.events.len(),
            "seeded sample board"
        );
        board
    }

    pub fn next_task_id(&self) -> u64 {
        self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    pub fn next_folder_id(&self) -> u64 {
        self.folders.iter().map(|f| f.id).max().unwrap_or(0) + 1
    }

    pub fn task(&self, id: u64) -> PlannerResult<&Task> {
        self.tasks
            .iter()
            .find(|t| t.id == id)
            .ok_or(PlannerError::TaskNotFound(id))
    }

    fn task_mut(&mut self, id: u64) -> PlannerResult<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(PlannerError::TaskNotFound(id))
    }

    pub fn folder(&self, id: u64) -> PlannerResult<&TaskFolder> {
        self.folders
            .iter()
            .find(|f| f.id == id)
            .ok_or(PlannerError::FolderNotFound(id))
    }

    /// Quick-add from the sidebar input. Blank titles are ignored.
    #[tracing::instrument(skip(self))]
    pub fn add_task(&mut self, title: &str) -> Option<&Task> {
        let Some(title) = normalize_title(title) else {
            debug!("ignoring blank quick-add");
            return None;
        };

        let task = Task::new(self.next_task_id(), title);
        info!(id = task.id, uuid = %task.uuid, "added task");
        self.tasks.push(task);
        self.tasks.last()
    }

    /// Saves the create-task dialog.
    #[tracing::instrument(skip(self, draft), fields(title = %draft.title))]
    pub fn create_task(&mut self, draft: TaskDraft) -> PlannerResult<&Task> {
        if let Some(folder_id) = draft.folder_id {
            self.folder(folder_id)?;
        }

        let task = Task::from_draft(self.next_task_id(), draft)?;
        info!(
            id = task.id,
            uuid = %task.uuid,
            folder = ?task.folder_id,
            "created task"
        );
        let idx = self.tasks.len();
        self.tasks.push(task);
        Ok(&self.tasks[idx])
    }

    #[tracing::instrument(skip(self))]
    pub fn toggle_task(&mut self, id: u64) -> PlannerResult<Notice> {
        let task = self.task_mut(id)?;
        task.toggle();
        info!(id, completed = task.completed, "toggled task");

        if task.completed {
            Ok(Notice::success(format!("Completed '{}'", task.title)).celebrating())
        } else {
            Ok(Notice::info(format!("Reopened '{}'", task.title)))
        }
    }

    /// Removes the task together with every event created from it.
    #[tracing::instrument(skip(self))]
    pub fn delete_task(&mut self, id: u64) -> PlannerResult<Notice> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(PlannerError::TaskNotFound(id))?;
        let task = self.tasks.remove(idx);

        let before = self.events.len();
        self.events.retain(|event| event.task_uuid != Some(task.uuid));
        let removed = before - self.events.len();

        info!(id, uuid = %task.uuid, removed_events = removed, "deleted task");

        let message = match removed {
            0 => format!("Deleted '{}'", task.title),
            1 => format!("Deleted '{}' and 1 calendar event", task.title),
            n => format!("Deleted '{}' and {n} calendar events", task.title),
        };
        Ok(Notice::info(message))
    }

    fn push_folder(&mut self, name: String) -> u64 {
        let id = self.next_folder_id();
        self.folders.push(TaskFolder {
            id,
            name,
            collapsed: false,
        });
        id
    }

    #[tracing::instrument(skip(self))]
    pub fn add_folder(&mut self, name: &str) -> Option<&TaskFolder> {
        let Some(name) = normalize_title(name) else {
            debug!("ignoring blank folder name");
            return None;
        };

        let id = self.push_folder(name);
        info!(id, "added folder");
        self.folders.last()
    }

    /// Flips the collapsed flag and returns the new value.
    #[tracing::instrument(skip(self))]
    pub fn toggle_folder(&mut self, id: u64) -> PlannerResult<bool> {
        let folder = self
            .folders
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(PlannerError::FolderNotFound(id))?;
        folder.collapsed = !folder.collapsed;
        debug!(id, collapsed = folder.collapsed, "toggled folder");
        Ok(folder.collapsed)
    }

    /// Tasks that pointed at the folder keep their `folder_id` and show up as
    /// unfiled.
    #[tracing::instrument(skip(self))]
    pub fn delete_folder(&mut self, id: u64) -> PlannerResult<TaskFolder> {
        let idx = self
            .folders
            .iter()
            .position(|f| f.id == id)
            .ok_or(PlannerError::FolderNotFound(id))?;
        let folder = self.folders.remove(idx);

        let orphaned = self
            .tasks
            .iter()
            .filter(|t| t.folder_id == Some(id))
            .count();
        if orphaned > 0 {
            warn!(id, orphaned, "deleted folder still referenced by tasks");
        }
        info!(id, "deleted folder");
        Ok(folder)
    }

    pub fn tasks_in_folder(&self, id: u64) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.folder_id == Some(id))
            .collect()
    }

    /// Tasks without a folder, or whose folder no longer exists.
    pub fn unfiled_tasks(&self) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| match t.folder_id {
                Some(folder_id) => self.folders.iter().all(|f| f.id != folder_id),
                None => true,
            })
            .collect()
    }

    #[tracing::instrument(skip(self))]
    pub fn add_event(&mut self, title: &str, date: NaiveDate) -> PlannerResult<&CalendarEvent> {
        let title = normalize_title(title).ok_or(PlannerError::BlankTitle)?;
        Ok(self.push_event(CalendarEvent::all_day(title, date)))
    }

    fn push_event(&mut self, event: CalendarEvent) -> &CalendarEvent {
        info!(
            uuid = %event.uuid,
            date = %event.date,
            start = ?event.start_time,
            task = ?event.task_uuid,
            "added event"
        );
        let idx = self.events.len();
        self.events.push(event);
        &self.events[idx]
    }

    #[tracing::instrument(skip(self))]
    pub fn delete_event(&mut self, uuid: Uuid) -> PlannerResult<CalendarEvent> {
        let idx = self
            .events
            .iter()
            .position(|e| e.uuid == uuid)
            .ok_or(PlannerError::EventNotFound(uuid))?;
        info!(%uuid, "deleted event");
        Ok(self.events.remove(idx))
    }

    /// Sidebar calendar button: an all-day entry for today.
    #[tracing::instrument(skip(self))]
    pub fn add_to_calendar(&mut self, task_id: u64, today: NaiveDate) -> PlannerResult<Notice> {
        let task = self.task(task_id)?;
        let event = CalendarEvent::all_day(task.title.clone(), today).linked_to(task.uuid);
        self.push_event(event);
        Ok(Notice::success("Task added to calendar"))
    }

    /// Schedule dialog submit. The time range is the only thing validated.
    #[tracing::instrument(skip(self))]
    pub fn schedule_task(
        &mut self,
        task_id: u64,
        date: NaiveDate,
        start: ClockTime,
        end: ClockTime,
    ) -> PlannerResult<Notice> {
        validate_range(start, end)?;
        let task = self.task(task_id)?;
        let title = task.title.clone();
        let event = CalendarEvent::timed(title.clone(), date, start, end).linked_to(task.uuid);
        self.push_event(event);

        Ok(Notice::success(format!(
            "Scheduled '{title}' on {} from {start} to {end}",
            date.format("%b %-d")
        )))
    }

    /// Drop of a sidebar task onto a calendar cell. Ids that do not decode in
    /// the active view are ignored and yield `Ok(None)`.
    #[tracing::instrument(skip(self))]
    pub fn drop_task(
        &mut self,
        task_id: u64,
        target_id: &str,
        view: ViewMode,
        focus: NaiveDate,
    ) -> PlannerResult<Option<Notice>> {
        let task = self.task(task_id)?;
        let Some(slot) = drop_target::decode(target_id, view, focus) else {
            debug!(target_id, "drop target not recognised; ignoring");
            return Ok(None);
        };

        let title = task.title.clone();
        let (event, when) = match slot.hour {
            Some(hour) => {
                let start = ClockTime::on_the_hour(hour);
                let end = start.plus_minutes(task.duration.unwrap_or(DEFAULT_DROP_MINUTES));
                (
                    CalendarEvent::timed(title.clone(), slot.date, start, end),
                    format!("{} at {}", slot.date.format("%a, %b %-d"), hour_label(hour)),
                )
            }
            None => (
                CalendarEvent::all_day(title.clone(), slot.date),
                slot.date.format("%a, %b %-d").to_string(),
            ),
        };
        let event = event.linked_to(task.uuid);
        self.push_event(event);

        Ok(Some(Notice::success(format!("Added '{title}' to {when}"))))
    }

    pub fn events_on(&self, date: NaiveDate) -> Vec<&CalendarEvent> {
        let mut events: Vec<&CalendarEvent> =
            self.events.iter().filter(|e| e.date == date).collect();
        events.sort_by(|a, b| CalendarEvent::chronological(a, b));
        events
    }

    pub fn events_at(&self, date: NaiveDate, hour: u32) -> Vec<&CalendarEvent> {
        self.events_on(date)
            .into_iter()
            .filter(|e| e.slot_hour() == hour)
            .collect()
    }

    pub fn linked_events(&self, task_id: u64) -> PlannerResult<Vec<&CalendarEvent>> {
        let task = self.task(task_id)?;
        Ok(self
            .events
            .iter()
            .filter(|e| e.task_uuid == Some(task.uuid))
            .collect())
    }

    /// Case-insensitive title match across tasks and events.
    pub fn search(&self, query: &str) -> SearchHits<'_> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return SearchHits::default();
        }

        let mut events: Vec<&CalendarEvent> = self
            .events
            .iter()
            .filter(|e| e.title.to_lowercase().contains(&needle))
            .collect();
        events.sort_by(|a, b| CalendarEvent::chronological(a, b));

        SearchHits {
            tasks: self
                .tasks
                .iter()
                .filter(|t| t.title.to_lowercase().contains(&needle))
                .collect(),
            events,
        }
    }
}

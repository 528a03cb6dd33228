use chrono::NaiveDate;
use planboard_core::board::Board;
use planboard_core::calendar::ViewMode;
use planboard_core::clock::ClockTime;
use planboard_core::drop_target::slot_id;
use planboard_core::error::PlannerError;
use planboard_core::task::{Priority, TaskDraft};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date")
}

fn time(raw: &str) -> ClockTime {
    raw.parse().expect("valid clock time")
}

#[test]
fn toggling_twice_restores_completion() {
    let mut board = Board::with_samples(today());
    let before = board.task(2).expect("task 2").completed;

    let first = board.toggle_task(2).expect("toggle once");
    assert!(first.celebrate);
    let second = board.toggle_task(2).expect("toggle twice");
    assert!(!second.celebrate);

    assert_eq!(board.task(2).expect("task 2").completed, before);
}

#[test]
fn deleting_task_cascades_to_linked_events() {
    let mut board = Board::with_samples(today());
    let untouched = board.events.len();

    board
        .add_to_calendar(1, today())
        .expect("add to calendar");
    board
        .schedule_task(1, today(), time("13:00"), time("14:30"))
        .expect("schedule");
    board
        .schedule_task(2, today(), time("15:00"), time("16:00"))
        .expect("schedule other");
    assert_eq!(board.linked_events(1).expect("linked").len(), 2);

    let notice = board.delete_task(1).expect("delete task");
    assert!(notice.message.contains("2 calendar events"));
    assert!(board.task(1).is_err());
    assert_eq!(board.events.len(), untouched + 1);
    assert!(board.events.iter().any(|e| e.title == "Review project proposal"));
}

#[test]
fn scheduling_rejects_non_positive_ranges() {
    let mut board = Board::with_samples(today());
    let events = board.events.len();

    let err = board
        .schedule_task(1, today(), time("10:00"), time("09:00"))
        .expect_err("end before start");
    assert_eq!(err, PlannerError::EndNotAfterStart);
    assert_eq!(err.to_string(), "End time must be after start time!");

    assert!(board
        .schedule_task(1, today(), time("10:00"), time("10:00"))
        .is_err());
    assert_eq!(board.events.len(), events);
}

#[test]
fn scheduled_event_carries_time_range() {
    let mut board = Board::new();
    let id = board.add_task("Dentist").expect("task added").id;
    let date = NaiveDate::from_ymd_opt(2026, 10, 21).expect("valid date");

    board
        .schedule_task(id, date, time("09:00"), time("09:30"))
        .expect("schedule");

    let events = board.events_at(date, 9);
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].time_range_label().as_deref(),
        Some("09:00 - 09:30 (30 min)")
    );
}

#[test]
fn blank_quick_add_is_ignored() {
    let mut board = Board::new();
    assert!(board.add_task("   ").is_none());
    assert!(board.tasks.is_empty());
    assert!(board.add_folder("").is_none());
}

#[test]
fn dialog_draft_creates_detailed_task() {
    let mut board = Board::with_samples(today());
    let mut draft = TaskDraft::new("Quarterly review");
    draft.priority = Priority::High;
    draft.duration = 90;
    draft.folder_id = Some(2);

    let task = board.create_task(draft).expect("create task");
    assert_eq!(task.id, 4);
    assert_eq!(task.priority, Some(Priority::High));
    assert_eq!(task.duration, Some(90));
    assert_eq!(board.tasks_in_folder(2).len(), 2);

    assert_eq!(
        board.create_task(TaskDraft::new("  ")).map(|t| t.id),
        Err(PlannerError::BlankTitle)
    );

    let mut orphan = TaskDraft::new("Nowhere");
    orphan.folder_id = Some(42);
    assert_eq!(
        board.create_task(orphan).map(|t| t.id),
        Err(PlannerError::FolderNotFound(42))
    );
}

#[test]
fn dropping_on_week_slot_creates_timed_event() {
    let mut board = Board::with_samples(today());
    let target = NaiveDate::from_ymd_opt(2026, 10, 20).expect("valid date");

    let notice = board
        .drop_task(2, &slot_id(target, 15), ViewMode::Week, today())
        .expect("drop")
        .expect("drop accepted");
    assert!(notice.message.contains("3 PM"));

    let events = board.events_at(target, 15);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].start_time, Some(time("15:00")));
    assert_eq!(events[0].end_time, Some(time("16:00")));
    assert_eq!(events[0].task_uuid, Some(board.task(2).expect("task").uuid));
}

#[test]
fn dropping_in_day_view_uses_focus_and_task_duration() {
    let mut board = Board::new();
    let mut draft = TaskDraft::new("Deep work");
    draft.duration = 45;
    let id = board.create_task(draft).expect("create").id;

    board
        .drop_task(id, "hour-23", ViewMode::Day, today())
        .expect("drop")
        .expect("drop accepted");
    let events = board.events_at(today(), 23);
    assert_eq!(events[0].end_time, Some(time("23:45")));
}

#[test]
fn unrecognised_drop_targets_are_ignored() {
    let mut board = Board::with_samples(today());
    let events = board.events.len();

    let outcome = board
        .drop_task(1, "hour-9", ViewMode::Month, today())
        .expect("drop");
    assert!(outcome.is_none());
    assert_eq!(board.events.len(), events);

    assert_eq!(
        board.drop_task(99, "hour-9", ViewMode::Day, today()),
        Err(PlannerError::TaskNotFound(99))
    );
}

#[test]
fn deleting_folder_leaves_tasks_unfiled() {
    let mut board = Board::with_samples(today());
    assert!(board.unfiled_tasks().is_empty());

    assert!(board.toggle_folder(1).expect("collapse"));
    let folder = board.delete_folder(1).expect("delete folder");
    assert_eq!(folder.name, "Work");

    let unfiled = board.unfiled_tasks();
    assert_eq!(unfiled.len(), 2);
    assert!(unfiled.iter().all(|t| t.folder_id == Some(1)));
    assert_eq!(board.folder(1), Err(PlannerError::FolderNotFound(1)));
}

#[test]
fn search_matches_tasks_and_events() {
    let board = Board::with_samples(today());
    let hits = board.search("TEAM");
    assert_eq!(hits.tasks.len(), 1);
    assert_eq!(hits.events.len(), 1);
    assert!(board.search("  ").is_empty());
}

#[test]
fn events_on_day_are_chronological() {
    let mut board = Board::new();
    let id = board.add_task("Standup").expect("task").id;
    board
        .schedule_task(id, today(), time("11:00"), time("11:15"))
        .expect("schedule late");
    board
        .schedule_task(id, today(), time("08:00"), time("08:15"))
        .expect("schedule early");
    board.add_event("Holiday", today()).expect("all-day event");

    let titles = board
        .events_on(today())
        .iter()
        .map(|e| e.start_time.map(|t| t.to_string()).unwrap_or_default())
        .collect::<Vec<_>>();
    assert_eq!(titles, vec!["", "08:00", "11:00"]);
}

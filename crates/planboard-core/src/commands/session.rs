//! Scripted replay of sidebar, dialog and calendar interactions against an
//! in-memory [`Board`].
//!
//! Each line is one interaction: `add Buy milk`, `toggle 2`,
//! `drop 1 Tue Oct 20 2026-15`, `view week`, `show`. Blank lines and `#`
//! comments are skipped. A failing line produces an error notice and the
//! replay continues.

use std::io::{BufRead, Write};

use anyhow::anyhow;
use chrono::{NaiveDate, Weekday};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::expand_command_abbrev;
use crate::board::Board;
use crate::calendar::{ViewMode, parse_date, shift_focus};
use crate::clock::ClockTime;
use crate::config::Config;
use crate::notice::Notice;
use crate::render::Renderer;
use crate::task::TaskDraft;

pub fn known_session_commands() -> Vec<&'static str> {
    vec![
        "add", "new", "toggle", "delete", "folder", "fold", "rmfolder", "calendar", "schedule",
        "drop", "event", "unevent", "view", "next", "prev", "today", "goto", "show", "tasks",
        "search", "export",
    ]
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub commands: usize,
    pub failed: usize,
}

#[derive(Debug)]
pub struct Session {
    pub board: Board,
    pub view: ViewMode,
    pub focus: NaiveDate,
    today: NaiveDate,
    week_start: Weekday,
    schedule_defaults: (ClockTime, ClockTime),
    cfg: Config,
    renderer: Renderer,
}

impl Session {
    pub fn new(board: Board, cfg: &Config, renderer: Renderer, today: NaiveDate) -> Self {
        Self {
            board,
            view: cfg.default_view(),
            focus: today,
            today,
            week_start: cfg.week_start(),
            schedule_defaults: cfg.schedule_defaults(),
            cfg: cfg.clone(),
            renderer,
        }
    }

    #[instrument(skip_all)]
    pub fn run_script<R: BufRead, W: Write>(
        &mut self,
        mut reader: R,
        out: &mut W,
    ) -> anyhow::Result<SessionSummary> {
        let mut summary = SessionSummary::default();
        let mut buf = Vec::new();
        let mut line_num = 0;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_num += 1;

            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line,
                Err(err) => {
                    summary.commands += 1;
                    summary.failed += 1;
                    warn!(line = line_num, error = %err, "session line is not valid UTF-8");
                    self.renderer.print_notice(
                        out,
                        &Notice::error(format!("line {line_num}: not valid UTF-8 ({err})")),
                    )?;
                    continue;
                }
            };
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            summary.commands += 1;
            if let Err(err) = self.execute(trimmed, out) {
                summary.failed += 1;
                warn!(line = line_num, error = %err, "session command failed");
                self.renderer
                    .print_notice(out, &Notice::error(format!("line {line_num}: {err}")))?;
            }
        }

        Ok(summary)
    }

    /// Runs a single interaction line.
    #[instrument(skip(self, out))]
    pub fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> anyhow::Result<()> {
        let (head, rest) = match line.trim().split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line.trim(), ""),
        };

        let known = known_session_commands();
        let command = expand_command_abbrev(head, &known)
            .ok_or_else(|| anyhow!("unknown or ambiguous command: {head}"))?;
        debug!(command, args = rest, "session command");

        let notice = match command {
            "add" => self
                .board
                .add_task(&unquote(rest))
                .map(|task| Notice::success(format!("Added task {} '{}'", task.id, task.title))),
            "new" => {
                let draft = self.parse_draft(rest)?;
                let task = self.board.create_task(draft)?;
                Some(Notice::success(format!("Created task {} '{}'", task.id, task.title)))
            }
            "toggle" => Some(self.board.toggle_task(parse_id(rest)?)?),
            "delete" => Some(self.board.delete_task(parse_id(rest)?)?),
            "folder" => self
                .board
                .add_folder(&unquote(rest))
                .map(|folder| Notice::success(format!("Added folder {} '{}'", folder.id, folder.name))),
            "fold" => {
                let id = parse_id(rest)?;
                let collapsed = self.board.toggle_folder(id)?;
                let state = if collapsed { "collapsed" } else { "expanded" };
                Some(Notice::info(format!("Folder {id} {state}")))
            }
            "rmfolder" => {
                let folder = self.board.delete_folder(parse_id(rest)?)?;
                Some(Notice::info(format!("Deleted folder '{}'", folder.name)))
            }
            "calendar" => Some(self.board.add_to_calendar(parse_id(rest)?, self.today)?),
            "schedule" => Some(self.schedule(rest)?),
            "drop" => {
                let (id, target) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| anyhow!("usage: drop <task-id> <target-id>"))?;
                let notice = self
                    .board
                    .drop_task(parse_id(id)?, target.trim(), self.view, self.focus)?;
                if notice.is_none() {
                    info!(target_id = target, view = %self.view, "drop ignored");
                }
                notice
            }
            "event" => {
                let (date, title) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| anyhow!("usage: event <YYYY-MM-DD> <title>"))?;
                let event = self.board.add_event(&unquote(title), parse_date(date)?)?;
                Some(Notice::success(format!("Added event {}", event.uuid)))
            }
            "unevent" => {
                let uuid = Uuid::parse_str(rest).map_err(|e| anyhow!("invalid event id {rest}: {e}"))?;
                let event = self.board.delete_event(uuid)?;
                Some(Notice::info(format!("Removed event '{}'", event.title)))
            }
            "view" => {
                self.view = rest.parse::<ViewMode>()?;
                Some(Notice::info(format!("{} view", self.view.label())))
            }
            "next" => {
                self.focus = shift_focus(self.focus, self.view, 1);
                None
            }
            "prev" => {
                self.focus = shift_focus(self.focus, self.view, -1);
                None
            }
            "today" => {
                self.focus = self.today;
                None
            }
            "goto" => {
                self.focus = parse_date(rest)?;
                None
            }
            "show" => {
                self.renderer.print_view(
                    out,
                    &self.board,
                    self.view,
                    self.focus,
                    self.week_start,
                    self.today,
                )?;
                None
            }
            "tasks" => {
                self.renderer.print_sidebar(out, &self.board)?;
                None
            }
            "search" => {
                let hits = self.board.search(rest);
                self.renderer.print_search(out, &hits)?;
                None
            }
            "export" => {
                self.renderer.print_json(out, &self.board)?;
                None
            }
            other => return Err(anyhow!("unhandled session command: {other}")),
        };

        if let Some(notice) = notice {
            self.renderer.print_notice(out, &notice)?;
        }
        Ok(())
    }

    /// `schedule <task-id> [YYYY-MM-DD] [HH:MM HH:MM]`; omitted parts fall
    /// back to today and the configured default range.
    fn schedule(&mut self, rest: &str) -> anyhow::Result<Notice> {
        let parts = rest.split_whitespace().collect::<Vec<_>>();
        let (id, tail) = parts
            .split_first()
            .ok_or_else(|| anyhow!("usage: schedule <task-id> [date] [start end]"))?;
        let id = parse_id(id)?;

        let (date, times) = match tail.first() {
            Some(first) if first.contains('-') => (parse_date(first)?, &tail[1..]),
            _ => (self.today, tail),
        };

        let (start, end) = match times {
            [] => self.schedule_defaults,
            [start, end] => (start.parse::<ClockTime>()?, end.parse::<ClockTime>()?),
            _ => return Err(anyhow!("expected both a start and an end time")),
        };

        Ok(self.board.schedule_task(id, date, start, end)?)
    }

    /// `new` takes title words plus optional `key:value` fields.
    fn parse_draft(&self, rest: &str) -> anyhow::Result<TaskDraft> {
        let mut draft = self.cfg.task_draft("");
        draft.folder_id = self.board.folders.first().map(|f| f.id);

        let mut title = Vec::new();
        for token in rest.split_whitespace() {
            let Some((key, value)) = token.split_once(':') else {
                title.push(token);
                continue;
            };
            match key {
                "difficulty" => draft.difficulty = value.parse()?,
                "priority" => draft.priority = value.parse()?,
                "duration" => {
                    draft.duration = value
                        .parse::<u32>()
                        .ok()
                        .filter(|minutes| *minutes > 0)
                        .ok_or_else(|| anyhow!("duration must be a positive number of minutes"))?
                }
                "due" => draft.due_date = Some(parse_date(value)?),
                "folder" => draft.folder_id = Some(parse_id(value)?),
                _ => title.push(token),
            }
        }

        draft.title = unquote(&title.join(" "));
        Ok(draft)
    }
}

fn parse_id(raw: &str) -> anyhow::Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| anyhow!("expected a numeric id, got: {raw}"))
}

fn unquote(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed)
        .to_string()
}

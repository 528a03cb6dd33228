use std::io::{self, IsTerminal, Write};

use chrono::{Datelike, NaiveDate, Weekday};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::board::{Board, SearchHits};
use crate::calendar::{
    HOURS_PER_DAY, ViewMode, hour_label, month_cells, period_label, visible_dates, weekday_labels,
};
use crate::config::Config;
use crate::event::CalendarEvent;
use crate::notice::{Notice, NoticeLevel};
use crate::task::Task;

const MONTH_CELL_WIDTH: usize = 14;
const MONTH_CELL_EVENTS: usize = 3;
const SLOT_CELL_WIDTH: usize = 18;
const HOUR_GUTTER_WIDTH: usize = 6;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> Self {
        Self {
            color: cfg.display.color && io::stdout().is_terminal(),
        }
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    /// Dispatches to the month grid or the hour-slot grid for `view`.
    #[tracing::instrument(skip(self, out, board))]
    pub fn print_view<W: Write>(
        &self,
        out: &mut W,
        board: &Board,
        view: ViewMode,
        focus: NaiveDate,
        week_start: Weekday,
        today: NaiveDate,
    ) -> anyhow::Result<()> {
        if view.has_hour_slots() {
            self.print_time_grid(out, board, view, focus, week_start, today)
        } else {
            self.print_month(out, board, focus, week_start, today)
        }
    }

    pub fn print_month<W: Write>(
        &self,
        out: &mut W,
        board: &Board,
        focus: NaiveDate,
        week_start: Weekday,
        today: NaiveDate,
    ) -> anyhow::Result<()> {
        let title = period_label(focus, ViewMode::Month, week_start);
        writeln!(out, "{}", self.paint(&title, "1"))?;

        let header = weekday_labels(week_start)
            .into_iter()
            .map(|label| fit(label, MONTH_CELL_WIDTH))
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(out, "{header}")?;

        let cells = month_cells(focus.year(), focus.month(), week_start)?;
        for week in cells.chunks(7) {
            let mut lines = vec![String::new(); MONTH_CELL_EVENTS + 1];

            for (col, cell) in week.iter().enumerate() {
                let sep = if col == 0 { "" } else { " " };
                let (head, entries) = match cell {
                    Some(day) => {
                        let head = if *day == today {
                            self.paint(&fit(&format!("[{}]", day.day()), MONTH_CELL_WIDTH), "7")
                        } else {
                            fit(&day.day().to_string(), MONTH_CELL_WIDTH)
                        };
                        (head, month_cell_entries(board.events_on(*day)))
                    }
                    None => (fit("", MONTH_CELL_WIDTH), vec![]),
                };

                lines[0].push_str(sep);
                lines[0].push_str(&head);
                for (row, line) in lines.iter_mut().enumerate().skip(1) {
                    let entry = entries.get(row - 1).map(String::as_str).unwrap_or("");
                    line.push_str(sep);
                    line.push_str(&fit(entry, MONTH_CELL_WIDTH));
                }
            }

            for line in lines {
                if !line.trim().is_empty() {
                    writeln!(out, "{}", line.trim_end())?;
                }
            }
            writeln!(out)?;
        }

        Ok(())
    }

    pub fn print_time_grid<W: Write>(
        &self,
        out: &mut W,
        board: &Board,
        view: ViewMode,
        focus: NaiveDate,
        week_start: Weekday,
        today: NaiveDate,
    ) -> anyhow::Result<()> {
        let title = period_label(focus, view, week_start);
        writeln!(out, "{}", self.paint(&title, "1"))?;

        let days = visible_dates(focus, view, week_start);

        let mut header = fit("", HOUR_GUTTER_WIDTH);
        for day in &days {
            let label = day.format("%a %-d").to_string();
            let label = if *day == today {
                self.paint(&fit(&format!("[{label}]"), SLOT_CELL_WIDTH), "7")
            } else {
                fit(&label, SLOT_CELL_WIDTH)
            };
            header.push(' ');
            header.push_str(&label);
        }
        writeln!(out, "{}", header.trim_end())?;

        for hour in 0..HOURS_PER_DAY {
            let mut line = fit(&hour_label(hour), HOUR_GUTTER_WIDTH);
            for day in &days {
                let titles = board
                    .events_at(*day, hour)
                    .into_iter()
                    .map(|event| event.title.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                line.push(' ');
                line.push_str(&fit(&titles, SLOT_CELL_WIDTH));
            }
            writeln!(out, "{}", line.trim_end())?;
        }

        let listed = days
            .iter()
            .flat_map(|day| board.events_on(*day))
            .collect::<Vec<_>>();
        if !listed.is_empty() {
            writeln!(out)?;
            writeln!(out, "{}", self.paint(events_heading(view), "1"))?;
            self.print_events(out, &listed)?;
        }

        Ok(())
    }

    #[tracing::instrument(skip(self, out, board))]
    pub fn print_sidebar<W: Write>(&self, out: &mut W, board: &Board) -> anyhow::Result<()> {
        writeln!(out, "{}", self.paint("Tasks", "1"))?;

        for folder in &board.folders {
            let tasks = board.tasks_in_folder(folder.id);
            let marker = if folder.collapsed { "+" } else { "-" };
            writeln!(
                out,
                "{marker} {} {} ({})",
                self.paint(&format!("#{}", folder.id), "33"),
                folder.name,
                tasks.len()
            )?;
            if folder.collapsed {
                continue;
            }
            for task in tasks {
                writeln!(out, "    {}", self.task_line(task))?;
            }
        }

        let unfiled = board.unfiled_tasks();
        if !unfiled.is_empty() {
            writeln!(out, "  Unfiled ({})", unfiled.len())?;
            for task in unfiled {
                writeln!(out, "    {}", self.task_line(task))?;
            }
        }

        Ok(())
    }

    fn task_line(&self, task: &Task) -> String {
        let check = if task.completed { "[x]" } else { "[ ]" };
        let id = self.paint(&task.id.to_string(), "33");
        let title = if task.completed {
            self.paint(&task.title, "9")
        } else {
            task.title.clone()
        };

        let mut details = vec![];
        if let Some(due) = task.due_date {
            details.push(format!("due {}", due.format("%Y-%m-%d")));
        }
        if let Some(priority) = task.priority {
            details.push(priority.to_string());
        }
        if let Some(difficulty) = task.difficulty {
            details.push(difficulty.to_string());
        }
        if let Some(duration) = task.duration {
            details.push(format!("{duration} min"));
        }

        if details.is_empty() {
            format!("{check} {id} {title}")
        } else {
            format!("{check} {id} {title}  ({})", details.join(", "))
        }
    }

    pub fn print_events<W: Write>(
        &self,
        out: &mut W,
        events: &[&CalendarEvent],
    ) -> anyhow::Result<()> {
        for event in events {
            let when = event
                .time_range_label()
                .unwrap_or_else(|| "all day".to_string());
            writeln!(
                out,
                "{}  {}  {}",
                event.date.format("%a %b %d %Y"),
                when,
                event.title
            )?;
        }
        Ok(())
    }

    pub fn print_search<W: Write>(&self, out: &mut W, hits: &SearchHits<'_>) -> anyhow::Result<()> {
        if hits.is_empty() {
            writeln!(out, "No matches.")?;
            return Ok(());
        }
        for task in &hits.tasks {
            writeln!(out, "task   {}", self.task_line(task))?;
        }
        for event in &hits.events {
            write!(out, "event  ")?;
            self.print_events(out, &[*event])?;
        }
        Ok(())
    }

    pub fn print_notice<W: Write>(&self, out: &mut W, notice: &Notice) -> anyhow::Result<()> {
        let (mark, code) = match notice.level {
            NoticeLevel::Success => ("ok", "32"),
            NoticeLevel::Info => ("--", "36"),
            NoticeLevel::Error => ("!!", "31"),
        };
        let suffix = if notice.celebrate { " \u{1F389}" } else { "" };
        writeln!(out, "{} {}{suffix}", self.paint(mark, code), notice.message)?;
        Ok(())
    }

    pub fn print_json<W: Write>(&self, out: &mut W, board: &Board) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut *out, board)?;
        writeln!(out)?;
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn events_heading(view: ViewMode) -> &'static str {
    match view {
        ViewMode::Day => "Today's Events",
        ViewMode::FourDay => "Upcoming Events",
        ViewMode::Week => "This Week's Events",
        ViewMode::Month => "This Month's Events",
    }
}

fn month_cell_entries(events: Vec<&CalendarEvent>) -> Vec<String> {
    let total = events.len();
    if total <= MONTH_CELL_EVENTS {
        return events.into_iter().map(|e| e.title.clone()).collect();
    }

    let mut entries = events
        .into_iter()
        .take(MONTH_CELL_EVENTS - 1)
        .map(|e| e.title.clone())
        .collect::<Vec<_>>();
    entries.push(format!("+{} more", total - (MONTH_CELL_EVENTS - 1)));
    entries
}

/// Pads or truncates `text` to exactly `width` display columns.
fn fit(text: &str, width: usize) -> String {
    let visible = UnicodeWidthStr::width(strip_ansi(text).as_str());
    if visible <= width {
        return format!("{text}{}", " ".repeat(width - visible));
    }

    let mut out = String::with_capacity(width);
    let mut used = 0;
    for ch in text.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('~');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}

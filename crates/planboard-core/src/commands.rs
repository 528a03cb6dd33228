mod session;

pub use session::{Session, SessionSummary};

use std::fs::File;
use std::io::{self, BufReader, Write};

use anyhow::Context;
use tracing::{debug, info, instrument};

use crate::board::Board;
use crate::calendar::{days_in_month, week_dates};
use crate::cli::Command;
use crate::clock::calculate_duration;
use crate::config::Config;
use crate::drop_target;
use crate::render::Renderer;

pub fn expand_command_abbrev<'a>(token: &'a str, known: &[&'a str]) -> Option<&'a str> {
    if known.contains(&token) {
        return Some(token);
    }

    let mut matches = known.iter().copied().filter(|name| name.starts_with(token));
    let first = matches.next()?;
    if matches.next().is_some() {
        None
    } else {
        Some(first)
    }
}

#[instrument(skip(cfg, renderer, out))]
pub fn dispatch<W: Write>(
    command: Command,
    cfg: &Config,
    renderer: &Renderer,
    empty: bool,
    out: &mut W,
) -> anyhow::Result<()> {
    let today = cfg.today();
    let board = if empty {
        Board::new()
    } else {
        Board::with_samples(today)
    };
    debug!(%today, empty, "board ready");

    match command {
        Command::Show { view, date } => {
            let view = view.unwrap_or_else(|| cfg.default_view());
            let focus = date.unwrap_or(today);
            info!(%view, %focus, "command show");
            renderer.print_view(out, &board, view, focus, cfg.week_start(), today)
        }
        Command::Tasks => renderer.print_sidebar(out, &board),
        Command::Duration { start, end } => {
            writeln!(out, "{}", calculate_duration(&start, &end))?;
            Ok(())
        }
        Command::Week { date } => {
            for day in week_dates(date, cfg.week_start()) {
                writeln!(out, "{}", day.format("%Y-%m-%d %a"))?;
            }
            Ok(())
        }
        Command::MonthDays { year, month } => {
            writeln!(out, "{}", days_in_month(year, month)?)?;
            Ok(())
        }
        Command::DecodeDrop { id, view, date } => {
            let view = view.unwrap_or_else(|| cfg.default_view());
            let focus = date.unwrap_or(today);
            match drop_target::decode(&id, view, focus) {
                Some(slot) => match slot.hour {
                    Some(hour) => writeln!(out, "{} {hour:02}:00", slot.date.format("%Y-%m-%d"))?,
                    None => writeln!(out, "{}", slot.date.format("%Y-%m-%d"))?,
                },
                None => anyhow::bail!("'{id}' is not a drop target in the {view} view"),
            }
            Ok(())
        }
        Command::Session { file } => {
            let mut session = Session::new(board, cfg, renderer.clone(), today);
            let summary = match file {
                Some(path) => {
                    let handle = File::open(&path)
                        .with_context(|| format!("failed to open {}", path.display()))?;
                    session.run_script(BufReader::new(handle), out)?
                }
                None => session.run_script(io::stdin().lock(), out)?,
            };
            info!(
                commands = summary.commands,
                failed = summary.failed,
                "session finished"
            );
            Ok(())
        }
        Command::Export => renderer.print_json(out, &board),
    }
}

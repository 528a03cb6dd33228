pub mod board;
pub mod calendar;
pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod drop_target;
pub mod error;
pub mod event;
pub mod notice;
pub mod render;
pub mod task;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting planboard"
  );
  debug!(overrides = ?cli.rc_overrides, "rc overrides");

  let mut cfg = config::Config::load(
    cli.config.as_deref()
  )
  .context("failed to load config")?;
  cfg
    .apply_overrides(
      cli
        .rc_overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    )
    .context(
      "failed to apply --rc overrides"
    )?;

  let renderer =
    render::Renderer::new(&cfg);
  let command =
    cli.command.unwrap_or(
      cli::Command::Show {
        view: None,
        date: None
      }
    );

  let mut out =
    std::io::stdout().lock();
  commands::dispatch(
    command,
    &cfg,
    &renderer,
    cli.empty,
    &mut out
  )?;

  info!("done");
  Ok(())
}

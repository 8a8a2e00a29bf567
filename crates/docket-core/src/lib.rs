//! Paperwork tracking: status derivation, filtering, sorting and month
//! calendars over an in-memory collection, plus the `docket` command line.
//!
//! The engine modules ([`datetime`], [`status`], [`filter`], [`sort`],
//! [`calendar`], [`agenda`]) are pure and synchronous. They never fail;
//! degraded input is logged through `tracing` and handled by fallback.

pub mod agenda;
pub mod calendar;
pub mod cli;
pub mod commands;
pub mod config;
pub mod datastore;
pub mod datetime;
pub mod debounce;
pub mod filter;
pub mod paperwork;
pub mod render;
pub mod retrieval;
pub mod sort;
pub mod status;
pub mod submission;

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
  let pre =
    cli::preprocess_args(&raw_args)?;
  let cli = cli::GlobalCli::parse_from(
    pre.cleaned_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting docket CLI"
  );
  debug!(?pre.rc_overrides, "preprocessed rc overrides");

  let mut cfg = config::Config::load(
    cli.docketrc.as_deref()
  )?;
  cfg.apply_overrides(
    pre.rc_overrides.into_iter().chain(
      cli
        .rc_overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    )
  );

  let data_file =
    config::resolve_data_file(
      &cfg,
      cli.data.as_deref()
    )
    .context(
      "failed to resolve paperwork \
       data file"
    )?;

  let store =
    datastore::PaperworkStore::open(
      &data_file
    );
  let renderer =
    render::Renderer::new(&cfg);
  let today =
    cli.today.unwrap_or_else(datetime::today);
  debug!(today = %datetime::format_date(today), "resolved today");

  commands::dispatch(
    &store,
    &cfg,
    &renderer,
    cli.command,
    today
  )?;

  info!("done");
  Ok(())
}

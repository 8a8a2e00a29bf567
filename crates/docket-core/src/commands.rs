use std::io::{self, Write};

use anyhow::{Context, anyhow};
use chrono::{Datelike, NaiveDate};
use tracing::{debug, info, instrument};

use crate::agenda::DayIndex;
use crate::calendar::CalendarMonth;
use crate::cli::{Command, ListArgs, SubmitArgs};
use crate::config::Config;
use crate::datastore::PaperworkStore;
use crate::datetime::{first_day_of_month, parse_month};
use crate::filter::PaperworkFilter;
use crate::paperwork::Paperwork;
use crate::render::Renderer;
use crate::sort::PaperworkQuery;
use crate::submission::Submission;

/// Runs one subcommand against the store. With no subcommand, lists
/// everything using the configured sort.
#[instrument(skip(store, cfg, renderer, command))]
pub fn dispatch(
    store: &PaperworkStore,
    cfg: &Config,
    renderer: &Renderer,
    command: Option<Command>,
    today: NaiveDate,
) -> anyhow::Result<()> {
    let command = command.unwrap_or_else(|| Command::List(ListArgs::default()));
    debug!(?command, "dispatching command");

    let mut out = io::stdout().lock();
    match command {
        Command::List(args) => cmd_list(&mut out, store, cfg, renderer, args, today),
        Command::Info { id } => cmd_info(&mut out, store, renderer, &id, today),
        Command::Calendar { month } => {
            cmd_calendar(&mut out, store, cfg, renderer, month.as_deref(), today)
        }
        Command::Day { date } => cmd_day(&mut out, store, renderer, date, today),
        Command::Submit(args) => cmd_submit(&mut out, store, args, today),
    }
}

pub fn build_query(cfg: &Config, args: ListArgs) -> anyhow::Result<PaperworkQuery> {
    let key = match args.sort {
        Some(key) => key,
        None => cfg.sort_key()?,
    };
    let direction = match args.direction {
        Some(direction) => direction,
        None => cfg.sort_direction()?,
    };

    Ok(PaperworkQuery::new(
        PaperworkFilter::new(&args.search, args.priorities, args.statuses),
        key,
        direction,
    ))
}

pub fn find_paperwork<'a>(papers: &'a [Paperwork], id: &str) -> anyhow::Result<&'a Paperwork> {
    let wanted = id.trim();
    papers
        .iter()
        .find(|p| p.id.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| anyhow!("no paperwork with id {wanted}"))
}

fn cmd_list<W: Write>(
    out: &mut W,
    store: &PaperworkStore,
    cfg: &Config,
    renderer: &Renderer,
    args: ListArgs,
    today: NaiveDate,
) -> anyhow::Result<()> {
    let papers = store.load(today)?;
    let query = build_query(cfg, args)?;
    let shown = query.apply(&papers, today);
    info!(
        total = papers.len(),
        shown = shown.len(),
        key = %query.key,
        direction = %query.direction,
        "listing paperwork"
    );
    renderer.write_paperwork_table(out, &shown, today)
}

fn cmd_info<W: Write>(
    out: &mut W,
    store: &PaperworkStore,
    renderer: &Renderer,
    id: &str,
    today: NaiveDate,
) -> anyhow::Result<()> {
    let papers = store.load(today)?;
    let paper = find_paperwork(&papers, id)?;
    renderer.write_paperwork_info(out, paper, today)
}

fn cmd_calendar<W: Write>(
    out: &mut W,
    store: &PaperworkStore,
    cfg: &Config,
    renderer: &Renderer,
    month: Option<&str>,
    today: NaiveDate,
) -> anyhow::Result<()> {
    let (year, month) = match month {
        Some(raw) => parse_month(raw).with_context(|| format!("invalid --month {raw:?}"))?,
        None => (today.year(), today.month()),
    };
    debug!(first = %first_day_of_month(year, month), "resolved calendar month");

    let grid = CalendarMonth::build(year, month, cfg.week_start()?);
    let papers = store.load(today)?;
    let index = DayIndex::group_by_date(&papers);
    renderer.write_calendar(out, &grid, &index, cfg.max_visible()?, today)
}

fn cmd_day<W: Write>(
    out: &mut W,
    store: &PaperworkStore,
    renderer: &Renderer,
    date: NaiveDate,
    today: NaiveDate,
) -> anyhow::Result<()> {
    let papers = store.load(today)?;
    let index = DayIndex::group_by_date(&papers);
    renderer.write_day(out, date, &index, today)
}

fn cmd_submit<W: Write>(
    out: &mut W,
    store: &PaperworkStore,
    args: SubmitArgs,
    today: NaiveDate,
) -> anyhow::Result<()> {
    let submission = Submission {
        title: args.title,
        description: args.description,
        paper_type: args.paper_type,
        paper_source: args.paper_source,
        priority: args.priority,
        target_completion_date: args.due,
    };
    let paper = store.submit(submission, today)?;
    writeln!(out, "Submitted paperwork {}.", paper.id)?;
    Ok(())
}

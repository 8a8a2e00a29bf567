use std::io::{self, IsTerminal, Write};

use chrono::{Datelike, NaiveDate};
use unicode_width::UnicodeWidthStr;

use crate::agenda::{DayHighlight, DayIndex, split_visible};
use crate::calendar::CalendarMonth;
use crate::config::Config;
use crate::datetime::format_date;
use crate::paperwork::{Paperwork, count_text};
use crate::status::{Status, classify};

const CALENDAR_CELL_WIDTH: usize = 14;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    /// Colour needs both `color` on and a terminal on stdout.
    pub fn new(cfg: &Config) -> Self {
        let color = cfg.get_bool("color").unwrap_or(true);
        Self {
            color: color && io::stdout().is_terminal(),
        }
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    #[tracing::instrument(skip(self, out, papers, today))]
    pub fn write_paperwork_table<W: Write>(
        &self,
        mut out: W,
        papers: &[Paperwork],
        today: NaiveDate,
    ) -> anyhow::Result<()> {
        let headers = ["ID", "Due", "Priority", "Status", "Title"]
            .map(str::to_string)
            .to_vec();

        let rows = papers
            .iter()
            .map(|paper| {
                let status = classify(paper, today);
                vec![
                    self.paint(&paper.id, "33"),
                    paper
                        .target_completion_date
                        .map(format_date)
                        .unwrap_or_default(),
                    paper.priority.map(|p| p.to_string()).unwrap_or_default(),
                    self.paint_status(status),
                    paper.title.clone(),
                ]
            })
            .collect();

        write_table(&mut out, headers, rows)?;
        writeln!(out)?;
        writeln!(out, "{}", count_text(papers.len()))?;
        Ok(())
    }

    #[tracing::instrument(skip(self, out, paper, today), fields(id = %paper.id))]
    pub fn write_paperwork_info<W: Write>(
        &self,
        mut out: W,
        paper: &Paperwork,
        today: NaiveDate,
    ) -> anyhow::Result<()> {
        writeln!(out, "id          {}", paper.id)?;
        writeln!(out, "title       {}", paper.title)?;
        writeln!(
            out,
            "description {}",
            paper.description.as_deref().unwrap_or_default()
        )?;
        writeln!(
            out,
            "priority    {}",
            paper.priority.map(|p| p.to_string()).unwrap_or_default()
        )?;
        writeln!(out, "status      {}", self.paint_status(classify(paper, today)))?;

        if let Some(due) = paper.target_completion_date {
            writeln!(out, "due         {}", format_date(due))?;
        }
        if let Some(done) = paper.actual_completion_date {
            writeln!(out, "completed   {}", format_date(done))?;
        }
        if let Some(label) = paper.date_label() {
            writeln!(out, "            {label}")?;
        }

        Ok(())
    }

    /// Month grid. Each cell shows the day number with a highlight marker
    /// (`!` overdue, `*` has items) and the first titles due that day.
    #[tracing::instrument(skip_all, fields(year = grid.year(), month = grid.month()))]
    pub fn write_calendar<W: Write>(
        &self,
        mut out: W,
        grid: &CalendarMonth,
        index: &DayIndex<'_>,
        max_visible: usize,
        today: NaiveDate,
    ) -> anyhow::Result<()> {
        let total_width = (CALENDAR_CELL_WIDTH + 1) * 7;
        writeln!(out, "{:^total_width$}", grid.title())?;

        for label in grid.week_start().labels() {
            write!(out, "{} ", pad(label, CALENDAR_CELL_WIDTH))?;
        }
        writeln!(out)?;
        writeln!(out, "{}", "-".repeat(total_width))?;

        for week in grid.weeks() {
            let cells: Vec<Vec<String>> = week
                .iter()
                .map(|cell| match cell {
                    Some(day) => self.calendar_cell(*day, index, max_visible, today),
                    None => vec![],
                })
                .collect();
            let height = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);

            for line in 0..height {
                for cell in &cells {
                    let text = cell.get(line).map(String::as_str).unwrap_or("");
                    write!(out, "{} ", pad(text, CALENDAR_CELL_WIDTH))?;
                }
                writeln!(out)?;
            }
            writeln!(out)?;
        }

        Ok(())
    }

    #[tracing::instrument(skip(self, out, index, today))]
    pub fn write_day<W: Write>(
        &self,
        mut out: W,
        day: NaiveDate,
        index: &DayIndex<'_>,
        today: NaiveDate,
    ) -> anyhow::Result<()> {
        let records = index.records_for_day(day);
        writeln!(
            out,
            "{} ({})",
            format_date(day),
            count_text(records.len())
        )?;

        for paper in records {
            writeln!(
                out,
                "  {} {:<8} {}",
                pad(&self.paint_status(classify(paper, today)), 10),
                paper.priority.map(|p| p.to_string()).unwrap_or_default(),
                paper.title
            )?;
        }

        Ok(())
    }

    fn calendar_cell(
        &self,
        day: NaiveDate,
        index: &DayIndex<'_>,
        max_visible: usize,
        today: NaiveDate,
    ) -> Vec<String> {
        let marker = match index.day_highlight(day, today) {
            DayHighlight::HasOverdue => "!",
            DayHighlight::HasActive => "*",
            DayHighlight::None => "",
        };
        let marker = if day == today {
            format!("{marker}<")
        } else {
            marker.to_string()
        };

        let mut lines = vec![format!("{:>2}{marker}", day.day())];
        let (visible, remaining) = split_visible(index.records_for_day(day), max_visible);
        lines.extend(
            visible
                .iter()
                .map(|paper| truncate(&paper.title, CALENDAR_CELL_WIDTH)),
        );
        if remaining > 0 {
            lines.push(format!("+{remaining} more"));
        }
        lines
    }

    fn paint_status(&self, status: Status) -> String {
        let code = match status {
            Status::Overdue => "31",
            Status::Active => "34",
            Status::Delayed => "33",
            Status::Punctual => "32",
        };
        self.paint(status.as_str(), code)
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn pad(text: &str, width: usize) -> String {
    let visible = UnicodeWidthStr::width(strip_ansi(text).as_str());
    format!("{text}{}", " ".repeat(width.saturating_sub(visible)))
}

fn truncate(text: &str, width: usize) -> String {
    if UnicodeWidthStr::width(text) <= width {
        return text.to_string();
    }

    let mut out = String::new();
    for ch in text.chars() {
        let next = format!("{out}{ch}");
        if UnicodeWidthStr::width(next.as_str()) + 1 > width {
            break;
        }
        out = next;
    }
    out.push('…');
    out
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{} ", pad(&headers[idx], widths[idx]))?;
    }
    writeln!(writer)?;

    for &width in &widths {
        write!(writer, "{:-<width$} ", "")?;
    }
    writeln!(writer)?;

    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            write!(writer, "{} ", pad(cell, widths[idx]))?;
        }
        writeln!(writer)?;
    }

    Ok(())
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

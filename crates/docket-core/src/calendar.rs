use std::str::FromStr;

use anyhow::anyhow;
use chrono::{
  Datelike,
  NaiveDate,
  Weekday
};
use tracing::{
  debug,
  warn
};

use crate::datetime::{
  first_day_of_month,
  last_day_of_month,
  shift_months
};

pub const DAYS_PER_WEEK: usize = 7;

/// One row of the month grid. `None`
/// marks a padding cell outside the
/// month.
pub type Week = [Option<NaiveDate>; DAYS_PER_WEEK];

/// First column of the grid.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default,
)]
pub enum WeekStart {
  #[default]
  Sunday,
  Monday
}

impl WeekStart {
  pub fn weekday(self) -> Weekday {
    match self {
      | WeekStart::Sunday => Weekday::Sun,
      | WeekStart::Monday => Weekday::Mon
    }
  }

  /// Cell offset of `day` within a row.
  fn column(
    self,
    day: Weekday
  ) -> usize {
    let day_idx =
      day.num_days_from_monday() as usize;
    let start_idx = self
      .weekday()
      .num_days_from_monday()
      as usize;
    (DAYS_PER_WEEK + day_idx - start_idx)
      % DAYS_PER_WEEK
  }

  /// Two-letter column headers in grid
  /// order.
  pub fn labels(
    self
  ) -> [&'static str; DAYS_PER_WEEK] {
    match self {
      | WeekStart::Sunday => {
        ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"]
      }
      | WeekStart::Monday => {
        ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"]
      }
    }
  }
}

impl FromStr for WeekStart {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    match s
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "sunday" | "sun" => {
        Ok(WeekStart::Sunday)
      }
      | "monday" | "mon" => {
        Ok(WeekStart::Monday)
      }
      | other => Err(anyhow!(
        "unsupported week start: {other}"
      ))
    }
  }
}

/// Padded-week month grid: every day of
/// the month appears exactly once,
/// leading and trailing gaps are `None`,
/// and rows always hold seven cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarMonth {
  year:       i32,
  month:      u32,
  week_start: WeekStart,
  weeks:      Vec<Week>
}

impl CalendarMonth {
  #[tracing::instrument]
  pub fn build(
    year: i32,
    month: u32,
    week_start: WeekStart
  ) -> Self {
    if NaiveDate::from_ymd_opt(year, month, 1)
      .is_none()
    {
      warn!(
        year,
        month,
        "month out of range; empty grid"
      );
      return Self {
        year,
        month,
        week_start,
        weeks: Vec::new()
      };
    }

    let first =
      first_day_of_month(year, month);
    let last =
      last_day_of_month(year, month);

    let leading =
      week_start.column(first.weekday());
    let mut cells: Vec<Option<NaiveDate>> =
      vec![None; leading];
    cells.extend(
      first
        .iter_days()
        .take_while(|day| *day <= last)
        .map(Some)
    );
    let trailing = (DAYS_PER_WEEK
      - cells.len() % DAYS_PER_WEEK)
      % DAYS_PER_WEEK;
    cells.extend(
      std::iter::repeat_n(None, trailing)
    );

    let weeks: Vec<Week> = cells
      .chunks_exact(DAYS_PER_WEEK)
      .map(|chunk| {
        let mut week: Week =
          [None; DAYS_PER_WEEK];
        week.copy_from_slice(chunk);
        week
      })
      .collect();

    debug!(
      year,
      month,
      leading,
      trailing,
      rows = weeks.len(),
      "built calendar month"
    );

    Self {
      year: first.year(),
      month: first.month(),
      week_start,
      weeks
    }
  }

  pub fn containing(
    date: NaiveDate,
    week_start: WeekStart
  ) -> Self {
    Self::build(
      date.year(),
      date.month(),
      week_start
    )
  }

  pub fn year(&self) -> i32 {
    self.year
  }

  pub fn month(&self) -> u32 {
    self.month
  }

  pub fn week_start(&self) -> WeekStart {
    self.week_start
  }

  pub fn weeks(&self) -> &[Week] {
    &self.weeks
  }

  /// All cells in row-major order.
  pub fn cells(
    &self
  ) -> impl Iterator<Item = Option<NaiveDate>> + '_
  {
    self.weeks.iter().flatten().copied()
  }

  /// The non-empty cells, ascending.
  pub fn days(
    &self
  ) -> impl Iterator<Item = NaiveDate> + '_
  {
    self.cells().flatten()
  }

  pub fn contains(
    &self,
    date: NaiveDate
  ) -> bool {
    date.year() == self.year
      && date.month() == self.month
  }

  pub fn previous(&self) -> Self {
    let (year, month) =
      shift_months(self.year, self.month, -1);
    Self::build(year, month, self.week_start)
  }

  pub fn next(&self) -> Self {
    let (year, month) =
      shift_months(self.year, self.month, 1);
    Self::build(year, month, self.week_start)
  }

  /// `June 2024`.
  pub fn title(&self) -> String {
    first_day_of_month(
      self.year, self.month
    )
    .format("%B %Y")
    .to_string()
  }
}

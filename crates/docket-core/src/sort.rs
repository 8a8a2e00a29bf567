use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::NaiveDate;
use deunicode::deunicode;
use tracing::debug;

use crate::filter::PaperworkFilter;
use crate::paperwork::{
  Paperwork,
  Priority
};
use crate::status::classify;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default,
)]
pub enum SortKey {
  #[default]
  Date,
  Priority,
  Title,
  Status
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default,
)]
pub enum SortDirection {
  #[default]
  Asc,
  Desc
}

impl SortKey {
  pub fn as_str(self) -> &'static str {
    match self {
      | SortKey::Date => "date",
      | SortKey::Priority => "priority",
      | SortKey::Title => "title",
      | SortKey::Status => "status"
    }
  }
}

impl SortDirection {
  pub fn as_str(self) -> &'static str {
    match self {
      | SortDirection::Asc => "asc",
      | SortDirection::Desc => "desc"
    }
  }

  fn apply(
    self,
    ord: Ordering
  ) -> Ordering {
    match self {
      | SortDirection::Asc => ord,
      | SortDirection::Desc => ord.reverse()
    }
  }
}

impl fmt::Display for SortKey {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl fmt::Display for SortDirection {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for SortKey {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    match s
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "date" | "due" => Ok(SortKey::Date),
      | "priority" => Ok(SortKey::Priority),
      | "title" => Ok(SortKey::Title),
      | "status" => Ok(SortKey::Status),
      | other => Err(anyhow!(
        "unknown sort key: {other}"
      ))
    }
  }
}

impl FromStr for SortDirection {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    match s
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "asc" | "ascending" => {
        Ok(SortDirection::Asc)
      }
      | "desc" | "descending" => {
        Ok(SortDirection::Desc)
      }
      | other => Err(anyhow!(
        "unknown sort direction: {other}"
      ))
    }
  }
}

/// Returns a sorted copy. The sort is
/// stable: equal keys keep their input
/// order in both directions.
#[tracing::instrument(
  skip(papers, today),
  fields(total = papers.len())
)]
pub fn sort_paperwork(
  papers: &[Paperwork],
  key: SortKey,
  direction: SortDirection,
  today: NaiveDate
) -> Vec<Paperwork> {
  let mut out = papers.to_vec();
  out.sort_by(|a, b| {
    direction.apply(compare(
      a, b, key, today
    ))
  });
  debug!(%key, %direction, "sorted paperwork");
  out
}

fn compare(
  a: &Paperwork,
  b: &Paperwork,
  key: SortKey,
  today: NaiveDate
) -> Ordering {
  match key {
    | SortKey::Date => compare_due(
      a.target_completion_date,
      b.target_completion_date
    ),
    | SortKey::Priority => {
      Priority::rank(a.priority)
        .cmp(&Priority::rank(b.priority))
    }
    | SortKey::Status => {
      classify(a, today)
        .rank()
        .cmp(&classify(b, today).rank())
    }
    | SortKey::Title => {
      collate(&a.title, &b.title)
    }
  }
}

// Undated records go last when
// ascending; the direction flip moves
// them first when descending.
fn compare_due(
  a: Option<NaiveDate>,
  b: Option<NaiveDate>
) -> Ordering {
  match (a, b) {
    | (Some(a), Some(b)) => a.cmp(&b),
    | (None, Some(_)) => Ordering::Greater,
    | (Some(_), None) => Ordering::Less,
    | (None, None) => Ordering::Equal
  }
}

/// Human ordering for titles: accents
/// folded and case ignored first, lower
/// case ahead of upper case on ties.
pub fn collate(
  a: &str,
  b: &str
) -> Ordering {
  let fold = |s: &str| {
    deunicode(s).to_lowercase()
  };

  fold(a)
    .cmp(&fold(b))
    .then_with(|| {
      a.chars()
        .map(char::is_uppercase)
        .cmp(b.chars().map(char::is_uppercase))
    })
    .then_with(|| a.cmp(b))
}

/// Immutable view query: what to keep
/// and how to order it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaperworkQuery {
  pub filter:    PaperworkFilter,
  pub key:       SortKey,
  pub direction: SortDirection
}

impl PaperworkQuery {
  pub fn new(
    filter: PaperworkFilter,
    key: SortKey,
    direction: SortDirection
  ) -> Self {
    Self {
      filter,
      key,
      direction
    }
  }

  pub fn apply(
    &self,
    papers: &[Paperwork],
    today: NaiveDate
  ) -> Vec<Paperwork> {
    let kept =
      self.filter.apply(papers, today);
    sort_paperwork(
      &kept,
      self.key,
      self.direction,
      today
    )
  }
}

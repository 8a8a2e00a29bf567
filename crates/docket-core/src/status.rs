use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::NaiveDate;
use serde::{
  Deserialize,
  Serialize
};

use crate::paperwork::Paperwork;

/// Completion status derived from a
/// record's dates.
#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
)]
pub enum Status {
  Active,
  Overdue,
  Punctual,
  Delayed
}

impl Status {
  pub const ALL: [Status; 4] = [
    Status::Active,
    Status::Overdue,
    Status::Punctual,
    Status::Delayed
  ];

  /// Sort weight: overdue work first
  /// when descending.
  pub fn rank(self) -> u8 {
    match self {
      | Status::Overdue => 4,
      | Status::Active => 3,
      | Status::Delayed => 2,
      | Status::Punctual => 1
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      | Status::Active => "Active",
      | Status::Overdue => "Overdue",
      | Status::Punctual => "Punctual",
      | Status::Delayed => "Delayed"
    }
  }
}

impl fmt::Display for Status {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Status {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    let wanted = s.trim();
    Status::ALL
      .into_iter()
      .find(|status| {
        status
          .as_str()
          .eq_ignore_ascii_case(wanted)
      })
      .ok_or_else(|| {
        anyhow!("unknown status: {wanted}")
      })
  }
}

#[tracing::instrument(
  level = "trace",
  skip(paper),
  fields(id = %paper.id)
)]
pub fn classify(
  paper: &Paperwork,
  today: NaiveDate
) -> Status {
  let Some(due) =
    paper.target_completion_date
  else {
    return Status::Active;
  };

  match paper.actual_completion_date {
    | None if due < today => {
      Status::Overdue
    }
    | None => Status::Active,
    | Some(done) if done <= due => {
      Status::Punctual
    }
    | Some(_) => Status::Delayed
  }
}

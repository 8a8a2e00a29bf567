use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::NaiveDate;
use serde::{
  Deserialize,
  Serialize
};

use crate::datetime::{
  format_long_date,
  paper_date_serde
};

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
pub enum Priority {
  Low,
  Medium,
  High
}

impl Priority {
  /// Sort weight; records without a
  /// priority rank 0.
  pub fn rank(priority: Option<Self>) -> u8 {
    match priority {
      | Some(Priority::High) => 3,
      | Some(Priority::Medium) => 2,
      | Some(Priority::Low) => 1,
      | None => 0
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      | Priority::Low => "Low",
      | Priority::Medium => "Medium",
      | Priority::High => "High"
    }
  }
}

impl fmt::Display for Priority {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Priority {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    match s
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "low" | "l" => Ok(Priority::Low),
      | "medium" | "m" => {
        Ok(Priority::Medium)
      }
      | "high" | "h" => {
        Ok(Priority::High)
      }
      | other => Err(anyhow!(
        "unknown priority: {other}"
      ))
    }
  }
}

/// A tracked document. Status is never
/// stored here; see
/// [`crate::status::classify`].
#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct Paperwork {
  #[serde(rename = "paperwork_id")]
  pub id: String,

  #[serde(rename = "paper_title")]
  pub title: String,

  #[serde(
    rename = "paper_description",
    default
  )]
  pub description: Option<String>,

  #[serde(
    rename = "processing_priority",
    default
  )]
  pub priority: Option<Priority>,

  #[serde(
    default,
    with = "paper_date_serde::option"
  )]
  pub target_completion_date:
    Option<NaiveDate>,

  #[serde(
    default,
    with = "paper_date_serde::option"
  )]
  pub actual_completion_date:
    Option<NaiveDate>
}

impl Paperwork {
  pub fn new(
    id: impl Into<String>,
    title: impl Into<String>
  ) -> Self {
    Self {
      id: id.into(),
      title: title.into(),
      description: None,
      priority: None,
      target_completion_date: None,
      actual_completion_date: None
    }
  }

  pub fn is_completed(&self) -> bool {
    self.actual_completion_date.is_some()
  }

  /// `Completed on June 5, 2024` or
  /// `Due on June 5, 2024`.
  pub fn date_label(
    &self
  ) -> Option<String> {
    if let Some(done) =
      self.actual_completion_date
    {
      return Some(format!(
        "Completed on {}",
        format_long_date(done)
      ));
    }

    self.target_completion_date.map(
      |due| {
        format!(
          "Due on {}",
          format_long_date(due)
        )
      }
    )
  }
}

/// `1 document`, `3 documents`.
pub fn count_text(count: usize) -> String {
  if count == 1 {
    format!("{count} document")
  } else {
    format!("{count} documents")
  }
}

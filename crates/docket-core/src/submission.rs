use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::NaiveDate;
use serde::{
  Deserialize,
  Serialize
};
use thiserror::Error;

use crate::datetime::{
  format_date,
  paper_date_serde
};
use crate::paperwork::{
  Paperwork,
  Priority
};

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
pub enum PaperType {
  #[default]
  #[serde(rename = "Physical Paper")]
  Physical,
  #[serde(rename = "Digital Paper")]
  Digital
}

#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
  Default,
)]
pub enum PaperSource {
  #[default]
  #[serde(rename = "Internal Source")]
  Internal,
  #[serde(rename = "External Source")]
  External
}

impl fmt::Display for PaperType {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(match self {
      | PaperType::Physical => "Physical Paper",
      | PaperType::Digital => "Digital Paper"
    })
  }
}

impl fmt::Display for PaperSource {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(match self {
      | PaperSource::Internal => "Internal Source",
      | PaperSource::External => "External Source"
    })
  }
}

impl FromStr for PaperType {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    match s
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "physical" | "physical paper" => {
        Ok(PaperType::Physical)
      }
      | "digital" | "digital paper" => {
        Ok(PaperType::Digital)
      }
      | other => Err(anyhow!(
        "unknown paper type: {other}"
      ))
    }
  }
}

impl FromStr for PaperSource {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    match s
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "internal" | "internal source" => {
        Ok(PaperSource::Internal)
      }
      | "external" | "external source" => {
        Ok(PaperSource::External)
      }
      | other => Err(anyhow!(
        "unknown paper source: {other}"
      ))
    }
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmissionError {
  #[error("title is required")]
  MissingTitle,
  #[error("description is required")]
  MissingDescription,
  #[error(
    "target completion date {due} cannot be in the past (today is {today})"
  )]
  DueInPast {
    due:   String,
    today: String
  }
}

/// A new paperwork request as entered by
/// a user, before the submission service
/// assigns it an id.
#[derive(
  Debug, Clone, Serialize, Deserialize,
)]
pub struct Submission {
  #[serde(rename = "paper_title")]
  pub title: String,
  #[serde(rename = "paper_description")]
  pub description: String,
  pub paper_type: PaperType,
  pub paper_source: PaperSource,
  #[serde(rename = "processing_priority")]
  pub priority: Priority,
  #[serde(with = "paper_date_serde")]
  pub target_completion_date: NaiveDate
}

impl Submission {
  pub fn validate(
    &self,
    today: NaiveDate
  ) -> Result<(), SubmissionError> {
    if self.title.trim().is_empty() {
      return Err(
        SubmissionError::MissingTitle
      );
    }
    if self.description.trim().is_empty()
    {
      return Err(
        SubmissionError::MissingDescription
      );
    }
    if self.target_completion_date < today
    {
      return Err(
        SubmissionError::DueInPast {
          due:   format_date(
            self.target_completion_date
          ),
          today: format_date(today)
        }
      );
    }
    Ok(())
  }

  /// The record shown once the
  /// submission has been accepted.
  pub fn into_paperwork(
    self,
    id: impl Into<String>
  ) -> Paperwork {
    Paperwork {
      id: id.into(),
      title: self.title.trim().to_string(),
      description: Some(
        self.description.trim().to_string()
      ),
      priority: Some(self.priority),
      target_completion_date: Some(
        self.target_completion_date
      ),
      actual_completion_date: None
    }
  }
}

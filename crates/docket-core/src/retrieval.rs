//! Validation at the boundary with the
//! retrieval service. Rows arrive loosely
//! typed; everything past this module
//! works on [`Paperwork`].

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::{
  debug,
  info,
  warn
};

use crate::datetime::parse_date_or_today;
use crate::paperwork::{
  Paperwork,
  Priority
};

/// Text some upstream serializers emit
/// for a missing completion date.
const UNDEFINED_LITERAL: &str =
  "undefined";

/// A paperwork row as the retrieval API
/// returns it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPaperwork {
  #[serde(default)]
  pub paperwork_id:           Option<String>,
  #[serde(default)]
  pub paper_title:            Option<String>,
  #[serde(default)]
  pub paper_description:      Option<String>,
  #[serde(default)]
  pub processing_priority:    Option<String>,
  #[serde(default)]
  pub target_completion_date: Option<String>,
  #[serde(default)]
  pub actual_completion_date: Option<String>
}

impl RawPaperwork {
  /// Normalises the row. Returns `None`
  /// only when the row has no usable id.
  pub fn into_paperwork(
    self,
    today: NaiveDate
  ) -> Option<Paperwork> {
    let Some(id) = non_blank(self.paperwork_id)
    else {
      warn!(
        title = ?self.paper_title,
        "dropping paperwork row without id"
      );
      return None;
    };

    let priority = non_blank(
      self.processing_priority
    )
    .and_then(|raw| {
      match raw.parse::<Priority>() {
        | Ok(priority) => Some(priority),
        | Err(err) => {
          warn!(
            id = %id,
            priority = %raw,
            error = %err,
            "unknown priority; leaving unset"
          );
          None
        }
      }
    });

    let target_completion_date =
      non_blank(self.target_completion_date)
        .map(|raw| {
          parse_date_or_today(&raw, today)
        });

    let actual_completion_date =
      completion_text(
        &id,
        self.actual_completion_date
      )
      .map(|raw| {
        parse_date_or_today(&raw, today)
      });

    Some(Paperwork {
      id,
      title: self.paper_title.unwrap_or_default(),
      description: non_blank(
        self.paper_description
      ),
      priority,
      target_completion_date,
      actual_completion_date
    })
  }
}

fn non_blank(
  raw: Option<String>
) -> Option<String> {
  raw
    .map(|s| s.trim().to_string())
    .filter(|s| !s.is_empty())
}

// "undefined" is a serialization
// artifact, not a real completion date.
fn completion_text(
  id: &str,
  raw: Option<String>
) -> Option<String> {
  let text = non_blank(raw)?;
  if text == UNDEFINED_LITERAL {
    debug!(
      id,
      "completion date was the literal \
       'undefined'; treating as open"
    );
    return None;
  }
  Some(text)
}

/// Accepts a bare array of rows or the
/// API envelope `{ "paperwork": [...] }`.
/// Any other shape yields an empty
/// collection and a warning.
#[tracing::instrument(skip(value, today))]
pub fn collection_from_value(
  value: Value,
  today: NaiveDate
) -> Vec<Paperwork> {
  let rows = match value {
    | Value::Array(rows) => rows,
    | Value::Object(mut envelope) => {
      match envelope.remove("paperwork") {
        | Some(Value::Array(rows)) => rows,
        | Some(Value::Null) | None => {
          debug!(
            "envelope carried no paperwork"
          );
          Vec::new()
        }
        | Some(other) => {
          warn!(
            kind = value_kind(&other),
            "paperwork field is not a list; \
             using empty collection"
          );
          return Vec::new();
        }
      }
    }
    | other => {
      warn!(
        kind = value_kind(&other),
        "paperwork collection is not a \
         list; using empty collection"
      );
      return Vec::new();
    }
  };

  let total = rows.len();
  let papers: Vec<Paperwork> = rows
    .into_iter()
    .enumerate()
    .filter_map(|(idx, row)| {
      match serde_json::from_value::<
        RawPaperwork
      >(row)
      {
        | Ok(raw) => raw.into_paperwork(today),
        | Err(err) => {
          warn!(
            index = idx,
            error = %err,
            "skipping malformed paperwork row"
          );
          None
        }
      }
    })
    .collect();

  info!(
    total,
    kept = papers.len(),
    "loaded paperwork collection"
  );
  papers
}

fn value_kind(
  value: &Value
) -> &'static str {
  match value {
    | Value::Null => "null",
    | Value::Bool(_) => "bool",
    | Value::Number(_) => "number",
    | Value::String(_) => "string",
    | Value::Array(_) => "array",
    | Value::Object(_) => "object"
  }
}

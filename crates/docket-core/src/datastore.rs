use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use chrono::NaiveDate;
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, info};
use uuid::Uuid;

use crate::paperwork::Paperwork;
use crate::retrieval::collection_from_value;
use crate::submission::Submission;

/// A JSON file standing in for the retrieval and submission services.
#[derive(Debug)]
pub struct PaperworkStore {
    pub path: PathBuf,
}

impl PaperworkStore {
    pub fn open(path: &Path) -> Self {
        info!(file = %path.display(), "opened paperwork store");
        Self {
            path: path.to_path_buf(),
        }
    }

    /// A missing file is an empty collection. Rows go through the retrieval
    /// boundary, so malformed rows are skipped rather than fatal.
    #[tracing::instrument(skip(self, today), fields(file = %self.path.display()))]
    pub fn load(&self, today: NaiveDate) -> anyhow::Result<Vec<Paperwork>> {
        match self.read_document()? {
            Some(document) => Ok(collection_from_value(document, today)),
            None => Ok(Vec::new()),
        }
    }

    /// Validates the submission, assigns a fresh id and appends the record.
    /// Existing rows are kept exactly as stored, including ones the
    /// retrieval boundary would skip or normalise.
    #[tracing::instrument(skip(self, submission, today), fields(file = %self.path.display()))]
    pub fn submit(&self, submission: Submission, today: NaiveDate) -> anyhow::Result<Paperwork> {
        submission
            .validate(today)
            .context("submission rejected")?;

        let mut document = self
            .read_document()?
            .unwrap_or_else(|| Value::Array(Vec::new()));
        let paper = submission.into_paperwork(Uuid::new_v4().to_string());
        let row = serde_json::to_value(&paper).context("failed to encode paperwork")?;
        let total = append_row(&mut document, row)
            .with_context(|| format!("cannot append to {}", self.path.display()))?;
        self.write_document(&document)?;

        info!(id = %paper.id, total, "stored new paperwork");
        Ok(paper)
    }

    /// The raw JSON document, or `None` when the file is missing or blank.
    fn read_document(&self) -> anyhow::Result<Option<Value>> {
        if !self.path.exists() {
            debug!("paperwork file missing; starting empty");
            return Ok(None);
        }

        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        if text.trim().is_empty() {
            return Ok(None);
        }

        let value = serde_json::from_str(&text)
            .with_context(|| format!("failed parsing {}", self.path.display()))?;
        Ok(Some(value))
    }

    fn write_document(&self, document: &Value) -> anyhow::Result<()> {
        debug!("writing paperwork atomically");

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut temp, document)?;
        writeln!(temp)?;
        temp.flush()?;

        temp.persist(&self.path)
            .map_err(|err| anyhow!("failed to persist {}: {}", self.path.display(), err))?;

        Ok(())
    }
}

/// Pushes `row` onto a bare array or the `paperwork` list of an API
/// envelope, leaving every other field untouched. Returns the new row count.
fn append_row(document: &mut Value, row: Value) -> anyhow::Result<usize> {
    if document.is_null() {
        *document = Value::Array(Vec::new());
    }

    let rows = match document {
        Value::Array(rows) => rows,
        Value::Object(envelope) => {
            let slot = envelope
                .entry("paperwork")
                .or_insert(Value::Null);
            if slot.is_null() {
                *slot = Value::Array(Vec::new());
            }
            match slot {
                Value::Array(rows) => rows,
                _ => return Err(anyhow!("paperwork field is not a list")),
            }
        }
        _ => return Err(anyhow!("document is not a paperwork collection")),
    };

    rows.push(row);
    Ok(rows.len())
}

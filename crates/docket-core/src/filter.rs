use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::{
  debug,
  trace
};

use crate::paperwork::{
  Paperwork,
  Priority
};
use crate::status::{
  Status,
  classify
};

/// Search text plus priority and status
/// facets. Empty facets do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaperworkFilter {
  search:     String,
  priorities: BTreeSet<Priority>,
  statuses:   BTreeSet<Status>
}

impl PaperworkFilter {
  pub fn new(
    search: &str,
    priorities: impl IntoIterator<Item = Priority>,
    statuses: impl IntoIterator<Item = Status>
  ) -> Self {
    Self {
      search:     search
        .trim()
        .to_lowercase(),
      priorities: priorities
        .into_iter()
        .collect(),
      statuses:   statuses
        .into_iter()
        .collect()
    }
  }

  pub fn search(&self) -> &str {
    &self.search
  }

  pub fn priorities(
    &self
  ) -> &BTreeSet<Priority> {
    &self.priorities
  }

  pub fn statuses(
    &self
  ) -> &BTreeSet<Status> {
    &self.statuses
  }

  pub fn is_empty(&self) -> bool {
    self.search.is_empty()
      && self.priorities.is_empty()
      && self.statuses.is_empty()
  }

  pub fn matches(
    &self,
    paper: &Paperwork,
    today: NaiveDate
  ) -> bool {
    let ok = self.matches_search(paper)
      && self.matches_priority(paper)
      && self.matches_status(paper, today);
    trace!(id = %paper.id, ok, "evaluated filter");
    ok
  }

  /// Keeps matching records in their
  /// original order.
  #[tracing::instrument(
    skip(self, papers, today),
    fields(total = papers.len())
  )]
  pub fn apply(
    &self,
    papers: &[Paperwork],
    today: NaiveDate
  ) -> Vec<Paperwork> {
    let out: Vec<Paperwork> = papers
      .iter()
      .filter(|paper| {
        self.matches(paper, today)
      })
      .cloned()
      .collect();
    debug!(
      kept = out.len(),
      search = %self.search,
      "filtered paperwork"
    );
    out
  }

  fn matches_search(
    &self,
    paper: &Paperwork
  ) -> bool {
    if self.search.is_empty() {
      return true;
    }

    let needle = self.search.as_str();
    paper.id.to_lowercase().contains(needle)
      || paper
        .title
        .to_lowercase()
        .contains(needle)
      || paper
        .description
        .as_deref()
        .is_some_and(|text| {
          text
            .to_lowercase()
            .contains(needle)
        })
  }

  fn matches_priority(
    &self,
    paper: &Paperwork
  ) -> bool {
    if self.priorities.is_empty() {
      return true;
    }

    paper.priority.is_some_and(|p| {
      self.priorities.contains(&p)
    })
  }

  fn matches_status(
    &self,
    paper: &Paperwork,
    today: NaiveDate
  ) -> bool {
    self.statuses.is_empty()
      || self
        .statuses
        .contains(&classify(paper, today))
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use chrono::NaiveDate;

  use super::PaperworkFilter;
  use crate::datetime::parse_date;
  use crate::paperwork::{
    Paperwork,
    Priority
  };
  use crate::status::Status;

  pub(crate) fn today() -> NaiveDate {
    parse_date("15-06-2024")
      .expect("valid date")
  }

  fn record(
    id: &str,
    title: &str,
    priority: Priority,
    due: &str,
    done: Option<&str>
  ) -> Paperwork {
    let mut paper = Paperwork::new(id, title);
    paper.description = Some(format!(
      "{title} for the records office"
    ));
    paper.priority = Some(priority);
    paper.target_completion_date =
      Some(parse_date(due).expect("due"));
    paper.actual_completion_date = done
      .map(|d| parse_date(d).expect("done"));
    paper
  }

  /// Twelve records, four of each
  /// priority, spread across statuses.
  pub(crate) fn sample() -> Vec<Paperwork> {
    vec![
      record("PW-01", "Lease renewal", Priority::High, "10-06-2024", None),
      record("PW-02", "Tax filing", Priority::Low, "20-06-2024", None),
      record("PW-03", "Insurance claim", Priority::Medium, "13-06-2024", Some("12-06-2024")),
      record("PW-04", "Vendor contract", Priority::High, "13-06-2024", Some("16-06-2024")),
      record("PW-05", "Audit report", Priority::Medium, "15-06-2024", None),
      record("PW-06", "Board minutes", Priority::Low, "01-06-2024", None),
      record("PW-07", "Payroll summary", Priority::High, "30-06-2024", None),
      record("PW-08", "Permit request", Priority::Medium, "05-06-2024", Some("05-06-2024")),
      record("PW-09", "Grant proposal", Priority::Low, "28-06-2024", Some("27-06-2024")),
      record("PW-10", "Asset register", Priority::High, "11-06-2024", None),
      record("PW-11", "Policy draft", Priority::Medium, "25-06-2024", None),
      record("PW-12", "Safety checklist", Priority::Low, "02-06-2024", Some("09-06-2024")),
    ]
  }

  fn ids(papers: &[Paperwork]) -> Vec<&str> {
    papers
      .iter()
      .map(|p| p.id.as_str())
      .collect()
  }

  #[test]
  fn empty_filter_keeps_everything() {
    let papers = sample();
    let filter = PaperworkFilter::default();
    assert!(filter.is_empty());
    assert_eq!(
      filter.apply(&papers, today()),
      papers
    );
  }

  #[test]
  fn priority_facet_keeps_order() {
    let papers = sample();
    let filter = PaperworkFilter::new(
      "",
      [Priority::High],
      []
    );
    assert_eq!(
      ids(&filter.apply(&papers, today())),
      vec!["PW-01", "PW-04", "PW-07", "PW-10"]
    );
  }

  #[test]
  fn search_is_case_insensitive_across_fields(
  ) {
    let papers = sample();
    let by_title = PaperworkFilter::new(
      "  LEASE ",
      [],
      []
    );
    assert_eq!(
      ids(&by_title.apply(&papers, today())),
      vec!["PW-01"]
    );

    let by_id =
      PaperworkFilter::new("pw-1", [], []);
    assert_eq!(
      ids(&by_id.apply(&papers, today())),
      vec!["PW-10", "PW-11", "PW-12"]
    );

    let by_description = PaperworkFilter::new(
      "records office",
      [],
      []
    );
    assert_eq!(
      by_description
        .apply(&papers, today())
        .len(),
      12
    );

    let blank =
      PaperworkFilter::new("   ", [], []);
    assert!(blank.is_empty());
  }

  #[test]
  fn status_facet_uses_derived_status() {
    let papers = sample();
    let overdue = PaperworkFilter::new(
      "",
      [],
      [Status::Overdue]
    );
    assert_eq!(
      ids(&overdue.apply(&papers, today())),
      vec!["PW-01", "PW-06", "PW-10"]
    );

    let finished = PaperworkFilter::new(
      "",
      [],
      [Status::Punctual, Status::Delayed]
    );
    assert_eq!(
      ids(&finished.apply(&papers, today())),
      vec![
        "PW-03", "PW-04", "PW-08", "PW-09",
        "PW-12"
      ]
    );
  }

  #[test]
  fn facets_combine_with_and() {
    let papers = sample();
    let filter = PaperworkFilter::new(
      "",
      [Priority::High, Priority::Low],
      [Status::Active]
    );
    assert_eq!(
      ids(&filter.apply(&papers, today())),
      vec!["PW-02", "PW-07"]
    );
  }

  #[test]
  fn missing_priority_fails_priority_facet(
  ) {
    let mut paper =
      Paperwork::new("PW-X", "Loose");
    paper.priority = None;
    let filter = PaperworkFilter::new(
      "",
      [Priority::Low],
      []
    );
    assert!(!filter.matches(&paper, today()));
    assert!(
      PaperworkFilter::default()
        .matches(&paper, today())
    );
  }
}

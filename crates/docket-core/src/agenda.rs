use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::paperwork::Paperwork;
use crate::status::{
  Status,
  classify
};

/// Calendar day shading.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum DayHighlight {
  None,
  HasOverdue,
  HasActive
}

/// Records bucketed by due date. Each
/// bucket keeps the collection's order;
/// undated records are not indexed.
#[derive(Debug, Clone, Default)]
pub struct DayIndex<'a> {
  by_day: BTreeMap<NaiveDate, Vec<&'a Paperwork>>
}

impl<'a> DayIndex<'a> {
  #[tracing::instrument(
    skip(papers),
    fields(total = papers.len())
  )]
  pub fn group_by_date(
    papers: &'a [Paperwork]
  ) -> Self {
    let mut by_day: BTreeMap<
      NaiveDate,
      Vec<&'a Paperwork>
    > = BTreeMap::new();
    let mut undated = 0_usize;

    for paper in papers {
      match paper.target_completion_date {
        | Some(due) => {
          by_day
            .entry(due)
            .or_default()
            .push(paper)
        }
        | None => undated += 1
      }
    }

    debug!(
      days = by_day.len(),
      undated,
      "grouped paperwork by due date"
    );
    Self {
      by_day
    }
  }

  pub fn records_for_day(
    &self,
    day: NaiveDate
  ) -> &[&'a Paperwork] {
    self
      .by_day
      .get(&day)
      .map(Vec::as_slice)
      .unwrap_or(&[])
  }

  pub fn days(
    &self
  ) -> impl Iterator<Item = NaiveDate> + '_
  {
    self.by_day.keys().copied()
  }

  pub fn len(&self) -> usize {
    self.by_day.len()
  }

  pub fn is_empty(&self) -> bool {
    self.by_day.is_empty()
  }

  pub fn day_highlight(
    &self,
    day: NaiveDate,
    today: NaiveDate
  ) -> DayHighlight {
    let records = self.records_for_day(day);
    if records.iter().any(|paper| {
      classify(paper, today)
        == Status::Overdue
    }) {
      DayHighlight::HasOverdue
    } else if !records.is_empty() {
      DayHighlight::HasActive
    } else {
      DayHighlight::None
    }
  }
}

/// First `max_visible` records plus how
/// many were left out.
pub fn split_visible<T>(
  records: &[T],
  max_visible: usize
) -> (&[T], usize) {
  let shown = records.len().min(max_visible);
  (
    &records[..shown],
    records.len() - shown
  )
}

pub fn is_current_or_future(
  day: NaiveDate,
  today: NaiveDate
) -> bool {
  day >= today
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::{
    DayHighlight,
    DayIndex,
    is_current_or_future,
    split_visible
  };
  use crate::datetime::parse_date;
  use crate::filter::tests::{
    sample,
    today
  };
  use crate::paperwork::Paperwork;

  fn day(raw: &str) -> NaiveDate {
    parse_date(raw).expect("valid date")
  }

  #[test]
  fn every_record_lands_in_its_own_day() {
    let papers = sample();
    let index = DayIndex::group_by_date(&papers);

    for paper in &papers {
      let due = paper
        .target_completion_date
        .expect("sample is dated");
      let bucket = index.records_for_day(due);
      assert_eq!(
        bucket
          .iter()
          .filter(|p| p.id == paper.id)
          .count(),
        1
      );
      assert!(bucket.iter().all(|p| {
        p.target_completion_date == Some(due)
      }));
    }

    let total: usize = index
      .days()
      .map(|d| index.records_for_day(d).len())
      .sum();
    assert_eq!(total, papers.len());
  }

  #[test]
  fn buckets_keep_collection_order() {
    let papers = sample();
    let index = DayIndex::group_by_date(&papers);
    let ids: Vec<&str> = index
      .records_for_day(day("13-06-2024"))
      .iter()
      .map(|p| p.id.as_str())
      .collect();
    assert_eq!(ids, vec!["PW-03", "PW-04"]);
  }

  #[test]
  fn empty_day_yields_empty_slice() {
    let papers = sample();
    let index = DayIndex::group_by_date(&papers);
    assert!(
      index
        .records_for_day(day("31-12-2024"))
        .is_empty()
    );
  }

  #[test]
  fn undated_records_are_skipped() {
    let papers = vec![
      Paperwork::new("PW-A", "No due date")
    ];
    let index = DayIndex::group_by_date(&papers);
    assert!(index.is_empty());
  }

  #[test]
  fn overdue_dominates_highlight() {
    let papers = sample();
    let index = DayIndex::group_by_date(&papers);

    assert_eq!(
      index.day_highlight(day("10-06-2024"), today()),
      DayHighlight::HasOverdue
    );
    assert_eq!(
      index.day_highlight(day("13-06-2024"), today()),
      DayHighlight::HasActive
    );
    assert_eq!(
      index.day_highlight(day("20-06-2024"), today()),
      DayHighlight::HasActive
    );
    assert_eq!(
      index.day_highlight(day("21-06-2024"), today()),
      DayHighlight::None
    );

    let mut mixed = sample();
    let mut late = Paperwork::new("PW-99", "Late");
    late.target_completion_date = Some(day("13-06-2024"));
    mixed.push(late);
    let index = DayIndex::group_by_date(&mixed);
    assert_eq!(
      index.day_highlight(day("13-06-2024"), today()),
      DayHighlight::HasOverdue
    );
  }

  #[test]
  fn splits_visible_and_remaining() {
    let five = [1, 2, 3, 4, 5];
    let (visible, remaining) =
      split_visible(&five, 3);
    assert_eq!(visible, &[1, 2, 3]);
    assert_eq!(remaining, 2);

    let two = [1, 2];
    let (visible, remaining) =
      split_visible(&two, 3);
    assert_eq!(visible, &[1, 2]);
    assert_eq!(remaining, 0);

    let (visible, remaining) =
      split_visible(&five, 0);
    assert!(visible.is_empty());
    assert_eq!(remaining, 5);
  }

  #[test]
  fn today_counts_as_current() {
    assert!(is_current_or_future(today(), today()));
    assert!(is_current_or_future(
      day("16-06-2024"),
      today()
    ));
    assert!(!is_current_or_future(
      day("14-06-2024"),
      today()
    ));
  }
}

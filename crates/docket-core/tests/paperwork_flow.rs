use std::fs;

use chrono::NaiveDate;
use docket_core::agenda::{DayHighlight, DayIndex};
use docket_core::calendar::{CalendarMonth, WeekStart};
use docket_core::datastore::PaperworkStore;
use docket_core::filter::PaperworkFilter;
use docket_core::paperwork::Priority;
use docket_core::sort::{PaperworkQuery, SortDirection, SortKey};
use docket_core::status::{Status, classify};
use docket_core::submission::{PaperSource, PaperType, Submission};
use tempfile::tempdir;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[test]
fn loads_api_response_and_builds_views() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("paperwork.json");
    fs::write(
        &path,
        r#"{
          "code": "SUCCESS",
          "message": "Paperwork retrieved successfully",
          "paperwork": [
            {"paperwork_id": "PW-1", "paper_title": "Lease", "paper_description": "Office lease",
             "processing_priority": "High", "target_completion_date": "10-06-2024"},
            {"paperwork_id": "PW-2", "paper_title": "Permit", "paper_description": "Street permit",
             "processing_priority": "Low", "target_completion_date": "13-06-2024",
             "actual_completion_date": "undefined"},
            {"paperwork_id": "PW-3", "paper_title": "Claim", "paper_description": "",
             "processing_priority": "Medium", "target_completion_date": "13-06-2024",
             "actual_completion_date": "16-06-2024"}
          ]
        }"#,
    )
    .expect("write fixture");

    let today = day(2024, 6, 15);
    let store = PaperworkStore::open(&path);
    let papers = store.load(today).expect("load");
    assert_eq!(papers.len(), 3);

    let statuses: Vec<Status> = papers.iter().map(|p| classify(p, today)).collect();
    assert_eq!(
        statuses,
        vec![Status::Overdue, Status::Overdue, Status::Delayed]
    );

    let query = PaperworkQuery::new(
        PaperworkFilter::new("", [], [Status::Overdue]),
        SortKey::Priority,
        SortDirection::Asc,
    );
    let ids: Vec<String> = query
        .apply(&papers, today)
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec!["PW-2", "PW-1"]);

    let grid = CalendarMonth::build(2024, 6, WeekStart::Sunday);
    let index = DayIndex::group_by_date(&papers);
    let highlighted: Vec<(NaiveDate, DayHighlight)> = grid
        .days()
        .map(|d| (d, index.day_highlight(d, today)))
        .filter(|(_, h)| *h != DayHighlight::None)
        .collect();
    assert_eq!(
        highlighted,
        vec![
            (day(2024, 6, 10), DayHighlight::HasOverdue),
            (day(2024, 6, 13), DayHighlight::HasOverdue),
        ]
    );
}

#[test]
fn submission_roundtrips_through_store() {
    let temp = tempdir().expect("tempdir");
    let store = PaperworkStore::open(&temp.path().join("paperwork.json"));
    let today = day(2024, 6, 15);

    assert!(store.load(today).expect("load empty").is_empty());

    let stored = store
        .submit(
            Submission {
                title: "Vendor contract".to_string(),
                description: "Annual renewal".to_string(),
                paper_type: PaperType::Digital,
                paper_source: PaperSource::External,
                priority: Priority::High,
                target_completion_date: day(2024, 6, 20),
            },
            today,
        )
        .expect("submit");

    let papers = store.load(today).expect("reload");
    assert_eq!(papers.len(), 1);
    assert_eq!(papers[0], stored);
    assert_eq!(classify(&papers[0], today), Status::Active);

    let late = store.submit(
        Submission {
            title: "Backdated".to_string(),
            description: "Should be refused".to_string(),
            paper_type: PaperType::Physical,
            paper_source: PaperSource::Internal,
            priority: Priority::Low,
            target_completion_date: day(2024, 6, 1),
        },
        today,
    );
    assert!(late.is_err());
    assert_eq!(store.load(today).expect("reload").len(), 1);
}

#[test]
fn malformed_file_shape_is_empty_not_fatal() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("paperwork.json");
    fs::write(&path, r#"{"paperwork": "not a list"}"#).expect("write fixture");

    let store = PaperworkStore::open(&path);
    assert!(store.load(day(2024, 6, 15)).expect("load").is_empty());
}

#[test]
fn submit_keeps_existing_rows_verbatim() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("paperwork.json");
    fs::write(
        &path,
        r#"[
          {"paperwork_id": "PW-1", "paper_title": "Lease", "processing_priority": "Urgent",
           "target_completion_date": "2024-06-10"},
          {"paper_title": "No id yet", "target_completion_date": "20-06-2024"}
        ]"#,
    )
    .expect("write fixture");

    let today = day(2024, 6, 15);
    let store = PaperworkStore::open(&path);
    let stored = store
        .submit(
            Submission {
                title: "Vendor contract".to_string(),
                description: "Annual renewal".to_string(),
                paper_type: PaperType::Digital,
                paper_source: PaperSource::External,
                priority: Priority::Medium,
                target_completion_date: day(2024, 6, 20),
            },
            today,
        )
        .expect("submit");

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).expect("read back")).expect("json");
    let rows = raw.as_array().expect("still a list");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["target_completion_date"], "2024-06-10");
    assert_eq!(rows[0]["processing_priority"], "Urgent");
    assert_eq!(rows[1]["paper_title"], "No id yet");
    assert!(rows[1].get("paperwork_id").is_none());
    assert_eq!(rows[2]["paperwork_id"], stored.id.as_str());
}

#[test]
fn submit_appends_inside_api_envelope() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("paperwork.json");
    fs::write(
        &path,
        r#"{"code": "SUCCESS", "message": "Paperwork retrieved successfully",
            "paperwork": [{"paperwork_id": "PW-1", "paper_title": "Lease",
                           "target_completion_date": "10-06-2024"}]}"#,
    )
    .expect("write fixture");

    let today = day(2024, 6, 15);
    let store = PaperworkStore::open(&path);
    store
        .submit(
            Submission {
                title: "Permit".to_string(),
                description: "Street permit".to_string(),
                paper_type: PaperType::Physical,
                paper_source: PaperSource::Internal,
                priority: Priority::Low,
                target_completion_date: day(2024, 6, 15),
            },
            today,
        )
        .expect("submit");

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).expect("read back")).expect("json");
    assert_eq!(raw["code"], "SUCCESS");
    assert_eq!(raw["paperwork"].as_array().map(Vec::len), Some(2));
    assert_eq!(store.load(today).expect("reload").len(), 2);
}

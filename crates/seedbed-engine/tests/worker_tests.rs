#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Queue worker tests
//!
//! ## Scenarios Covered
//!
//! 1. A queued seeded batch is executed around an unknown row
//! 2. A job whose rows all fail is marked failed with the reason
//! 3. The drain honours its limit and stops on an empty queue
//! 4. Every job leaves queued/started/finished events
//! 5. Weeding after a seeded run removes exactly the seeded items
//! 6. A job with a corrupted payload is failed and the drain continues

mod common;

use seedbed_core::logging_facility::test_capture::init_test_capture;
use seedbed_core::types::schema::{EVENT_END, EVENT_END_ERROR, FIELD_JOB_ID};
use seedbed_core::{ExErrorKind, SeedOrigin};
use seedbed_store::QueueCounts;
use seedbed_engine::commands::import::{run_import, ImportRequest};
use seedbed_engine::commands::seeds::{list_seeds, weed};
use seedbed_engine::commands::worker::run_pending;
use seedbed_store::events::list_events;
use seedbed_store::{JobStatus, SqliteImportStore, SqliteJobQueue};

fn queue_text(conn: &rusqlite::Connection, text: &str, seed: bool) -> seedbed_core_types::JobId {
    let queue = SqliteJobQueue::new(conn);
    let outcome = run_import(ImportRequest::new().with_text(text).seeded(seed), &queue);
    assert!(outcome.is_success(), "queueing failed: {:?}", outcome.errors);
    outcome.queued[0].clone()
}

#[test]
fn test_seeded_batch_runs_around_unknown_row() {
    // GIVEN a seeded job with two entries around an unknown importer
    let (_tmp, conn) = common::setup_db();
    let registry = common::builtin_registry();
    let job_id = queue_text(
        &conn,
        r#"[
            {"@model": "element.entry", "title": "A"},
            {"@model": "element.unknown", "title": "?"},
            {"@model": "element.entry", "title": "B"}
        ]"#,
        true,
    );

    // WHEN the worker drains the queue
    let summary = run_pending(&conn, &registry, 10).unwrap();

    // THEN the job completed with two saved rows and one failure
    assert_eq!(summary.jobs_run(), 1);
    let run = &summary.runs[0];
    assert_eq!(run.job_id, job_id);
    assert_eq!(run.status, JobStatus::Completed);
    assert_eq!(run.saved, 2);
    assert_eq!(run.failed, 1);
    assert_eq!(run.tracked, 2);
    let err = run.errors.first("invalid-model").unwrap();
    assert_eq!(err.kind(), ExErrorKind::UnknownModel);
    assert_eq!(err.job_id(), Some(&job_id));

    // AND both entries and both weeds are persisted
    let store = SqliteImportStore::new(&conn);
    assert_eq!(store.list_elements(Some("element.entry")).unwrap().len(), 2);
    let seeds = list_seeds(&conn, Some(SeedOrigin::Post)).unwrap();
    assert_eq!(seeds.len(), 2);
    assert!(seeds.iter().all(|w| w.importer_type == "element.entry"));
}

#[test]
fn test_job_with_only_failing_rows_is_failed() {
    let (_tmp, conn) = common::setup_db();
    let registry = common::builtin_registry();
    let job_id = queue_text(&conn, r#"[{"title": "no model"}]"#, false);

    let summary = run_pending(&conn, &registry, 10).unwrap();

    assert_eq!(summary.failed(), 1);
    let queued = SqliteJobQueue::new(&conn).get(&job_id).unwrap().unwrap();
    assert_eq!(queued.status, JobStatus::Failed);
    assert_eq!(queued.attempts, 1);
    assert!(queued.last_error.unwrap().contains("ERR_MISSING_MODEL_KEY"));
}

#[test]
fn test_empty_job_completes() {
    let (_tmp, conn) = common::setup_db();
    let registry = common::builtin_registry();
    queue_text(&conn, "[]", false);

    let summary = run_pending(&conn, &registry, 10).unwrap();

    assert_eq!(summary.completed(), 1);
    assert_eq!(summary.rows_saved(), 0);
}

#[test]
fn test_drain_honours_limit() {
    // GIVEN three queued jobs
    let (_tmp, conn) = common::setup_db();
    let registry = common::builtin_registry();
    for title in ["one", "two", "three"] {
        queue_text(
            &conn,
            &format!(r#"{{"@model":"element.tag","title":"{}"}}"#, title),
            false,
        );
    }

    // WHEN the worker runs twice with a limit of two
    let first = run_pending(&conn, &registry, 2).unwrap();
    let second = run_pending(&conn, &registry, 2).unwrap();

    // THEN the first drain runs two jobs and the second the remaining one
    assert_eq!(first.jobs_run(), 2);
    assert_eq!(second.jobs_run(), 1);
    let counts = SqliteJobQueue::new(&conn).counts().unwrap();
    assert_eq!(counts.completed, 3);
    assert_eq!(counts.pending, 0);
    assert_eq!(common::count_rows(&conn, "elements"), 3);
}

#[test]
fn test_job_events_are_recorded() {
    let (_tmp, conn) = common::setup_db();
    let registry = common::builtin_registry();
    let job_id = queue_text(&conn, r#"{"@model":"element.tag","title":"t"}"#, false);

    run_pending(&conn, &registry, 1).unwrap();

    let kinds: Vec<String> = list_events(&conn, Some(job_id.as_str()))
        .unwrap()
        .into_iter()
        .map(|e| e.kind)
        .collect();
    assert_eq!(kinds, vec!["job_queued", "job_started", "job_completed"]);
}

#[test]
fn test_dispatch_job_logs_lifecycle() {
    let capture = init_test_capture();
    let (_tmp, conn) = common::setup_db();
    let registry = common::builtin_registry();
    let ok = queue_text(&conn, "[]", false);
    let bad = queue_text(&conn, r#"[{"@model": 7}]"#, false);

    run_pending(&conn, &registry, 10).unwrap();

    let count = |job_id: String, event: &str| {
        capture.count_events(|e| {
            e.op.as_deref() == Some("dispatch_job")
                && e.event.as_deref() == Some(event)
                && e.field(FIELD_JOB_ID) == Some(job_id.as_str())
        })
    };
    assert_eq!(count(ok.to_string(), EVENT_END), 1);
    assert_eq!(count(bad.to_string(), EVENT_END_ERROR), 1);
}

#[test]
fn test_weed_removes_seeded_items_only() {
    // GIVEN one seeded and one unseeded job, both executed
    let (_tmp, mut conn) = common::setup_db();
    let registry = common::builtin_registry();
    queue_text(
        &conn,
        r#"[
            {"@model": "setting.section", "handle": "news", "name": "News"},
            {"@model": "element.entry", "title": "Seeded"}
        ]"#,
        true,
    );
    queue_text(&conn, r#"{"@model": "element.entry", "title": "Kept"}"#, false);
    run_pending(&conn, &registry, 10).unwrap();
    assert_eq!(common::count_rows(&conn, "seeds"), 2);

    // WHEN the seeded items are weeded
    let summary = weed(&mut conn, &registry, None).unwrap();

    // THEN the seeded setting and entry are gone and the unseeded entry stays
    assert_eq!(summary.elements_removed, 1);
    assert_eq!(summary.settings_removed, 1);
    assert_eq!(common::count_rows(&conn, "seeds"), 0);
    assert_eq!(common::count_rows(&conn, "settings"), 0);
    let store = SqliteImportStore::new(&conn);
    let remaining = store.list_elements(None).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].fields.get_str("title"), Some("Kept"));
}

#[test]
fn test_corrupt_job_fails_without_stopping_drain() {
    // GIVEN a job whose stored payload is corrupt, queued before a good one
    let (_tmp, conn) = common::setup_db();
    let registry = common::builtin_registry();
    let corrupt = queue_text(&conn, r#"{"@model":"element.tag","title":"lost"}"#, false);
    conn.execute(
        "UPDATE import_jobs SET payload = 'garbage' WHERE job_id = ?1",
        [corrupt.as_str()],
    )
    .unwrap();
    let good = queue_text(&conn, r#"{"@model":"element.tag","title":"kept"}"#, false);

    // WHEN the worker drains the queue
    let summary = run_pending(&conn, &registry, 10).unwrap();

    // THEN both jobs were run, the corrupt one failed and the good one completed
    assert_eq!(summary.jobs_run(), 2);
    assert_eq!(summary.runs[0].job_id, corrupt);
    assert_eq!(summary.runs[0].status, JobStatus::Failed);
    let err = summary.runs[0].errors.errors()[0].clone();
    assert_eq!(err.kind(), ExErrorKind::Serialization);
    assert_eq!(summary.runs[1].job_id, good);
    assert_eq!(summary.runs[1].status, JobStatus::Completed);

    // AND nothing is left running or pending
    let counts = SqliteJobQueue::new(&conn).counts().unwrap();
    assert_eq!(
        counts,
        QueueCounts {
            pending: 0,
            running: 0,
            completed: 1,
            failed: 1,
        }
    );
    assert_eq!(common::count_rows(&conn, "elements"), 1);
}

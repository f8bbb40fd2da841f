#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Job preparation tests
//!
//! ## Scenarios Covered
//!
//! 1. Posted text yields one structured job or one error
//! 2. Uploaded files fail fast and never leave staged copies behind
//! 3. Bundle files yield one job per file, in order
//! 4. Entry points accumulate into one collection

mod common;

use seedbed_core::job_builder::{ImportJobBuilder, UploadedFile};
use seedbed_core::model::{Payload, SeedOrigin};
use seedbed_core::types::RequestContext;
use serde_json::json;
use tempfile::TempDir;

fn builder_in(staging: &TempDir) -> ImportJobBuilder {
    ImportJobBuilder::new(RequestContext::new()).with_staging_root(staging.path())
}

#[test]
fn test_posted_payload_yields_one_structured_job() {
    let mut builder = ImportJobBuilder::new(RequestContext::new());

    builder.from_posted_payload(
        r#"[{"@model":"element.entry","title":"A"},{"@model":"element.entry","title":"B"}]"#,
        true,
    );
    let out = builder.finish();

    assert_eq!(out.jobs.len(), 1);
    assert!(out.errors.is_empty());
    let job = &out.jobs[0];
    assert_eq!(job.seed.origin(), SeedOrigin::Post);
    assert!(job.seed.enabled());
    assert_eq!(
        job.payload,
        Payload::Decoded(json!([
            {"@model": "element.entry", "title": "A"},
            {"@model": "element.entry", "title": "B"}
        ]))
    );
}

#[test]
fn test_malformed_posted_payload_yields_error_only() {
    let mut builder = ImportJobBuilder::new(RequestContext::new());

    builder.from_posted_payload("[{\"@model\": ", false);
    let out = builder.finish();

    assert!(!out.has_jobs());
    assert_eq!(out.errors.len(), 1);
    let err = out.errors.first("json").unwrap();
    assert!(err.request_id().is_some());
}

#[test]
fn test_uploaded_files_fail_fast_at_first_invalid() {
    // GIVEN four uploads where the third is not JSON
    let uploads = TempDir::new().unwrap();
    let staging = TempDir::new().unwrap();
    let files: Vec<UploadedFile> = [
        ("one.json", r#"{"@model":"element.tag","title":"one"}"#),
        ("two.json", r#"[{"@model":"element.tag","title":"two"}]"#),
        ("three.json", "not json at all"),
        ("four.json", r#"{"@model":"element.tag","title":"four"}"#),
    ]
    .iter()
    .map(|(name, content)| UploadedFile::new(*name, common::write_file(uploads.path(), name, content)))
    .collect();

    // WHEN the files are prepared
    let mut builder = builder_in(&staging);
    builder.from_uploaded_files(&files, true);
    let out = builder.finish();

    // THEN only the files before the invalid one produced jobs
    assert_eq!(out.jobs.len(), 2);
    assert!(out.jobs.iter().all(|j| j.seed.origin() == SeedOrigin::File));
    assert_eq!(out.errors.len(), 1);
    assert_eq!(out.errors.first("json").unwrap().file(), Some("three.json"));

    // AND nothing is left in the staging area
    assert_eq!(common::entry_count(staging.path()), 0);
}

#[test]
fn test_unreadable_upload_recorded_under_file_key() {
    let staging = TempDir::new().unwrap();
    let files = vec![UploadedFile::new("gone.json", staging.path().join("missing/gone.json"))];

    let mut builder = builder_in(&staging);
    builder.from_uploaded_files(&files, false);
    let out = builder.finish();

    assert!(out.jobs.is_empty());
    let err = out.errors.first("file").unwrap();
    assert!(err.message().contains("Unable to import file: gone.json"));
    assert_eq!(common::entry_count(staging.path()), 0);
}

#[test]
fn test_transport_error_stops_before_later_files() {
    let uploads = TempDir::new().unwrap();
    let staging = TempDir::new().unwrap();
    let good = common::write_file(uploads.path(), "good.json", r#"{"@model":"element.tag"}"#);
    let files = vec![
        UploadedFile::new("good.json", good.clone()),
        UploadedFile::failed("big.json", "The uploaded file exceeds the size limit"),
        UploadedFile::new("good-again.json", good),
    ];

    let mut builder = builder_in(&staging);
    builder.from_uploaded_files(&files, false);
    let out = builder.finish();

    assert_eq!(out.jobs.len(), 1);
    assert_eq!(out.errors.get("file").len(), 1);
    assert_eq!(common::entry_count(staging.path()), 0);
}

#[test]
fn test_empty_inputs_are_noops() {
    let staging = TempDir::new().unwrap();
    let mut builder = builder_in(&staging);

    builder
        .from_posted_payload("", true)
        .from_uploaded_files(&[], true)
        .from_bundle_files::<&str>(&[], true);
    let out = builder.finish();

    assert!(out.jobs.is_empty());
    assert!(out.errors.is_empty());
    assert_eq!(common::entry_count(staging.path()), 0);
}

#[test]
fn test_bundle_files_one_job_each() {
    let dir = TempDir::new().unwrap();
    let paths = vec![
        common::write_file(dir.path(), "01-sections.json", r#"[{"@model":"setting.section","handle":"news"}]"#),
        common::write_file(dir.path(), "02-entries.json", r#"[{"@model":"element.entry","title":"Hello"}]"#),
    ];

    let mut builder =
        ImportJobBuilder::new(RequestContext::new()).with_seed_details("Starter blog");
    builder.from_bundle_files(&paths, true);
    let out = builder.finish();

    assert_eq!(out.jobs.len(), 2);
    assert!(out.errors.is_empty());
    for job in &out.jobs {
        assert_eq!(job.seed.origin(), SeedOrigin::Bundle);
        assert_eq!(job.seed.details(), Some("Starter blog"));
    }
    // Every job of one call shares the same seed context
    assert_eq!(out.jobs[0].seed, out.jobs[1].seed);
}

#[test]
fn test_bundle_invalid_file_aborts_remaining() {
    let dir = TempDir::new().unwrap();
    let paths = vec![
        common::write_file(dir.path(), "a.json", "{ broken"),
        common::write_file(dir.path(), "b.json", "[]"),
    ];

    let mut builder = ImportJobBuilder::new(RequestContext::new());
    builder.from_bundle_files(&paths, false);
    let out = builder.finish();

    assert!(out.jobs.is_empty());
    assert_eq!(out.errors.len(), 1);
}

#[test]
fn test_entry_points_accumulate() {
    let dir = TempDir::new().unwrap();
    let upload = common::write_file(dir.path(), "tags.json", r#"[{"@model":"element.tag"}]"#);
    let staging = TempDir::new().unwrap();

    let mut builder = builder_in(&staging);
    builder
        .from_uploaded_files(&[UploadedFile::new("tags.json", upload)], false)
        .from_posted_payload("{oops", false)
        .from_posted_payload(r#"{"@model":"setting.widget"}"#, false);
    let out = builder.finish();

    assert_eq!(out.jobs.len(), 2);
    assert_eq!(out.errors.len(), 1);
    assert_eq!(out.jobs[0].seed.origin(), SeedOrigin::File);
    assert_eq!(out.jobs[1].seed.origin(), SeedOrigin::Post);
}

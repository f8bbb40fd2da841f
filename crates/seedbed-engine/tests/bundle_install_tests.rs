#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Install-bundle command tests
//!
//! ## Scenarios Covered
//!
//! 1. Templates are copied and one job per schema file is queued
//! 2. Bundle jobs carry origin bundle and the bundle name as details
//! 3. An invalid schema file with no earlier job fails the install
//! 4. A queue rejection keeps earlier jobs and reports the failure

mod common;

use seedbed_core::memory::MemoryQueue;
use seedbed_core::SeedOrigin;
use seedbed_engine::commands::bundle::{install_bundle, Bundle, FsTemplateInstaller, NoTemplates};
use seedbed_engine::Notice;
use seedbed_store::SqliteJobQueue;
use std::path::Path;
use tempfile::TempDir;

fn starter_bundle(root: &Path) -> Bundle {
    let dir = root.join("starter-blog");
    common::write_file(
        &dir,
        "schema/01-sections.json",
        r#"[{"@model":"setting.section","handle":"news","name":"News"}]"#,
    );
    common::write_file(
        &dir,
        "schema/02-entries.json",
        r#"[{"@model":"element.entry","title":"Welcome"}]"#,
    );
    common::write_file(&dir, "templates/index.twig", "<h1>{{ title }}</h1>");
    common::write_file(&dir, "templates/news/_entry.twig", "{{ entry.title }}");
    Bundle::from_dir(&dir).unwrap()
}

#[test]
fn test_install_copies_templates_and_queues_schema() {
    // GIVEN a bundle with two schema files and two templates
    let (_tmp, conn) = common::setup_db();
    let work = TempDir::new().unwrap();
    let bundle = starter_bundle(work.path());
    let destination = work.path().join("site-templates");

    // WHEN it is installed with seeding on
    let queue = SqliteJobQueue::new(&conn);
    let installer = FsTemplateInstaller::new(&destination);
    let result = install_bundle(&bundle, true, &installer, &queue).unwrap();

    // THEN the templates are in place
    assert_eq!(result.templates_copied, 2);
    assert!(destination.join("index.twig").is_file());
    assert!(destination.join("news").join("_entry.twig").is_file());

    // AND one seeded job per schema file was queued, in file order
    assert_eq!(result.notice, Notice::BundleImporting);
    assert_eq!(result.queued.len(), 2);
    let first = queue.get(&result.queued[0]).unwrap().unwrap().job;
    assert_eq!(first.seed.origin(), SeedOrigin::Bundle);
    assert_eq!(first.seed.details(), Some("starter-blog"));
    assert!(first.seed.enabled());
    assert!(serde_json::to_string(&first.payload)
        .unwrap()
        .contains("setting.section"));
}

#[test]
fn test_invalid_first_schema_fails_install() {
    let work = TempDir::new().unwrap();
    let dir = work.path().join("broken");
    common::write_file(&dir, "schema/a.json", "{oops");
    common::write_file(&dir, "schema/b.json", "[]");
    let bundle = Bundle::from_dir(&dir).unwrap();
    let queue = MemoryQueue::new();

    let result = install_bundle(&bundle, false, &NoTemplates, &queue).unwrap();

    assert_eq!(result.notice, Notice::BundleFailed);
    assert_eq!(result.notice.to_string(), "Unable to import bundle.");
    assert!(result.errors.first("json").is_some());
    assert!(queue.is_empty());
}

#[test]
fn test_queue_rejection_reports_failure() {
    // GIVEN a queue with room for one job and a bundle with two schema files
    let work = TempDir::new().unwrap();
    let bundle = starter_bundle(work.path());
    let queue = MemoryQueue::bounded(1);

    // WHEN the bundle is installed
    let result = install_bundle(&bundle, false, &NoTemplates, &queue).unwrap();

    // THEN the first job stays queued and the rejection is filed under queue
    assert_eq!(result.queued.len(), 1);
    assert_eq!(queue.len(), 1);
    assert_eq!(result.errors.get("queue").len(), 1);
    assert_eq!(result.notice, Notice::BundleFailed);
}

#[test]
fn test_missing_templates_directory_is_allowed() {
    let work = TempDir::new().unwrap();
    let dir = work.path().join("schema-only");
    common::write_file(&dir, "schema/a.json", "[]");
    let bundle = Bundle::from_dir(&dir).unwrap();
    let queue = MemoryQueue::new();
    let installer = FsTemplateInstaller::new(work.path().join("out"));

    let result = install_bundle(&bundle, false, &installer, &queue).unwrap();

    assert_eq!(result.templates_copied, 0);
    assert_eq!(result.notice, Notice::BundleImporting);
    assert!(!work.path().join("out").exists());
}

#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;
use seedbed_core::job_builder::ImportJobBuilder;
use seedbed_core::model::{Payload, SeedOrigin};
use seedbed_core::types::RequestContext;
use serde_json::{json, Value};

fn row_strategy() -> impl Strategy<Value = Value> {
    (
        prop::sample::select(vec!["element.entry", "element.tag", "setting.section"]),
        "[a-zA-Z0-9 ]{0,24}",
        any::<i32>(),
    )
        .prop_map(|(model, title, n)| json!({"@model": model, "title": title, "n": n}))
}

proptest! {
    #[test]
    fn prop_well_formed_text_yields_one_post_job(rows in prop::collection::vec(row_strategy(), 0..8)) {
        let value = Value::Array(rows);
        let text = serde_json::to_string(&value).unwrap();

        let mut builder = ImportJobBuilder::new(RequestContext::new());
        builder.from_posted_payload(&text, false);
        let out = builder.finish();

        prop_assert_eq!(out.jobs.len(), 1);
        prop_assert!(out.errors.is_empty());
        prop_assert_eq!(out.jobs[0].seed.origin(), SeedOrigin::Post);
        prop_assert_eq!(&out.jobs[0].payload, &Payload::Decoded(value));
    }

    #[test]
    fn prop_truncated_text_yields_no_job(rows in prop::collection::vec(row_strategy(), 1..6), cut in 1usize..8) {
        let text = serde_json::to_string(&Value::Array(rows)).unwrap();
        let truncated = &text[..text.len() - cut.min(text.len() - 1)];

        let mut builder = ImportJobBuilder::new(RequestContext::new());
        builder.from_posted_payload(truncated, true);
        let out = builder.finish();

        prop_assert!(out.jobs.is_empty());
        prop_assert_eq!(out.errors.len(), 1);
    }
}

use paperstack_config::{Config, SchemaConfig};
use paperstack_merge::{add_records, dedup_batch, fields_equal, ConflictPolicy};
use paperstack_record::{FieldValue, Record};

fn schema() -> SchemaConfig {
    Config::default().schema()
}

fn paper(title: &str, doi: &str, category: &str, submitted: &str) -> Record {
    let mut record = Record::new();
    record.set("title", FieldValue::Str(title.into()));
    if !doi.is_empty() {
        record.set("doi", FieldValue::Str(doi.into()));
    }
    record.set("authors", FieldValue::Str("A. Author".into()));
    if !category.is_empty() {
        record.set("category", FieldValue::List(vec![category.into()]));
    }
    record.set("submission_time", FieldValue::Str(submitted.into()));
    record
}

// -------------------------------------------------------------------------
// Multi-batch lifecycle
// -------------------------------------------------------------------------

#[test]
fn successive_batches_fold_into_stable_collection() {
    let s = schema();

    // Seed batch: three distinct papers across two categories.
    let batch_1 = vec![
        paper("Prefix Pruning", "10.1234/pp", "make_cot_short", "2026-01-10 09:00:00"),
        paper("Draft Verify", "10.1234/dv", "efficient_decoding", "2026-01-11 09:00:00"),
        paper("Token Skip", "10.1234/ts", "make_cot_short", "2026-01-12 09:00:00"),
    ];
    let first = add_records(&[], &batch_1, ConflictPolicy::Mark, &s);
    assert_eq!(first.added.len(), 3);
    assert!(first.conflicted.is_empty());

    // Second batch: one resubmission, one conflicting edit, one new paper.
    let resubmit = paper("Prefix Pruning", "10.1234/pp", "make_cot_short", "2026-01-10 09:00:00");
    let mut edited = paper("Token Skip", "10.1234/ts", "make_cot_short", "2026-02-01 09:00:00");
    edited.set("status", FieldValue::Str("done".into()));
    let fresh = paper("KV Cache Diet", "10.1234/kv", "efficient_decoding", "2026-02-02 09:00:00");

    let second = add_records(
        &first.collection,
        &[resubmit, edited, fresh],
        ConflictPolicy::Mark,
        &s,
    );
    assert_eq!(second.added.len(), 1);
    assert_eq!(second.conflicted.len(), 1);
    assert_eq!(second.skipped.len(), 1);
    assert_eq!(second.collection.len(), 5);

    // make_cot_short (order 0) precedes efficient_decoding (order 2); within
    // make_cot_short the Token Skip group sorts by its live record's time,
    // with the flagged edit directly before it.
    let titles: Vec<String> = second.collection.iter().map(|r| r.title()).collect();
    assert_eq!(
        titles,
        vec!["Token Skip", "Token Skip", "Prefix Pruning", "KV Cache Diet", "Draft Verify"]
    );
    assert!(second.collection[0].conflict_marker());
    assert!(!second.collection[1].conflict_marker());
}

#[test]
fn marked_conflict_survives_reload_and_resolution_by_replace() {
    let s = schema();
    let live = paper("Survey of Distillation", "10.2345/sd", "background_papers", "2026-01-01 08:00:00");
    let mut edit = paper("Survey of Distillation", "", "background_papers", "2026-01-05 08:00:00");
    edit.set("notes", FieldValue::Str("adds section 7".into()));

    let marked = add_records(&[live], &[edit], ConflictPolicy::Mark, &s);
    assert_eq!(marked.conflicted.len(), 1);
    assert_eq!(marked.collection.len(), 2);

    // Manual resolution: the curator resubmits the merged result under
    // `replace`, collapsing the group back to a single live record.
    let mut resolved =
        paper("Survey of Distillation", "10.2345/sd", "background_papers", "2026-01-06 08:00:00");
    resolved.set("notes", FieldValue::Str("adds section 7".into()));

    let replaced = add_records(&marked.collection, &[resolved], ConflictPolicy::Replace, &s);
    assert_eq!(replaced.collection.len(), 1);
    assert!(!replaced.collection[0].conflict_marker());
    assert_eq!(replaced.collection[0].text("notes"), "adds section 7");
}

#[test]
fn dedup_then_merge_matches_spec_scenario() {
    let s = schema();

    // The update file holds the same submission twice plus a blank row.
    let noisy = vec![
        paper("Foo", "", "", "2026-03-01 10:00:00"),
        paper("Foo", "", "", "2026-03-01 10:00:00"),
        Record::new(),
    ];
    let batch = dedup_batch(&noisy);
    assert_eq!(batch.len(), 1);

    let existing = vec![paper("Foo", "10.1234/x", "", "2026-02-01 10:00:00")];
    let outcome = add_records(&existing, &batch, ConflictPolicy::Mark, &s);

    // Title matches, but the incoming submission_time is a system field, so
    // the subset comparison sees identical content → exact resubmission.
    assert!(outcome.added.is_empty());
    assert!(outcome.conflicted.is_empty());
    assert_eq!(outcome.skipped.len(), 1);
}

#[test]
fn round_trip_equality_is_strict_fields_equal() {
    let s = schema();
    let mut record = paper("Foo", "10.1234/x", "make_cot_short", "2026-01-01 00:00:00");
    record.set("show_in_readme", FieldValue::Bool(true));

    // Simulate a store round-trip that rewrites values in canonical text form.
    let mut reloaded = Record::new();
    for key in record.field_names().map(str::to_string).collect::<Vec<_>>() {
        let value = record.get(&key).cloned();
        if let Some(value) = value {
            reloaded.set(key, FieldValue::Str(value.text()));
        }
    }

    assert!(fields_equal(&record, &reloaded, true, Some(&[]), &s));
}

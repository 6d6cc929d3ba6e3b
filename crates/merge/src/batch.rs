use std::collections::BTreeSet;

use paperstack_config::SchemaConfig;
use paperstack_record::{FieldValue, Record};

use crate::identity::same_identity;

/// In-batch dedup of an update file before merging: records that are blank on
/// both identity fields are dropped, later repeats of a display key are
/// dropped. Cross-file dedup is the merge engine's job, not this one's.
pub fn dedup_batch(records: &[Record]) -> Vec<Record> {
    let mut seen: BTreeSet<(String, String)> = BTreeSet::new();
    let mut unique = Vec::new();

    for record in records {
        if record.is_blank() {
            continue;
        }
        if seen.insert(record.display_key()) {
            unique.push(record.clone());
        }
    }

    unique
}

/// Apply field updates to the first record matching `target` — by UID when
/// both sides carry one, by identity otherwise. Returns whether a record
/// was changed.
pub fn update_record(
    collection: &mut [Record],
    target: &Record,
    updates: &[(String, FieldValue)],
    schema: &SchemaConfig,
) -> bool {
    match find_index(collection, target, schema) {
        Some(idx) => {
            for (key, value) in updates {
                collection[idx].set(key.clone(), value.clone());
            }
            true
        }
        None => false,
    }
}

/// Remove the first record matching `target` (UID-first, identity fallback).
pub fn remove_record(
    collection: &mut Vec<Record>,
    target: &Record,
    schema: &SchemaConfig,
) -> bool {
    match find_index(collection, target, schema) {
        Some(idx) => {
            collection.remove(idx);
            true
        }
        None => false,
    }
}

fn find_index(collection: &[Record], target: &Record, schema: &SchemaConfig) -> Option<usize> {
    let target_uid = target.uid();
    if !target_uid.is_empty() {
        if let Some(idx) = collection.iter().position(|r| r.uid() == target_uid) {
            return Some(idx);
        }
    }
    collection.iter().position(|r| same_identity(r, target, schema))
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperstack_config::Config;

    fn schema() -> SchemaConfig {
        Config::default().schema()
    }

    fn rec(pairs: &[(&str, &str)]) -> Record {
        let mut record = Record::new();
        for (k, v) in pairs {
            record.set(*k, FieldValue::Str((*v).to_string()));
        }
        record
    }

    #[test]
    fn dedup_drops_blanks_and_repeats() {
        let batch = vec![
            Record::new(),
            rec(&[("title", "A")]),
            rec(&[("title", "A")]),
            rec(&[("title", "B")]),
        ];
        let unique = dedup_batch(&batch);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].title(), "A");
        assert_eq!(unique[1].title(), "B");
    }

    #[test]
    fn dedup_keeps_distinct_keys_with_same_title() {
        // display key is (doi, title): same title, different DOI survives
        let batch = vec![rec(&[("title", "A"), ("doi", "10.1234/x")]), rec(&[("title", "A")])];
        assert_eq!(dedup_batch(&batch).len(), 2);
    }

    #[test]
    fn update_prefers_uid_match() {
        let s = schema();
        let mut a = rec(&[("title", "Same Title")]);
        a.set("uid", FieldValue::Str("aaaaaaaaaaaa".into()));
        let mut b = rec(&[("title", "same title")]);
        b.set("uid", FieldValue::Str("bbbbbbbbbbbb".into()));
        let mut collection = vec![a, b];

        let mut target = rec(&[("title", "Same Title")]);
        target.set("uid", FieldValue::Str("bbbbbbbbbbbb".into()));

        let changed = update_record(
            &mut collection,
            &target,
            &[("status".into(), FieldValue::Str("done".into()))],
            &s,
        );
        assert!(changed);
        assert_eq!(collection[0].text("status"), "");
        assert_eq!(collection[1].text("status"), "done");
    }

    #[test]
    fn update_falls_back_to_identity() {
        let s = schema();
        let mut collection = vec![rec(&[("title", "Foo")])];
        let changed = update_record(
            &mut collection,
            &rec(&[("title", "foo")]),
            &[("notes".into(), FieldValue::Str("n".into()))],
            &s,
        );
        assert!(changed);
        assert_eq!(collection[0].text("notes"), "n");
    }

    #[test]
    fn remove_takes_at_most_one() {
        let s = schema();
        let mut collection = vec![rec(&[("title", "Foo")]), rec(&[("title", "foo")])];
        assert!(remove_record(&mut collection, &rec(&[("title", "FOO")]), &s));
        assert_eq!(collection.len(), 1);
        assert!(!remove_record(&mut collection, &rec(&[("title", "gone")]), &s));
    }
}

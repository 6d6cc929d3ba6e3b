use std::collections::BTreeSet;

use paperstack_config::SchemaConfig;
use paperstack_record::record::DOI;
use paperstack_record::{normalized_doi, FieldValue, Record};

/// Whether two records denote the same publication: DOI match (normalized,
/// marker-stripped) non-empty on both sides, else title match (trimmed,
/// case-insensitive) non-empty on both sides.
///
/// Deliberately loose and NOT transitive — A can match B on title while B
/// matches C on DOI. It is evaluated pairwise every time and must never be
/// cached as a global partition.
pub fn same_identity(a: &Record, b: &Record, schema: &SchemaConfig) -> bool {
    let doi_a = normalized_doi(&a.doi(), &schema.conflict_marker);
    let doi_b = normalized_doi(&b.doi(), &schema.conflict_marker);
    if !doi_a.is_empty() && !doi_b.is_empty() && doi_a == doi_b {
        return true;
    }

    let title_a = a.title().to_lowercase();
    let title_b = b.title().to_lowercase();
    !title_a.is_empty() && !title_b.is_empty() && title_a == title_b
}

/// Content equality between two records.
///
/// Strict mode compares the union of fields minus `ignore_fields` (default:
/// the schema's system fields) — used for round-trip verification.
///
/// Subset mode treats `a` as the sparse side: `a`'s non-empty field set must
/// be a subset of `b`'s, and every non-empty field of `a` must agree with
/// `b`. A submission carrying fewer fields than a stored record is "the same
/// content, just less complete"; one claiming a field the stored record lacks
/// is not a safe duplicate.
pub fn fields_equal(
    a: &Record,
    b: &Record,
    strict: bool,
    ignore_fields: Option<&[String]>,
    schema: &SchemaConfig,
) -> bool {
    let default_ignore;
    let ignore: &[String] = match ignore_fields {
        Some(fields) => fields,
        None => {
            default_ignore = schema.system_keys();
            &default_ignore
        }
    };
    let ignored = |key: &str| ignore.iter().any(|i| i == key);

    if strict {
        let keys: BTreeSet<&str> = a
            .field_names()
            .chain(b.field_names())
            .filter(|k| !ignored(k))
            .collect();
        keys.into_iter()
            .all(|key| values_agree(key, a.get(key), b.get(key), schema))
    } else {
        let non_empty = |record: &'_ Record| -> BTreeSet<String> {
            record
                .field_names()
                .filter(|k| !ignored(k))
                .filter(|k| record.get(k).map(|v| !v.is_empty()).unwrap_or(false))
                .map(str::to_string)
                .collect()
        };

        let a_keys = non_empty(a);
        let b_keys = non_empty(b);
        if !a_keys.is_subset(&b_keys) {
            return false;
        }
        a_keys
            .iter()
            .all(|key| values_agree(key, a.get(key), b.get(key), schema))
    }
}

/// Exact-resubmission detector: among the same-identity entries of
/// `existing`, is any content-equal to `incoming`? The incoming record is
/// the subset side of the comparison.
pub fn is_duplicate(
    existing: &[Record],
    incoming: &Record,
    strict: bool,
    schema: &SchemaConfig,
) -> bool {
    let rivals: Vec<&Record> = existing
        .iter()
        .filter(|entry| same_identity(entry, incoming, schema))
        .collect();
    if rivals.is_empty() {
        return false;
    }
    rivals
        .iter()
        .any(|entry| fields_equal(incoming, entry, strict, None, schema))
}

fn values_agree(
    key: &str,
    a: Option<&FieldValue>,
    b: Option<&FieldValue>,
    schema: &SchemaConfig,
) -> bool {
    if key == DOI {
        let text = |v: Option<&FieldValue>| v.map(FieldValue::text).unwrap_or_default();
        return normalized_doi(&text(a), &schema.conflict_marker)
            == normalized_doi(&text(b), &schema.conflict_marker);
    }

    match (a, b) {
        (Some(va), Some(vb))
            if matches!(va, FieldValue::Bool(_)) || matches!(vb, FieldValue::Bool(_)) =>
        {
            va.truthy() == vb.truthy()
        }
        _ => {
            let text = |v: Option<&FieldValue>| v.map(FieldValue::text).unwrap_or_default();
            text(a) == text(b)
        }
    }
}

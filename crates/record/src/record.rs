use std::collections::BTreeMap;

use paperstack_config::SchemaConfig;

use crate::doi::clean_doi;
use crate::uid::derive_uid;
use crate::value::{split_list, FieldValue};

// Well-known field keys. Identity fields:
pub const DOI: &str = "doi";
pub const TITLE: &str = "title";
// System fields:
pub const UID: &str = "uid";
pub const SUBMISSION_TIME: &str = "submission_time";
pub const CONFLICT_MARKER: &str = "conflict_marker";
pub const SHOW_IN_README: &str = "show_in_readme";
// Content fields the engine and renderer treat specially:
pub const CATEGORY: &str = "category";
pub const CONTRIBUTOR: &str = "contributor";

/// A paper. The attribute set is open — driven by the schema, not fixed here —
/// so everything lives in a name→value map with typed accessors for the
/// well-known keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: FieldValue) {
        self.values.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.values.remove(key)
    }

    /// Trimmed string form of a field; empty string when absent.
    pub fn text(&self, key: &str) -> String {
        self.values.get(key).map(FieldValue::text).unwrap_or_default()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn doi(&self) -> String {
        self.text(DOI)
    }

    pub fn title(&self) -> String {
        self.text(TITLE)
    }

    pub fn uid(&self) -> String {
        self.text(UID)
    }

    pub fn submission_time(&self) -> String {
        self.text(SUBMISSION_TIME)
    }

    pub fn conflict_marker(&self) -> bool {
        self.values.get(CONFLICT_MARKER).map(FieldValue::truthy).unwrap_or(false)
    }

    pub fn set_conflict_marker(&mut self, flagged: bool) {
        self.set(CONFLICT_MARKER, FieldValue::Bool(flagged));
    }

    /// Records default to visible; only an explicit falsy value hides one.
    pub fn show_in_readme(&self) -> bool {
        self.values.get(SHOW_IN_README).map(FieldValue::truthy).unwrap_or(true)
    }

    /// Human-debuggable display key. Distinct from the identity relation,
    /// which is a pairwise predicate, not a materialized key.
    pub fn display_key(&self) -> (String, String) {
        (self.doi(), self.title())
    }

    /// Both identity components empty: such records never join any group.
    pub fn is_blank(&self) -> bool {
        self.doi().is_empty() && self.title().is_empty()
    }

    pub fn categories(&self) -> Vec<String> {
        match self.values.get(CATEGORY) {
            Some(FieldValue::List(items)) => items.clone(),
            Some(other) => split_list(&other.text()),
            None => Vec::new(),
        }
    }

    pub fn first_category(&self) -> Option<String> {
        self.categories().into_iter().next()
    }

    /// Derive and store the stable UID if the record has none yet.
    pub fn ensure_uid(&mut self) {
        if self.uid().is_empty() {
            let uid = derive_uid(&self.title(), &self.doi());
            self.set(UID, FieldValue::Str(uid));
        }
    }
}

/// Normalize a record against the schema. Invoked by the adapter layer on
/// intake; the record type itself carries no configuration dependency.
pub fn normalize(record: &mut Record, schema: &SchemaConfig) {
    let doi = record.doi();
    if !doi.is_empty() {
        let cleaned = clean_doi(&normalized_doi_keep_case(&doi, &schema.conflict_marker));
        record.set(DOI, FieldValue::Str(cleaned));
    }

    let categories = record.categories();
    if !categories.is_empty() {
        let mut seen = std::collections::BTreeSet::new();
        let mut kept = Vec::new();
        for cat in categories {
            if seen.insert(cat.clone()) {
                kept.push(cat);
            }
            if kept.len() >= schema.max_categories {
                break;
            }
        }
        record.set(CATEGORY, FieldValue::List(kept));
    }
}

// Marker removal without the lowercasing `normalized_doi` applies; the stored
// DOI keeps its original case.
fn normalized_doi_keep_case(raw: &str, marker: &str) -> String {
    if marker.is_empty() {
        return raw.trim().to_string();
    }
    raw.replace(marker, "").trim().to_string()
}

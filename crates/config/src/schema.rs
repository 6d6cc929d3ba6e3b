use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Field specs
// ---------------------------------------------------------------------------

/// Value kind a field's raw text is coerced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    String,
    Bool,
    Int,
    Float,
    /// Pipe-delimited list in file form; legacy `;`-separated input accepted.
    List,
}

/// One column of the collection: key is the stable system id (CSV header
/// row 2), label the human name (row 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    /// System fields are excluded from content-equality comparison.
    #[serde(default)]
    pub system: bool,
    #[serde(default)]
    pub order: u32,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Optional regex a non-empty value must fully match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySpec {
    /// Stable unique key stored in record category fields.
    pub key: String,
    /// Display name used in rendered headings.
    pub name: String,
    #[serde(default)]
    pub order: u32,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Sort rank for category tokens that are not in the configured list;
/// they always land after every configured category.
pub const UNMAPPED_CATEGORY_RANK: (u32, usize) = (u32::MAX, usize::MAX);

// ---------------------------------------------------------------------------
// SchemaConfig
// ---------------------------------------------------------------------------

/// The engine-facing schema: ordered field list, system-field set, category
/// ordering, and the conflict-marker decoration. Built once at process start
/// from [`crate::Config`] and passed by reference everywhere.
#[derive(Debug, Clone)]
pub struct SchemaConfig {
    pub fields: Vec<FieldSpec>,
    pub categories: Vec<CategorySpec>,
    /// Visible decoration a flagged record's DOI may carry in the flat file.
    pub conflict_marker: String,
    /// Cap on category tokens kept per record during normalization.
    pub max_categories: usize,
}

impl SchemaConfig {
    /// Enabled fields in column order.
    pub fn active_fields(&self) -> Vec<&FieldSpec> {
        let mut fields: Vec<&FieldSpec> = self.fields.iter().filter(|f| f.enabled).collect();
        fields.sort_by_key(|f| f.order);
        fields
    }

    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Keys of system fields, the default ignore set for content equality.
    pub fn system_keys(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| f.system)
            .map(|f| f.key.clone())
            .collect()
    }

    pub fn active_categories(&self) -> Vec<&CategorySpec> {
        let mut cats: Vec<&CategorySpec> = self.categories.iter().filter(|c| c.enabled).collect();
        cats.sort_by_key(|c| c.order);
        cats
    }

    /// Sort rank of a category token. Unknown tokens rank last.
    pub fn category_rank(&self, key: &str) -> (u32, usize) {
        self.categories
            .iter()
            .enumerate()
            .find(|(_, c)| c.enabled && c.key == key)
            .map(|(i, c)| (c.order, i))
            .unwrap_or(UNMAPPED_CATEGORY_RANK)
    }

    pub fn category_name(&self, key: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.key == key)
            .map(|c| c.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> SchemaConfig {
        SchemaConfig {
            fields: vec![
                FieldSpec {
                    key: "title".into(),
                    label: "Title".into(),
                    kind: FieldKind::String,
                    required: true,
                    system: false,
                    order: 1,
                    enabled: true,
                    pattern: None,
                },
                FieldSpec {
                    key: "uid".into(),
                    label: "UID".into(),
                    kind: FieldKind::String,
                    required: false,
                    system: true,
                    order: 0,
                    enabled: true,
                    pattern: None,
                },
                FieldSpec {
                    key: "notes".into(),
                    label: "Notes".into(),
                    kind: FieldKind::String,
                    required: false,
                    system: false,
                    order: 2,
                    enabled: false,
                    pattern: None,
                },
            ],
            categories: vec![
                CategorySpec { key: "surveys".into(), name: "Surveys".into(), order: 1, enabled: true },
                CategorySpec { key: "models".into(), name: "Models".into(), order: 0, enabled: true },
                CategorySpec { key: "retired".into(), name: "Retired".into(), order: 2, enabled: false },
            ],
            conflict_marker: "[conflict]".into(),
            max_categories: 4,
        }
    }

    #[test]
    fn unmapped_rank_sorts_last() {
        let s = schema();
        for cat in s.active_categories() {
            assert!(s.category_rank(&cat.key) < UNMAPPED_CATEGORY_RANK);
        }
    }

    #[test]
    fn active_fields_ordered_and_filtered() {
        let s = schema();
        let keys: Vec<&str> = s.active_fields().iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["uid", "title"]);
    }

    #[test]
    fn system_keys() {
        assert_eq!(schema().system_keys(), vec!["uid".to_string()]);
    }

    #[test]
    fn category_rank_orders_by_order_field() {
        let s = schema();
        assert!(s.category_rank("models") < s.category_rank("surveys"));
        assert_eq!(s.category_rank("unknown"), UNMAPPED_CATEGORY_RANK);
        // disabled categories rank as unmapped
        assert_eq!(s.category_rank("retired"), UNMAPPED_CATEGORY_RANK);
    }

    #[test]
    fn active_categories_sorted() {
        let s = schema();
        let keys: Vec<&str> = s.active_categories().iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["models", "surveys"]);
    }
}

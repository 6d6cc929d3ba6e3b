use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::schema::{CategorySpec, FieldKind, FieldSpec, SchemaConfig};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Parsed `paperstack.toml`. Paths are interpreted relative to the config
/// file's directory by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default = "default_fields")]
    pub fields: Vec<FieldSpec>,
    #[serde(default = "default_categories")]
    pub categories: Vec<CategorySpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            database: DatabaseConfig::default(),
            render: RenderConfig::default(),
            fields: default_fields(),
            categories: default_categories(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// The core collection file (.csv or .json).
    pub database: String,
    pub backup_dir: String,
    pub assets_dir: String,
    /// Freshly submitted, not-yet-merged batches.
    pub update_files: Vec<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            database: "collection/papers.csv".into(),
            backup_dir: "collection/backups".into(),
            assets_dir: "assets".into(),
            update_files: vec!["submissions/update.csv".into(), "submissions/update.json".into()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub conflict_marker: String,
    pub default_contributor: String,
    pub max_categories_per_record: usize,
    /// Rewrite update files without the records absorbed into the core.
    pub remove_merged_from_updates: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            conflict_marker: "[conflict]".into(),
            default_contributor: "anonymous".into(),
            max_categories_per_record: 4,
            remove_merged_from_updates: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub max_title_length: usize,
    pub max_authors_length: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_title_length: 100,
            max_authors_length: 150,
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl Config {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fields.is_empty() {
            return Err(ConfigError::Validation("at least one field is required".into()));
        }

        let mut seen = std::collections::BTreeSet::new();
        for field in &self.fields {
            if field.key.trim().is_empty() {
                return Err(ConfigError::Validation("field with empty key".into()));
            }
            if !seen.insert(field.key.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate field key '{}'",
                    field.key
                )));
            }
            if let Some(ref pattern) = field.pattern {
                regex::Regex::new(pattern).map_err(|e| {
                    ConfigError::Validation(format!(
                        "field '{}': bad validation pattern: {e}",
                        field.key
                    ))
                })?;
            }
        }

        for key in ["doi", "title"] {
            if !seen.contains(key) {
                return Err(ConfigError::Validation(format!(
                    "identity field '{key}' missing from schema"
                )));
            }
        }

        let mut cat_seen = std::collections::BTreeSet::new();
        for cat in &self.categories {
            if cat.key.trim().is_empty() {
                return Err(ConfigError::Validation("category with empty key".into()));
            }
            if !cat_seen.insert(cat.key.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate category key '{}'",
                    cat.key
                )));
            }
        }

        Ok(())
    }

    /// Build the engine-facing schema value object.
    pub fn schema(&self) -> SchemaConfig {
        SchemaConfig {
            fields: self.fields.clone(),
            categories: self.categories.clone(),
            conflict_marker: self.database.conflict_marker.clone(),
            max_categories: self.database.max_categories_per_record,
        }
    }

    /// Starter config written by `pstack init`.
    pub fn starter_toml() -> String {
        // Serializing the defaults keeps init and the schema in lockstep.
        toml::to_string_pretty(&Config::default())
            .unwrap_or_else(|_| String::from("# failed to render default config\n"))
    }
}

// ---------------------------------------------------------------------------
// Default schema
// ---------------------------------------------------------------------------

fn field(key: &str, label: &str, order: u32) -> FieldSpec {
    FieldSpec {
        key: key.into(),
        label: label.into(),
        kind: FieldKind::String,
        required: false,
        system: false,
        order,
        enabled: true,
        pattern: None,
    }
}

fn default_fields() -> Vec<FieldSpec> {
    let mut fields = vec![
        FieldSpec { required: true, ..field("title", "Title", 0) },
        field("doi", "DOI", 1),
        FieldSpec { required: true, ..field("authors", "Authors", 2) },
        FieldSpec {
            pattern: Some(r"^\d{4}-\d{2}(-\d{2})?$".into()),
            ..field("date", "Date", 3)
        },
        FieldSpec { kind: FieldKind::List, required: true, ..field("category", "Category", 4) },
        field("summary_motivation", "Motivation", 5),
        field("summary_innovation", "Innovation", 6),
        field("summary_method", "Method", 7),
        field("summary_conclusion", "Conclusion", 8),
        field("summary_limitation", "Limitation", 9),
        field("paper_url", "Paper Link", 10),
        field("project_url", "Project Link", 11),
        field("conference", "Conference", 12),
        field("analogy_summary", "Analogy", 13),
        field("pipeline_image", "Pipeline", 14),
        field("abstract", "Abstract", 15),
        field("contributor", "Contributor", 16),
        field("notes", "Notes", 17),
        field("status", "Status", 18),
    ];
    fields.push(FieldSpec {
        kind: FieldKind::Bool,
        system: true,
        ..field("show_in_readme", "Show In README", 19)
    });
    fields.push(FieldSpec { system: true, ..field("submission_time", "Submitted At", 20) });
    fields.push(FieldSpec { system: true, ..field("uid", "UID", 21) });
    fields.push(FieldSpec {
        kind: FieldKind::Bool,
        system: true,
        ..field("conflict_marker", "Conflict", 22)
    });
    fields
}

fn default_categories() -> Vec<CategorySpec> {
    let names = [
        ("make_cot_short", "Make Long CoT Short"),
        ("make_cot_strong", "Build SLM with Strong Reasoning Ability"),
        ("efficient_decoding", "Let Decoding More Efficient"),
        ("multimodal_reasoning", "Efficient Multimodal Reasoning"),
        ("agentic_reasoning", "Efficient Agentic Reasoning"),
        ("evaluation_benchmarks", "Evaluation and Benchmarks"),
        ("background_papers", "Background Papers"),
    ];
    names
        .iter()
        .enumerate()
        .map(|(i, (key, name))| CategorySpec {
            key: (*key).into(),
            name: (*name).into(),
            order: i as u32,
            enabled: true,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

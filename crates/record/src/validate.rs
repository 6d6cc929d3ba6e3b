use regex::Regex;

use paperstack_config::{FieldKind, SchemaConfig};

use crate::doi::{is_well_formed_doi, normalized_doi};
use crate::record::{Record, CATEGORY, DOI};
use crate::value::FieldValue;

/// Check a record against the schema. Problems are collected as messages,
/// never raised — one bad record must not block the rest of a batch.
pub fn validate_record(record: &Record, schema: &SchemaConfig) -> Vec<String> {
    let mut errors = Vec::new();

    let doi = record.doi();
    if !doi.is_empty() {
        let cleaned = normalized_doi(&doi, &schema.conflict_marker);
        if !is_well_formed_doi(&cleaned) {
            errors.push(format!("invalid DOI format: {doi}"));
        }
    }

    for field in schema.active_fields() {
        let value = record.get(&field.key);
        let supplied = value.map(|v| !v.is_empty()).unwrap_or(false);

        if field.required && !supplied {
            errors.push(format!("required field empty: {} ({})", field.label, field.key));
            continue;
        }
        if !supplied {
            continue;
        }
        let value = match value {
            Some(v) => v,
            None => continue,
        };
        let raw = value.text();

        match field.kind {
            FieldKind::Bool => {
                if matches!(value, FieldValue::Str(_))
                    && !matches!(
                        raw.to_lowercase().as_str(),
                        "true" | "false" | "yes" | "no" | "1" | "0" | "y" | "n" | "on" | "off"
                    )
                {
                    errors.push(format!("field type mismatch: {} expects a boolean", field.label));
                }
            }
            FieldKind::Int => {
                if raw.parse::<f64>().map(|f| f.fract() != 0.0).unwrap_or(true) {
                    errors.push(format!("field type mismatch: {} expects an integer", field.label));
                }
            }
            FieldKind::Float => {
                if raw.parse::<f64>().is_err() {
                    errors.push(format!("field type mismatch: {} expects a number", field.label));
                }
            }
            FieldKind::String | FieldKind::List => {}
        }

        if field.key == CATEGORY {
            for token in record.categories() {
                if schema.category_rank(&token) == paperstack_config::UNMAPPED_CATEGORY_RANK {
                    errors.push(format!("invalid category: {token}"));
                }
            }
        }

        if field.key != DOI && field.key.ends_with("_url") && !is_url(&raw) {
            errors.push(format!("invalid link: {} ({})", raw, field.key));
        }

        if let Some(ref pattern) = field.pattern {
            // Anchored at the start, like the submission templates expect.
            match Regex::new(&format!(r"\A(?:{pattern})")) {
                Ok(re) => {
                    if !re.is_match(&raw) {
                        errors.push(format!(
                            "field format invalid: {} does not match its pattern",
                            field.label
                        ));
                    }
                }
                // Bad patterns are a config problem, reported at config load.
                Err(_) => {}
            }
        }
    }

    errors
}

fn is_url(raw: &str) -> bool {
    raw.starts_with("http://") || raw.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperstack_config::Config;

    fn schema() -> SchemaConfig {
        Config::default().schema()
    }

    fn base_record() -> Record {
        let mut r = Record::new();
        r.set("title", FieldValue::Str("Test Paper".into()));
        r.set("authors", FieldValue::Str("A. Author".into()));
        r.set(CATEGORY, FieldValue::List(vec!["background_papers".into()]));
        r
    }

    #[test]
    fn valid_record_passes() {
        assert!(validate_record(&base_record(), &schema()).is_empty());
    }

    #[test]
    fn required_fields_reported() {
        let errors = validate_record(&Record::new(), &schema());
        assert!(errors.iter().any(|e| e.contains("(title)")));
        assert!(errors.iter().any(|e| e.contains("(authors)")));
        assert!(errors.iter().any(|e| e.contains("(category)")));
    }

    #[test]
    fn bad_doi_reported() {
        let mut r = base_record();
        r.set(DOI, FieldValue::Str("totally/not-a-doi".into()));
        let errors = validate_record(&r, &schema());
        assert!(errors.iter().any(|e| e.contains("invalid DOI")));
    }

    #[test]
    fn decorated_doi_accepted() {
        let mut r = base_record();
        r.set(DOI, FieldValue::Str("[conflict] https://doi.org/10.1234/abc.5".into()));
        assert!(validate_record(&r, &schema()).is_empty());
    }

    #[test]
    fn unknown_category_reported() {
        let mut r = base_record();
        r.set(CATEGORY, FieldValue::List(vec!["no_such_category".into()]));
        let errors = validate_record(&r, &schema());
        assert!(errors.iter().any(|e| e.contains("invalid category")));
    }

    #[test]
    fn bad_url_reported() {
        let mut r = base_record();
        r.set("paper_url", FieldValue::Str("ftp://example.com/p.pdf".into()));
        let errors = validate_record(&r, &schema());
        assert!(errors.iter().any(|e| e.contains("invalid link")));
    }

    #[test]
    fn date_pattern_enforced() {
        let mut r = base_record();
        r.set("date", FieldValue::Str("June 2025".into()));
        let errors = validate_record(&r, &schema());
        assert!(errors.iter().any(|e| e.contains("does not match")));

        r.set("date", FieldValue::Str("2025-06".into()));
        assert!(validate_record(&r, &schema()).is_empty());
    }
}

use std::sync::OnceLock;

use regex::Regex;

const DOI_BODY: &str = r"10\.\d{4,9}/[-._;()/:a-zA-Z0-9]+";

fn prefix_patterns() -> &'static Vec<Regex> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            format!(r"(?i)doi\.org/({DOI_BODY})"),
            format!(r"(?i)dx\.doi\.org/({DOI_BODY})"),
            format!(r"(?i)doi:\s*({DOI_BODY})"),
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    })
}

fn format_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(&format!(r"\A{DOI_BODY}\z")).unwrap())
}

/// Strip known DOI-URL decorations (`doi.org/…`, `dx.doi.org/…`, `doi:…`),
/// else return the trimmed input.
pub fn clean_doi(raw: &str) -> String {
    let s = raw.trim();
    for pattern in prefix_patterns() {
        if let Some(captures) = pattern.captures(s) {
            return captures[1].to_string();
        }
    }
    s.to_string()
}

/// Comparison form of a DOI: any embedded conflict-marker decoration removed,
/// URL prefixes stripped, lowercased.
pub fn normalized_doi(raw: &str, conflict_marker: &str) -> String {
    let mut s = raw.trim().to_string();
    if !conflict_marker.is_empty() {
        s = s.replace(conflict_marker, "");
    }
    clean_doi(s.trim()).to_lowercase()
}

/// Whether a cleaned DOI looks like a registered DOI name.
pub fn is_well_formed_doi(cleaned: &str) -> bool {
    format_pattern().is_match(cleaned)
}

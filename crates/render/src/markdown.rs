use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use paperstack_config::{RenderConfig, SchemaConfig};
use paperstack_record::Record;

const SUMMARY_FIELDS: [&str; 5] = [
    "summary_motivation",
    "summary_innovation",
    "summary_method",
    "summary_conclusion",
    "summary_limitation",
];

fn github_repo_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"github\.com/([^/]+/[^/?#]+)").unwrap())
}

/// Generate the README paper-table section from the sorted collection.
/// Conflict-marked records and hidden records never appear; they stay in the
/// flat file until resolved.
pub fn render_tables(records: &[Record], schema: &SchemaConfig, options: &RenderConfig) -> String {
    let visible: Vec<&Record> = records
        .iter()
        .filter(|r| !r.conflict_marker() && r.show_in_readme())
        .collect();

    // A record appears under every category token it carries.
    let mut grouped: BTreeMap<String, Vec<&Record>> = BTreeMap::new();
    for &record in &visible {
        for token in record.categories() {
            grouped.entry(token).or_default().push(record);
        }
    }
    for papers in grouped.values_mut() {
        papers.sort_by(|a, b| b.submission_time().cmp(&a.submission_time()));
    }

    let mut out = String::new();
    for category in schema.active_categories() {
        let papers = match grouped.get(&category.key) {
            Some(papers) if !papers.is_empty() => papers,
            _ => continue,
        };

        out.push_str(&format!(
            "\n### | {} ({} papers)\n\n",
            category.name,
            papers.len()
        ));
        out.push_str("| Title & Info | Analogy Summary | Pipeline | Summary |\n");
        out.push_str("|:--| :---: | :----: | :---: |\n");
        for paper in papers {
            out.push_str(&render_row(paper, schema, options));
        }
    }

    out
}

fn render_row(paper: &Record, schema: &SchemaConfig, options: &RenderConfig) -> String {
    let title_cell = title_cell(paper, schema, options);
    let analogy = sanitize(&paper.text("analogy_summary"));
    let pipeline = pipeline_cell(paper);
    let mut summary = summary_cell(paper, schema);
    if !summary.is_empty() {
        summary = format!(" <div style=\"line-height: 1.05;font-size: 0.8em\"> {summary}</div>");
    }
    format!("|{title_cell}|{analogy}|{pipeline}|{summary}|\n")
}

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

fn title_cell(paper: &Record, schema: &SchemaConfig, options: &RenderConfig) -> String {
    let title = paper.title();
    if title.is_empty() {
        return "Authors (to fill)".into();
    }

    let title = sanitize(&truncate(&title, options.max_title_length));
    let authors = sanitize(&truncate(&paper.text("authors"), options.max_authors_length));
    let date = paper.text("date");

    let mut badges = String::new();
    let project_url = paper.text("project_url");
    if !project_url.is_empty() {
        badges.push_str(&project_badge(&project_url));
    }
    let conference = paper.text("conference");
    if !conference.is_empty() {
        badges.push_str(&format!(
            " [![Publish](https://img.shields.io/badge/Conference-{}-blue)]()",
            badge_encode(&conference)
        ));
    }
    if !badges.is_empty() {
        badges.push_str("<br>");
    }

    let paper_url = paper.text("paper_url");
    let linked_title = if paper_url.is_empty() {
        title
    } else {
        format!("[{title}]({paper_url})")
    };

    let mut cell = format!("{badges}{linked_title} <br> {authors} <br> {date}");

    let categories = paper.categories();
    if categories.len() > 1 {
        let links: Vec<String> = categories
            .iter()
            .map(|key| {
                let display = schema.category_name(key).unwrap_or(key);
                format!("[{display}](#{})", anchor(display))
            })
            .collect();
        cell.push_str(&format!(
            " <br> <span style=\"color:cyan\">[multi-category: {}]</span>",
            links.join(", ")
        ));
    }

    cell
}

/// GitHub project links get a live star badge; anything else a plain one.
fn project_badge(url: &str) -> String {
    if let Some(captures) = github_repo_pattern().captures(url) {
        let repo = captures[1].trim_end_matches(".git");
        return format!(
            "[![Star](https://img.shields.io/github/stars/{repo}.svg?style=social&label=Star)](https://github.com/{repo})"
        );
    }
    format!("[![Project](https://img.shields.io/badge/Project-View-blue)]({url})")
}

/// Up to three pipeline images per record, stacked when more than one.
fn pipeline_cell(paper: &Record) -> String {
    let raw = paper.text("pipeline_image");
    if raw.is_empty() {
        return String::new();
    }

    let images: Vec<&str> = raw
        .split([';', '；'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(3)
        .collect();

    match images.as_slice() {
        [] => String::new(),
        [single] => format!("<img width=\"1200\" alt=\"pipeline\" src=\"{single}\">"),
        many => {
            let stacked: String = many
                .iter()
                .map(|p| {
                    format!(
                        "<img width=\"1000\" style=\"display:block;margin:6px auto\" alt=\"pipeline\" src=\"{p}\">"
                    )
                })
                .collect();
            format!(
                "<div style=\"display:flex;flex-direction:column;gap:6px;align-items:center\">{stacked}</div>"
            )
        }
    }
}

fn summary_cell(paper: &Record, schema: &SchemaConfig) -> String {
    let parts: Vec<String> = SUMMARY_FIELDS
        .iter()
        .filter_map(|key| {
            let value = paper.text(key);
            if value.is_empty() {
                return None;
            }
            let label = schema
                .field(key)
                .map(|f| f.label.clone())
                .unwrap_or_else(|| key.to_string());
            Some(format!("**[{label}]** {}", sanitize(&value)))
        })
        .collect();
    let body = parts.join("<br>");

    let notes = paper.text("notes");
    let notes_block = if notes.is_empty() {
        String::new()
    } else {
        format!(
            "<details><summary>**[notes]**</summary><div style=\"margin-top:6px\">{}</div></details>",
            sanitize(&notes)
        )
    };

    if body.is_empty() {
        return notes_block;
    }

    let tooltip = html_escape(&body.replace("<br>", " "));
    let block = format!(
        "<details><summary title=\"{tooltip}\">**[summary]**</summary><div style=\"margin-top:6px\">{body}</div></details>"
    );
    if notes_block.is_empty() {
        block
    } else {
        format!("{block}<div style=\"margin-top:6px\">{notes_block}</div>")
    }
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut.trim_end())
}

/// Make a field safe inside a table cell: pipes escaped, newlines flattened.
fn sanitize(text: &str) -> String {
    text.trim()
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('|', "\\|")
        .replace('\n', "<br>")
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Heading anchor in the GitHub style: punctuation dropped, spaces to dashes.
fn anchor(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ' || *c == '-')
        .collect();
    kept.trim().to_lowercase().replace(' ', "-")
}

/// Badge labels are URL path segments; shields.io needs `-` doubled.
fn badge_encode(text: &str) -> String {
    let mut encoded = String::new();
    for byte in text.replace('-', "--").bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'.' | b'_' | b'-' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperstack_config::Config;
    use paperstack_record::FieldValue;

    fn schema() -> SchemaConfig {
        Config::default().schema()
    }

    fn options() -> RenderConfig {
        RenderConfig::default()
    }

    fn paper(title: &str, category: &str) -> Record {
        let mut record = Record::new();
        record.set("title", FieldValue::Str(title.into()));
        record.set("authors", FieldValue::Str("A. Author".into()));
        record.set("category", FieldValue::List(vec![category.into()]));
        record
    }

    #[test]
    fn categories_render_in_schema_order_with_counts() {
        let s = schema();
        let records = vec![
            paper("Decoding Paper", "efficient_decoding"),
            paper("CoT Paper", "make_cot_short"),
        ];
        let md = render_tables(&records, &s, &options());

        let cot = md.find("Make Long CoT Short (1 papers)").unwrap();
        let dec = md.find("Let Decoding More Efficient (1 papers)").unwrap();
        assert!(cot < dec);
    }

    #[test]
    fn conflicts_and_hidden_records_excluded() {
        let s = schema();
        let mut flagged = paper("Contested", "make_cot_short");
        flagged.set_conflict_marker(true);
        let mut hidden = paper("Hidden", "make_cot_short");
        hidden.set("show_in_readme", FieldValue::Bool(false));
        let visible = paper("Visible", "make_cot_short");

        let md = render_tables(&[flagged, hidden, visible], &s, &options());
        assert!(md.contains("Visible"));
        assert!(!md.contains("Contested"));
        assert!(!md.contains("Hidden"));
        assert!(md.contains("(1 papers)"));
    }

    #[test]
    fn github_project_gets_star_badge() {
        assert!(project_badge("https://github.com/acme/widget")
            .contains("img.shields.io/github/stars/acme/widget"));
        assert!(project_badge("https://example.com/p").contains("Project-View"));
    }

    #[test]
    fn conference_badge_encodes_label() {
        let mut record = paper("Badged", "make_cot_short");
        record.set("conference", FieldValue::Str("NeurIPS-2026 W&B".into()));
        let md = render_tables(&[record], &schema(), &options());
        assert!(md.contains("Conference-NeurIPS--2026%20W%26B-blue"));
    }

    #[test]
    fn multi_category_links_to_each_anchor() {
        let mut record = paper("Crossover", "make_cot_short");
        record.set(
            "category",
            FieldValue::List(vec!["make_cot_short".into(), "efficient_decoding".into()]),
        );
        let md = render_tables(&[record], &schema(), &options());
        assert!(md.contains("[multi-category:"));
        assert!(md.contains("(#let-decoding-more-efficient)"));
        // listed under both categories
        assert_eq!(md.matches("Crossover").count(), 2);
    }

    #[test]
    fn pipeline_cell_single_vs_stacked() {
        let mut one = paper("One", "make_cot_short");
        one.set("pipeline_image", FieldValue::Str("assets/u1/p.png".into()));
        assert!(pipeline_cell(&one).starts_with("<img width=\"1200\""));

        let mut three = paper("Three", "make_cot_short");
        three.set(
            "pipeline_image",
            FieldValue::Str("a.png; b.png; c.png; d.png".into()),
        );
        let cell = pipeline_cell(&three);
        assert!(cell.starts_with("<div"));
        assert_eq!(cell.matches("<img").count(), 3);
    }

    #[test]
    fn summary_collapses_into_details() {
        let s = schema();
        let mut record = paper("Summed", "make_cot_short");
        record.set("summary_method", FieldValue::Str("do | things".into()));
        record.set("notes", FieldValue::Str("see appendix".into()));
        let md = render_tables(&[record], &s, &options());

        assert!(md.contains("**[summary]**"));
        assert!(md.contains("**[Method]** do \\| things"));
        assert!(md.contains("**[notes]**"));
    }

    #[test]
    fn long_title_truncated_and_piped_cells_escaped() {
        let s = schema();
        let long = "T".repeat(150);
        let mut record = paper(&long, "make_cot_short");
        record.set("analogy_summary", FieldValue::Str("a|b".into()));
        let md = render_tables(&[record], &s, &options());
        assert!(md.contains("..."));
        assert!(md.contains("a\\|b"));
        assert!(!md.contains(&long));
    }
}

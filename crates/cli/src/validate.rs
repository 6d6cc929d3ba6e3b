//! `pstack validate` — check the core collection and update files.

use std::path::Path;

use paperstack_config::SchemaConfig;
use paperstack_io::read_collection;
use paperstack_record::{validate_record, Record};

use crate::context::Context;
use crate::exit_codes::{EXIT_IO_ERROR, EXIT_VALIDATION_FAILED};
use crate::CliError;

pub fn cmd_validate(config_path: &Path, skip_updates: bool) -> Result<(), CliError> {
    let ctx = Context::load(config_path)?;

    let mut problems = 0usize;

    let db_path = ctx.database_path();
    if db_path.exists() {
        let records = read_collection(&db_path, &ctx.schema)
            .map_err(|e| CliError::new(EXIT_IO_ERROR, e.to_string()))?;
        eprintln!("{}: {} record(s)", db_path.display(), records.len());
        problems += report_problems(&records, &ctx.schema);
        problems += report_duplicate_uids(&records);
    } else {
        eprintln!("{}: missing (nothing to validate)", db_path.display());
    }

    if !skip_updates {
        for file in ctx.existing_update_files() {
            match read_collection(&file, &ctx.schema) {
                Ok(records) => {
                    eprintln!("{}: {} record(s)", file.display(), records.len());
                    problems += report_problems(&records, &ctx.schema);
                }
                Err(e) => {
                    eprintln!("{}: unreadable: {e}", file.display());
                    problems += 1;
                }
            }
        }
    }

    if problems > 0 {
        return Err(CliError::new(
            EXIT_VALIDATION_FAILED,
            format!("{problems} problem(s) found"),
        ));
    }
    eprintln!("all clean");
    Ok(())
}

fn report_problems(records: &[Record], schema: &SchemaConfig) -> usize {
    let mut problems = 0;
    for (index, record) in records.iter().enumerate() {
        let errors = validate_record(record, schema);
        if !errors.is_empty() {
            problems += errors.len();
            let title: String = record.title().chars().take(40).collect();
            eprintln!("  #{} '{}': {}", index + 1, title, errors.join("; "));
        }
    }
    problems
}

/// Two live records must never share a uid. Flagged conflicts are exempt:
/// they intentionally share the live record's uid and side resources.
fn report_duplicate_uids(records: &[Record]) -> usize {
    let mut seen = std::collections::BTreeMap::new();
    let mut problems = 0;
    for (index, record) in records.iter().enumerate() {
        let uid = record.uid();
        if uid.is_empty() || record.conflict_marker() {
            continue;
        }
        if let Some(first) = seen.insert(uid.clone(), index) {
            eprintln!("  #{} duplicate uid '{uid}' (first at #{})", index + 1, first + 1);
            problems += 1;
        }
    }
    problems
}

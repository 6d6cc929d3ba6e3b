//! `pstack update` — fold update files into the core collection.

use std::path::Path;

use paperstack_config::SchemaConfig;
use paperstack_io::{backup_file, read_collection, write_collection};
use paperstack_merge::{add_records, dedup_batch, ConflictPolicy, MergeOutcome};
use paperstack_record::record::{CONTRIBUTOR, SUBMISSION_TIME};
use paperstack_record::{normalize, validate_record, FieldValue, Record};

use crate::context::Context;
use crate::exit_codes::{EXIT_ERROR, EXIT_IO_ERROR, EXIT_NO_UPDATES};
use crate::CliError;

pub fn cmd_update(
    config_path: &Path,
    policy: ConflictPolicy,
    remove_merged: bool,
) -> Result<(), CliError> {
    let ctx = Context::load(config_path)?;
    let db_path = ctx.database_path();

    let mut collection = if db_path.exists() {
        read_collection(&db_path, &ctx.schema)
            .map_err(|e| CliError::new(EXIT_IO_ERROR, e.to_string()))?
    } else {
        Vec::new()
    };

    let update_files = ctx.existing_update_files();
    if update_files.is_empty() {
        return Err(
            CliError::new(EXIT_NO_UPDATES, "no update files found").with_hint(
                "configure [paths] update_files in paperstack.toml, or run `pstack init`",
            ),
        );
    }

    let remove_merged = remove_merged || ctx.config.database.remove_merged_from_updates;
    let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let mut added = 0usize;
    let mut conflicted = 0usize;
    let mut skipped = 0usize;
    let mut invalid = 0usize;
    let mut failures = 0usize;

    for file in &update_files {
        eprintln!("processing {}", file.display());

        let batch = match read_collection(file, &ctx.schema) {
            Ok(batch) => batch,
            Err(e) => {
                eprintln!("  cannot read: {e}");
                failures += 1;
                continue;
            }
        };
        if batch.is_empty() {
            eprintln!("  no records");
            continue;
        }

        let batch = dedup_batch(&batch);
        let valid = prepare_batch(batch, &ctx, &stamp, &mut invalid);
        if valid.is_empty() {
            eprintln!("  nothing to merge");
            continue;
        }

        let outcome = add_records(&collection, &valid, policy, &ctx.schema);
        for warning in &outcome.warnings {
            eprintln!("  warning: {warning}");
        }

        match persist(&db_path, &ctx, &outcome) {
            Ok(()) => {
                added += outcome.added.len();
                conflicted += outcome.conflicted.len();
                skipped += outcome.skipped.len();

                if remove_merged {
                    if let Err(e) = clear_absorbed(file, &ctx.schema, &ctx, &outcome) {
                        eprintln!("  cannot rewrite {}: {e}", file.display());
                    }
                }

                collection = outcome.collection;
            }
            Err(e) => {
                // Keep the previous in-memory collection: merge + save is a
                // unit, a failed save must not leak a half-applied fold.
                eprintln!("  cannot save collection: {e}");
                failures += 1;
            }
        }
    }

    eprintln!(
        "update done: {added} added, {conflicted} conflicts marked, {skipped} skipped, {invalid} invalid",
    );
    if conflicted > 0 {
        eprintln!(
            "conflicts are flagged in the collection; search for records with conflict_marker set"
        );
    }

    if added == 0 && conflicted == 0 && skipped == 0 && failures > 0 {
        return Err(CliError::new(EXIT_ERROR, "no update file could be processed"));
    }
    Ok(())
}

/// Normalize, stamp, and validate an update batch. Invalid records are
/// reported and withheld; they never block the rest of the batch.
fn prepare_batch(
    batch: Vec<Record>,
    ctx: &Context,
    stamp: &str,
    invalid: &mut usize,
) -> Vec<Record> {
    let mut valid = Vec::new();
    for mut record in batch {
        normalize(&mut record, &ctx.schema);
        if record.submission_time().is_empty() {
            record.set(SUBMISSION_TIME, FieldValue::Str(stamp.to_string()));
        }
        if record.text(CONTRIBUTOR).is_empty() {
            record.set(
                CONTRIBUTOR,
                FieldValue::Str(ctx.config.database.default_contributor.clone()),
            );
        }
        record.ensure_uid();

        let errors = validate_record(&record, &ctx.schema);
        if errors.is_empty() {
            valid.push(record);
        } else {
            *invalid += 1;
            let title: String = record.title().chars().take(30).collect();
            eprintln!("  invalid '{title}': {}", errors.join("; "));
        }
    }
    valid
}

fn persist(db_path: &Path, ctx: &Context, outcome: &MergeOutcome) -> Result<(), CliError> {
    if db_path.exists() {
        backup_file(db_path, &ctx.backup_dir())
            .map_err(|e| CliError::new(EXIT_IO_ERROR, e.to_string()))?;
    }
    write_collection(db_path, &outcome.collection, &ctx.schema)
        .map_err(|e| CliError::new(EXIT_IO_ERROR, e.to_string()))
}

/// Rewrite an update file without the records the merge absorbed (newly
/// added or flagged). Exact duplicates of already-stored records stay put
/// for the submitter to clean up.
fn clear_absorbed(
    file: &Path,
    schema: &SchemaConfig,
    ctx: &Context,
    outcome: &MergeOutcome,
) -> Result<(), CliError> {
    let absorbed: Vec<(String, String)> = outcome
        .added
        .iter()
        .chain(outcome.conflicted.iter())
        .map(Record::display_key)
        .collect();
    if absorbed.is_empty() {
        return Ok(());
    }

    let current = read_collection(file, schema)
        .map_err(|e| CliError::new(EXIT_IO_ERROR, e.to_string()))?;
    let remaining: Vec<Record> = current
        .iter()
        .filter(|r| {
            let mut probe = (*r).clone();
            normalize(&mut probe, schema);
            !absorbed.contains(&probe.display_key())
        })
        .cloned()
        .collect();

    if remaining.len() < current.len() {
        backup_file(file, &ctx.backup_dir())
            .map_err(|e| CliError::new(EXIT_IO_ERROR, e.to_string()))?;
        write_collection(file, &remaining, schema)
            .map_err(|e| CliError::new(EXIT_IO_ERROR, e.to_string()))?;
        eprintln!(
            "  removed {} absorbed record(s) from {}",
            current.len() - remaining.len(),
            file.display()
        );
    }
    Ok(())
}

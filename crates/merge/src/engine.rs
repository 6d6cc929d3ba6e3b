use paperstack_config::SchemaConfig;
use paperstack_record::{validate_record, Record};

use crate::identity::{is_duplicate, same_identity};
use crate::model::{ConflictPolicy, IdentityGroup, MergeOutcome};

/// Fold a batch of incoming records into the existing collection.
///
/// Pure in-memory computation: the caller owns persistence and must treat
/// this plus the subsequent save as a unit, keeping its original collection
/// on save failure. Incoming records are assumed pre-validated; the existing
/// collection is defensively re-validated into `warnings`, never corrected.
pub fn add_records(
    existing: &[Record],
    incoming: &[Record],
    policy: ConflictPolicy,
    schema: &SchemaConfig,
) -> MergeOutcome {
    let mut warnings = Vec::new();

    for record in existing {
        let errors = validate_record(record, schema);
        if !errors.is_empty() {
            warnings.push(format!(
                "stored record '{}' invalid: {}",
                short_title(record),
                errors.join("; ")
            ));
        }
    }

    let mut groups = rebuild_groups(existing, schema, &mut warnings);

    let mut added = Vec::new();
    let mut conflicted = Vec::new();
    let mut skipped = Vec::new();

    for record in incoming {
        // Identity is matched against live representatives only; conflicts
        // ride along with their group.
        let matching: Vec<usize> = groups
            .iter()
            .enumerate()
            .filter(|(_, g)| same_identity(record, &g.live, schema))
            .map(|(i, _)| i)
            .collect();

        if matching.is_empty() {
            added.push(record.clone());
            groups.push(IdentityGroup::new(record.clone()));
            continue;
        }

        // Exact resubmission check runs against every record of every
        // matching group, flagged copies included — a re-sent conflict is
        // still a no-op.
        let rivals: Vec<Record> = matching
            .iter()
            .flat_map(|&i| {
                std::iter::once(groups[i].live.clone()).chain(groups[i].conflicts.iter().cloned())
            })
            .collect();

        if is_duplicate(&rivals, record, false, schema) {
            skipped.push(record.clone());
            continue;
        }

        match policy {
            ConflictPolicy::Skip => {
                skipped.push(record.clone());
            }
            ConflictPolicy::Replace => {
                for &i in matching.iter().rev() {
                    groups.remove(i);
                }
                groups.push(IdentityGroup::new(record.clone()));
                added.push(record.clone());
            }
            ConflictPolicy::Mark => {
                let mut flagged = record.clone();
                flagged.set_conflict_marker(true);
                groups[matching[0]].conflicts.push(flagged.clone());
                conflicted.push(flagged);
            }
        }
    }

    let collection = sort_collection(groups, schema);

    MergeOutcome { collection, added, conflicted, skipped, warnings }
}

/// Reconstruct identity groups from flat file order. Each live record seeds a
/// group; each flagged record attaches to the first live group it matches.
/// Flagged records with no matching live record are promoted — corrupt prior
/// state degrades to a warning, not a failure.
fn rebuild_groups(
    existing: &[Record],
    schema: &SchemaConfig,
    warnings: &mut Vec<String>,
) -> Vec<IdentityGroup> {
    let mut groups: Vec<IdentityGroup> = Vec::new();
    let mut flagged: Vec<Record> = Vec::new();

    for record in existing {
        if record.conflict_marker() {
            flagged.push(record.clone());
        } else {
            groups.push(IdentityGroup::new(record.clone()));
        }
    }

    for conflict in flagged {
        match groups.iter_mut().find(|g| same_identity(&conflict, &g.live, schema)) {
            Some(group) => group.conflicts.push(conflict),
            None => {
                warnings.push(format!(
                    "orphaned conflict record '{}' has no live record; promoted to live",
                    short_title(&conflict)
                ));
                let mut promoted = conflict;
                promoted.set_conflict_marker(false);
                groups.push(IdentityGroup::new(promoted));
            }
        }
    }

    groups
}

/// Stable output order: category buckets in schema order (unmapped last),
/// groups within a bucket by live submission time descending, and each
/// group's conflicts (newest first) serialized immediately before its live
/// record — a human scanning the flat file sees them adjacent.
fn sort_collection(groups: Vec<IdentityGroup>, schema: &SchemaConfig) -> Vec<Record> {
    let mut buckets: Vec<(String, Vec<IdentityGroup>)> = Vec::new();
    for group in groups {
        let category = group.live.first_category().unwrap_or_default();
        match buckets.iter_mut().find(|(key, _)| *key == category) {
            Some((_, list)) => list.push(group),
            None => buckets.push((category, vec![group])),
        }
    }

    // Stable sort keeps first-seen order between equally-ranked (unmapped)
    // category buckets.
    buckets.sort_by(|a, b| schema.category_rank(&a.0).cmp(&schema.category_rank(&b.0)));

    let mut out = Vec::new();
    for (_, mut list) in buckets {
        list.sort_by(|a, b| b.live.submission_time().cmp(&a.live.submission_time()));
        for mut group in list {
            group.conflicts.sort_by(|a, b| b.submission_time().cmp(&a.submission_time()));
            out.extend(group.conflicts);
            out.push(group.live);
        }
    }
    out
}

fn short_title(record: &Record) -> String {
    record.title().chars().take(30).collect()
}

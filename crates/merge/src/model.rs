use paperstack_record::Record;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// What to do with an incoming record that matches an existing identity but
/// is not an exact resubmission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Flag the incoming record and retain it for manual review (default).
    #[default]
    Mark,
    /// Drop the incoming record.
    Skip,
    /// Discard the matched group(s), keep the incoming record as sole live.
    Replace,
}

impl std::fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mark => write!(f, "mark"),
            Self::Skip => write!(f, "skip"),
            Self::Replace => write!(f, "replace"),
        }
    }
}

// ---------------------------------------------------------------------------
// Groups + Outcome
// ---------------------------------------------------------------------------

/// One identity group: the unflagged live record plus the flagged alternates
/// contesting it. Within the persisted collection at most one record per
/// identity is live.
#[derive(Debug, Clone)]
pub struct IdentityGroup {
    pub live: Record,
    pub conflicts: Vec<Record>,
}

impl IdentityGroup {
    pub fn new(live: Record) -> Self {
        Self { live, conflicts: Vec::new() }
    }
}

/// Result of folding a batch into the collection. `collection` is the full
/// re-sorted state to persist; the remaining lists describe what happened.
/// Conflicts are never silently dropped: under the default policy every one
/// appears in both `collection` (flagged) and `conflicted`.
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    pub collection: Vec<Record>,
    /// Records newly added as live.
    pub added: Vec<Record>,
    /// Records newly added as flagged conflicts.
    pub conflicted: Vec<Record>,
    /// Exact resubmissions and policy-skip drops; absorbed without change.
    pub skipped: Vec<Record>,
    /// Integrity problems found in the pre-existing collection.
    pub warnings: Vec<String>,
}

//! `paperstack-merge` — identity resolution and conflict reconciliation.
//!
//! Pure engine crate: receives pre-loaded records, returns the folded
//! collection plus outcome lists. No CLI or IO dependencies; persistence is
//! the caller's responsibility.

pub mod batch;
pub mod engine;
pub mod identity;
pub mod model;

pub use batch::{dedup_batch, remove_record, update_record};
pub use engine::add_records;
pub use identity::{fields_equal, is_duplicate, same_identity};
pub use model::{ConflictPolicy, IdentityGroup, MergeOutcome};

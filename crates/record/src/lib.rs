//! `paperstack-record` — the paper record model.
//!
//! Schema-driven: records are open name→value maps, normalized and validated
//! against an explicit [`paperstack_config::SchemaConfig`] handed in by the
//! caller. No I/O and no ambient configuration here.

pub mod doi;
pub mod record;
pub mod uid;
pub mod validate;
pub mod value;

pub use doi::{clean_doi, is_well_formed_doi, normalized_doi};
pub use record::{normalize, Record};
pub use uid::derive_uid;
pub use validate::validate_record;
pub use value::{split_list, FieldValue};

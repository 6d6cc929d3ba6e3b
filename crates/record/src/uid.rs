use sha2::{Digest, Sha256};

use crate::doi::clean_doi;

/// Stable identifier for a record, used to namespace side resources under
/// `assets/<uid>/`. Derived from content rather than drawn at random so
/// re-processing the same logical paper always lands in the same directory.
pub fn derive_uid(title: &str, doi: &str) -> String {
    let title_prefix: String = title.trim().to_lowercase().chars().take(50).collect();
    let doi_norm = clean_doi(doi).to_lowercase();

    let mut hasher = Sha256::new();
    hasher.update(title_prefix.as_bytes());
    hasher.update(b"|");
    hasher.update(doi_norm.as_bytes());
    let digest = hasher.finalize();

    digest[..6].iter().map(|b| format!("{b:02x}")).collect()
}

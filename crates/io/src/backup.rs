use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// Copy a collection file into the backup directory with a timestamped name
/// before it is overwritten. Advisory crash safety, not transactional.
pub fn backup_file(path: &Path, backup_dir: &Path) -> Result<PathBuf, StoreError> {
    std::fs::create_dir_all(backup_dir).map_err(|e| StoreError::Io(e.to_string()))?;

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("collection");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("bak");
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");

    let mut target = backup_dir.join(format!("{stem}.{stamp}.{ext}"));
    // Same-second rewrites get a numeric suffix instead of clobbering.
    let mut counter = 1;
    while target.exists() {
        target = backup_dir.join(format!("{stem}.{stamp}.{counter}.{ext}"));
        counter += 1;
    }

    std::fs::copy(path, &target).map_err(|e| StoreError::Io(e.to_string()))?;
    Ok(target)
}

use std::path::{Path, PathBuf};

use paperstack_config::{Config, SchemaConfig};

use crate::exit_codes::EXIT_INVALID_CONFIG;
use crate::CliError;

/// Loaded configuration plus the directory all configured paths resolve
/// against (the config file's directory).
#[derive(Debug)]
pub struct Context {
    pub config: Config,
    pub schema: SchemaConfig,
    pub base_dir: PathBuf,
}

impl Context {
    /// Load `paperstack.toml`. A missing file falls back to the built-in
    /// defaults so the tool works in a freshly initialized checkout.
    pub fn load(config_path: &Path) -> Result<Self, CliError> {
        let base_dir = config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path).map_err(|e| {
                CliError::new(
                    EXIT_INVALID_CONFIG,
                    format!("cannot read {}: {e}", config_path.display()),
                )
            })?;
            Config::from_toml(&content)
                .map_err(|e| CliError::new(EXIT_INVALID_CONFIG, e.to_string()))?
        } else {
            Config::default()
        };

        let schema = config.schema();
        Ok(Self { config, schema, base_dir })
    }

    pub fn database_path(&self) -> PathBuf {
        self.base_dir.join(&self.config.paths.database)
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.base_dir.join(&self.config.paths.backup_dir)
    }

    /// Configured update files that actually exist on disk.
    pub fn existing_update_files(&self) -> Vec<PathBuf> {
        self.config
            .paths
            .update_files
            .iter()
            .map(|f| self.base_dir.join(f))
            .filter(|p| p.exists())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let ctx = Context::load(Path::new("/nonexistent/paperstack.toml")).unwrap();
        assert_eq!(ctx.config.database.conflict_marker, "[conflict]");
        assert_eq!(ctx.database_path(), Path::new("/nonexistent/collection/papers.csv"));
    }

    #[test]
    fn bad_config_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paperstack.toml");
        std::fs::write(&path, "this is not = [ toml").unwrap();
        let err = Context::load(&path).unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_INVALID_CONFIG);
    }

    #[test]
    fn paths_resolve_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paperstack.toml");
        std::fs::write(&path, "[paths]\ndatabase = \"db/core.json\"\n").unwrap();
        let ctx = Context::load(&path).unwrap();
        assert_eq!(ctx.database_path(), dir.path().join("db/core.json"));
    }
}

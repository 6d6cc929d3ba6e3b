//! `pstack init` — scaffold a config file and empty collection.

use std::path::Path;

use paperstack_config::Config;
use paperstack_io::write_collection;

use crate::exit_codes::{EXIT_ALREADY_INITIALIZED, EXIT_IO_ERROR};
use crate::CliError;

pub fn cmd_init(dir: &Path) -> Result<(), CliError> {
    let config_path = dir.join("paperstack.toml");
    if config_path.exists() {
        return Err(CliError::new(
            EXIT_ALREADY_INITIALIZED,
            format!("{} already exists", config_path.display()),
        )
        .with_hint("remove it first if you really want to start over"));
    }

    std::fs::create_dir_all(dir).map_err(|e| CliError::new(EXIT_IO_ERROR, e.to_string()))?;
    std::fs::write(&config_path, Config::starter_toml())
        .map_err(|e| CliError::new(EXIT_IO_ERROR, e.to_string()))?;
    eprintln!("wrote {}", config_path.display());

    let config = Config::default();
    let schema = config.schema();

    let db_path = dir.join(&config.paths.database);
    if !db_path.exists() {
        write_collection(&db_path, &[], &schema)
            .map_err(|e| CliError::new(EXIT_IO_ERROR, e.to_string()))?;
        eprintln!("wrote {}", db_path.display());
    }

    // Empty submission templates, same two-row-header shape as the core.
    for update_file in &config.paths.update_files {
        let path = dir.join(update_file);
        if !path.exists() {
            write_collection(&path, &[], &schema)
                .map_err(|e| CliError::new(EXIT_IO_ERROR, e.to_string()))?;
            eprintln!("wrote {}", path.display());
        }
    }

    for sub_dir in [&config.paths.backup_dir, &config.paths.assets_dir] {
        std::fs::create_dir_all(dir.join(sub_dir))
            .map_err(|e| CliError::new(EXIT_IO_ERROR, e.to_string()))?;
    }

    eprintln!("initialized; next: fill a submission template and run `pstack update`");
    Ok(())
}

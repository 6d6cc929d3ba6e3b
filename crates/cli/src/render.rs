//! `pstack render` — emit the README paper tables.

use std::path::Path;

use paperstack_io::read_collection;
use paperstack_render::render_tables;

use crate::context::Context;
use crate::exit_codes::EXIT_IO_ERROR;
use crate::CliError;

pub fn cmd_render(config_path: &Path, output: Option<&Path>) -> Result<(), CliError> {
    let ctx = Context::load(config_path)?;

    let db_path = ctx.database_path();
    let records = if db_path.exists() {
        read_collection(&db_path, &ctx.schema)
            .map_err(|e| CliError::new(EXIT_IO_ERROR, e.to_string()))?
    } else {
        return Err(CliError::new(
            EXIT_IO_ERROR,
            format!("collection not found: {}", db_path.display()),
        )
        .with_hint("run `pstack init`, then `pstack update` to populate it"));
    };

    let markdown = render_tables(&records, &ctx.schema, &ctx.config.render);

    match output {
        Some(path) => {
            std::fs::write(path, &markdown)
                .map_err(|e| CliError::new(EXIT_IO_ERROR, e.to_string()))?;
            eprintln!("wrote {}", path.display());
        }
        None => print!("{markdown}"),
    }

    let visible = records
        .iter()
        .filter(|r| !r.conflict_marker() && r.show_in_readme())
        .count();
    eprintln!("rendered {visible} of {} record(s)", records.len());
    Ok(())
}

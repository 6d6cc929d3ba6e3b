// paperstack CLI - curated paper-list maintenance, headless

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use paperstack_cli::exit_codes::EXIT_SUCCESS;
use paperstack_cli::{init, render, update, validate};
use paperstack_merge::ConflictPolicy;

#[derive(Parser)]
#[command(name = "pstack")]
#[command(about = "Curated paper-list maintenance: merge, validate, render")]
#[command(version)]
struct Cli {
    /// Path to the config file
    #[arg(long, global = true, default_value = "paperstack.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fold update files into the core collection
    #[command(after_help = "\
Examples:
  pstack update
  pstack update --on-conflict replace
  pstack update --remove-merged")]
    Update {
        /// What to do with a conflicting non-duplicate submission
        #[arg(long, value_enum, default_value = "mark")]
        on_conflict: PolicyArg,

        /// Rewrite update files without the absorbed records
        #[arg(long)]
        remove_merged: bool,
    },

    /// Check the core collection and update files
    Validate {
        /// Check only the core collection
        #[arg(long)]
        skip_updates: bool,
    },

    /// Emit the README paper tables
    #[command(after_help = "\
Examples:
  pstack render
  pstack render --output TABLES.md")]
    Render {
        /// Write to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Scaffold a config file, empty collection, and submission templates
    Init {
        /// Target directory
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    Mark,
    Skip,
    Replace,
}

impl From<PolicyArg> for ConflictPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Mark => ConflictPolicy::Mark,
            PolicyArg::Skip => ConflictPolicy::Skip,
            PolicyArg::Replace => ConflictPolicy::Replace,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Update { on_conflict, remove_merged } => {
            update::cmd_update(&cli.config, on_conflict.into(), remove_merged)
        }
        Commands::Validate { skip_updates } => validate::cmd_validate(&cli.config, skip_updates),
        Commands::Render { output } => render::cmd_render(&cli.config, output.as_deref()),
        Commands::Init { dir } => init::cmd_init(&dir),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("error: {}", e.message);
            if let Some(hint) = e.hint {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(e.code)
        }
    }
}

mod commands;
mod graph;
mod layout;
mod persist;
mod session;
mod store;
mod tui;
mod viewport;

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "kin", about = "A terminal family-tree editor")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start a family tree in the current directory
    Init,
    /// Open the interactive tree canvas
    View {
        /// Launch with a built-in sample family (no tree required)
        #[arg(long)]
        demo: bool,
    },
    /// Query the tree for specific conditions
    #[command(
        group(
            ArgGroup::new("inspect_query")
                .args(["validate", "path", "generations", "family"])
                .multiple(false)
        )
    )]
    Inspect {
        /// Check every relationship reference resolves
        #[arg(long)]
        validate: bool,
        /// Shortest relationship chain between two person ids
        #[arg(long, num_args = 2, value_names = ["FROM", "TO"])]
        path: Option<Vec<String>>,
        /// Group everyone into generation tiers from the founder
        #[arg(long)]
        generations: bool,
        /// The family unit implied by the edge between two person ids
        #[arg(long, num_args = 2, value_names = ["A", "B"])]
        family: Option<Vec<String>>,
    },
    /// List every person with their relationships
    List,
    /// Replace the tree with a snapshot from a JSON file
    Import { file: PathBuf },
    /// Merge a snapshot from a JSON file into the tree
    Merge { file: PathBuf },
    /// Write the tree snapshot to a file, or stdout
    Export { file: Option<PathBuf> },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Init => commands::init::run(),
        Command::View { demo } => commands::view::run(demo),
        Command::Inspect {
            validate,
            path,
            generations,
            family,
        } => {
            if validate {
                commands::inspect::run_validate()
            } else if let Some(pair) = path {
                commands::inspect::run_path(&pair[0], &pair[1])
            } else if generations {
                commands::inspect::run_generations()
            } else if let Some(pair) = family {
                commands::inspect::run_family(&pair[0], &pair[1])
            } else {
                eprintln!(
                    "Specify one of: --validate, --path <from> <to>, --generations, --family <a> <b>"
                );
                Ok(())
            }
        }
        Command::List => commands::list::run(),
        Command::Import { file } => commands::transfer::run_import(&file),
        Command::Merge { file } => commands::transfer::run_merge(&file),
        Command::Export { file } => commands::transfer::run_export(file.as_deref()),
    }
}

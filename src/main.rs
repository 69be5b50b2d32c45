use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::Result;
use std::path::PathBuf;
use std::process;
use todostore::config::{Backend, ColorMode, Config};
use todostore::render::{render, render_stats};
use todostore::{FileKv, SqliteKv, TaskStore, TodoError};

#[derive(Parser)]
#[command(name = "todostore")]
#[command(about = "Persistent todo list over a pluggable key-value backend")]
#[command(version)]
struct Cli {
    /// Path to the config file (default: platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the task store, overriding the config file
    #[arg(short, long)]
    store_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task text; surrounding whitespace is trimmed
        text: String,
    },

    /// Toggle a task between completed and remaining
    Toggle {
        /// Task id, as shown by `list`
        id: i64,
    },

    /// Delete a task
    Delete {
        /// Task id, as shown by `list`
        id: i64,
    },

    /// Replace the text of an existing task
    Rename {
        /// Task id, as shown by `list`
        id: i64,
        /// Replacement text; if it trims to nothing the task is left as is
        text: String,
    },

    /// Show the task list
    List,

    /// Show the task counters only
    Stats,
}

fn main() -> Result<()> {
    // Setup tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    match config.color {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {}
    }

    let store_path = cli
        .store_path
        .unwrap_or_else(|| config.resolve_store_path());

    // Open store
    let mut store = match config.backend {
        Backend::Sqlite => TaskStore::open(SqliteKv::open(&store_path)?)?,
        Backend::File => TaskStore::open(FileKv::open(&store_path)?)?,
    };

    match cli.command {
        Commands::Add { text } => match store.add(&text) {
            Ok(_) => print!("{}", render(store.tasks(), store.stats())),
            Err(TodoError::EmptyTaskText) => {
                eprintln!("{}", "Please enter a task".yellow());
                process::exit(1);
            }
            Err(e) => return Err(e.into()),
        },
        Commands::Toggle { id } => {
            store.toggle(id)?;
            print!("{}", render(store.tasks(), store.stats()));
        }
        Commands::Delete { id } => {
            store.delete(id)?;
            print!("{}", render(store.tasks(), store.stats()));
        }
        Commands::Rename { id, text } => {
            store.rename(id, &text)?;
            print!("{}", render(store.tasks(), store.stats()));
        }
        Commands::List => {
            print!("{}", render(store.tasks(), store.stats()));
        }
        Commands::Stats => {
            println!("{}", render_stats(store.stats()));
        }
    }

    Ok(())
}

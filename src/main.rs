use clap::Parser;
use color_eyre::Result;
use jnl::cli::{Cli, Commands};
use jnl::{Config, Database, EntryStore, Profile, TodoStore};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    let cli = Cli::parse();

    // JNL_LOG overrides the level picked by --verbose
    let default_level = if cli.verbose { "jnl=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("JNL_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    // Determine profile: --dev flag enables dev mode, otherwise use prod
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    let config = match cli.config.as_deref() {
        Some(path) => Config::load_from_path(Path::new(path))?,
        None => Config::load_with_profile(profile)?,
    };

    let db = Database::open(&config.get_database_path())?;
    let entries = EntryStore::new(&db, config.get_entries_dir());

    match cli.command {
        Commands::Entry(command) => jnl::cli::handle_entry(command, &entries)?,
        Commands::Todo(command) => {
            let todos = TodoStore::new(&entries);
            jnl::cli::handle_todo(command, &todos)?;
        }
    }

    drop(entries);
    db.close()?;

    Ok(())
}

use clap::{Parser, Subcommand};
use serde::Serialize;
use thiserror::Error;

use crate::entry_store::{ContentLookup, EntryStore};
use crate::error::StoreError;
use crate::models::{EntryUpdate, TodoUpdate};
use crate::todo_store::TodoStore;

#[derive(Parser)]
#[command(name = "jnl")]
#[command(about = "Journal entries with mirrored content files and audited to-dos")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Use development mode (uses separate dev config/database)
    #[arg(long, global = true)]
    pub dev: bool,

    /// Log file and database operations to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage journal entries
    #[command(subcommand)]
    Entry(EntryCommand),
    /// Manage to-dos attached to entries
    #[command(subcommand)]
    Todo(TodoCommand),
}

#[derive(Subcommand)]
pub enum EntryCommand {
    /// Create a new entry
    Add {
        /// Entry title
        title: String,
        /// Entry content
        #[arg(long)]
        content: String,
        /// Mood from 1 (very sad) to 5 (very happy)
        #[arg(long, allow_negative_numbers = true)]
        mood: Option<i64>,
    },
    /// List all entries, newest first
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show one entry's metadata
    Show { id: i64 },
    /// Search entries by title substring or exact mood
    Find {
        #[arg(long)]
        title: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        mood: Option<i64>,
        #[arg(long)]
        json: bool,
    },
    /// Print an entry's content file
    Read { id: i64 },
    /// Change an entry's title, mood or content
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        mood: Option<i64>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Delete an entry, its content file and its to-dos
    Delete { id: i64 },
    /// List the to-dos of an entry
    Todos {
        id: i64,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum TodoCommand {
    /// Add a to-do to an entry
    Add {
        /// Task description
        task: String,
        /// Owning entry ID
        #[arg(long = "entry")]
        entry_id: i64,
        /// Status (defaults to "pending")
        #[arg(long)]
        status: Option<String>,
    },
    /// List all to-dos
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show one to-do
    Show { id: i64 },
    /// Search to-dos by task substring
    Find {
        task: String,
        #[arg(long)]
        json: bool,
    },
    /// Change a to-do's task, status or owning entry
    Update {
        id: i64,
        #[arg(long)]
        task: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long = "entry")]
        entry_id: Option<i64>,
    },
    /// Delete a to-do
    Delete { id: i64 },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Provide --title or --mood to search")]
    MissingFilter,
}

fn print_list<T: Serialize + std::fmt::Display>(items: &[T], json: bool, empty: &str) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
    } else if items.is_empty() {
        println!("{}", empty);
    } else {
        for item in items {
            println!("{}", item);
        }
    }
    Ok(())
}

/// Handle an `entry` subcommand
pub fn handle_entry(command: EntryCommand, entries: &EntryStore<'_>) -> Result<(), CliError> {
    match command {
        EntryCommand::Add { title, content, mood } => {
            let entry = entries.create(&title, &content, mood)?;
            println!("Entry \"{}\" created successfully (ID: {})", entry.title, entry.id);
        }
        EntryCommand::List { json } => {
            print_list(&entries.list()?, json, "No entries yet.")?;
        }
        EntryCommand::Show { id } => match entries.find_by_id(id)? {
            Some(entry) => {
                println!("{}", entry);
                println!("File: {}", entry.content_path.display());
            }
            None => println!("Entry with ID {} not found.", id),
        },
        EntryCommand::Find { title, mood, json } => {
            let found = match (title, mood) {
                (Some(title), _) => {
                    let mut found = entries.find_by_title(&title)?;
                    if let Some(mood) = mood {
                        found.retain(|e| e.mood.map(i64::from) == Some(mood));
                    }
                    found
                }
                (None, Some(mood)) => entries.find_by_mood(mood)?,
                (None, None) => return Err(CliError::MissingFilter),
            };
            print_list(&found, json, "No matching entries found.")?;
        }
        EntryCommand::Read { id } => match entries.read_content(id)? {
            ContentLookup::Text(text) => print!("{}", text),
            ContentLookup::EntryNotFound => println!("Entry with ID {} not found.", id),
            ContentLookup::Unavailable(warning) => println!("Content unavailable: {}", warning),
        },
        EntryCommand::Update { id, title, mood, content } => {
            let changes = EntryUpdate { title, mood, content };
            match entries.update(id, changes)? {
                Some(synced) => println!("Entry \"{}\" updated successfully.", synced.value.title),
                None => println!("Entry with ID {} not found.", id),
            }
        }
        EntryCommand::Delete { id } => match entries.delete(id)? {
            Some(synced) => println!("Entry \"{}\" deleted.", synced.value.title),
            None => println!("Entry with ID {} not found.", id),
        },
        EntryCommand::Todos { id, json } => match entries.find_by_id(id)? {
            Some(entry) => {
                let empty = format!("No to-dos found for entry \"{}\".", entry.title);
                print_list(&entries.todos(id)?, json, &empty)?;
            }
            None => println!("Entry with ID {} not found.", id),
        },
    }

    Ok(())
}

/// Handle a `todo` subcommand
pub fn handle_todo(command: TodoCommand, todos: &TodoStore<'_>) -> Result<(), CliError> {
    match command {
        TodoCommand::Add { task, entry_id, status } => {
            let synced = todos.create(&task, entry_id, status.as_deref())?;
            println!(
                "Task \"{}\" added to entry {} (ID: {})",
                synced.value.task, entry_id, synced.value.id
            );
        }
        TodoCommand::List { json } => {
            print_list(&todos.list()?, json, "No to-dos yet.")?;
        }
        TodoCommand::Show { id } => match todos.find_by_id(id)? {
            Some(todo) => println!("{}", todo),
            None => println!("To-do with ID {} not found.", id),
        },
        TodoCommand::Find { task, json } => {
            print_list(&todos.find_by_task(&task)?, json, "No matching to-dos found.")?;
        }
        TodoCommand::Update { id, task, status, entry_id } => {
            let changes = TodoUpdate { task, status, entry_id };
            match todos.update(id, changes)? {
                Some(_) => println!("To-do {} updated successfully.", id),
                None => println!("To-do with ID {} not found.", id),
            }
        }
        TodoCommand::Delete { id } => match todos.delete(id)? {
            Some(synced) => println!("To-do \"{}\" deleted.", synced.value.task),
            None => println!("To-do with ID {} not found.", id),
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_entry_command() {
        let cli = Cli::try_parse_from(["jnl", "entry", "add", "Trip", "--content", "Day one", "--mood", "4"])
            .unwrap();
        match cli.command {
            Commands::Entry(EntryCommand::Add { title, content, mood }) => {
                assert_eq!(title, "Trip");
                assert_eq!(content, "Day one");
                assert_eq!(mood, Some(4));
            }
            _ => panic!("expected entry add"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["jnl", "todo", "list", "--dev", "--json"]).unwrap();
        assert!(cli.dev);
        assert!(matches!(cli.command, Commands::Todo(TodoCommand::List { json: true })));
    }

    #[test]
    fn entry_add_requires_content() {
        assert!(Cli::try_parse_from(["jnl", "entry", "add", "Trip"]).is_err());
        let cli = Cli::try_parse_from(["jnl", "entry", "add", "Trip", "--content", ""]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Entry(EntryCommand::Add { ref content, .. }) if content.is_empty()
        ));
    }

    #[test]
    fn todo_add_requires_entry() {
        assert!(Cli::try_parse_from(["jnl", "todo", "add", "Pack bags"]).is_err());
    }
}

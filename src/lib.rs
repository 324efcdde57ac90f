pub mod cli;
pub mod config;
pub mod content_file;
pub mod database;
pub mod entry_store;
pub mod error;
pub mod models;
pub mod sync;
pub mod todo_store;
pub mod utils;

pub use config::Config;
pub use database::{Database, DatabaseError};
pub use entry_store::{ContentLookup, EntryStore};
pub use error::StoreError;
pub use models::{Entry, EntryUpdate, Mood, Todo, TodoUpdate};
pub use sync::{FileOp, SyncWarning, Synced};
pub use todo_store::TodoStore;
pub use utils::Profile;

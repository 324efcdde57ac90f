use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{Entry, Mood, TIMESTAMP_FORMAT, Todo};

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Failed to create database directory: {0}")]
    DirectoryError(String),
}

// Extended result codes, see https://sqlite.org/rescode.html
const SQLITE_CONSTRAINT_FOREIGNKEY: i32 = 787;
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;

impl DatabaseError {
    /// True when SQLite rejected a statement because of any constraint
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            DatabaseError::SqliteError(err) => {
                err.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation)
            }
            DatabaseError::DirectoryError(_) => false,
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        self.extended_code() == Some(SQLITE_CONSTRAINT_UNIQUE)
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        self.extended_code() == Some(SQLITE_CONSTRAINT_FOREIGNKEY)
    }

    fn extended_code(&self) -> Option<i32> {
        match self {
            DatabaseError::SqliteError(rusqlite::Error::SqliteFailure(err, _)) => {
                Some(err.extended_code)
            }
            _ => None,
        }
    }
}

/// The storage handle. Opened once, passed by reference to the stores, closed explicitly.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database file and initialize the schema
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DatabaseError::DirectoryError(e.to_string()))?;
            }
        }

        let conn = Connection::open(path)?;
        let db = Database { conn };
        db.initialize_schema()?;
        tracing::debug!(path = %path.display(), "opened database");

        Ok(db)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Close the connection, surfacing any error SQLite reports on shutdown
    pub fn close(self) -> Result<(), DatabaseError> {
        self.conn.close().map_err(|(_, e)| DatabaseError::from(e))
    }

    fn initialize_schema(&self) -> Result<(), DatabaseError> {
        // Foreign keys are off by default in SQLite and are per-connection
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS entries (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                title           TEXT NOT NULL,
                mood            INTEGER CHECK (mood IS NULL OR (mood >= 1 AND mood <= 5)),
                timestamp       TEXT NOT NULL,
                content_path    TEXT NOT NULL UNIQUE
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS todos (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                task            TEXT NOT NULL,
                status          TEXT NOT NULL DEFAULT 'pending',
                entry_id        INTEGER NOT NULL REFERENCES entries(id) ON DELETE CASCADE
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_entries_timestamp ON entries(timestamp)",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_entries_title ON entries(title)",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_todos_entry_id ON todos(entry_id)",
            [],
        )?;

        Ok(())
    }

    /// Get a reference to the underlying connection
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    // ---- entries ----

    /// Insert an entry row and return its ID
    pub fn insert_entry(
        &self,
        title: &str,
        mood: Option<Mood>,
        timestamp: &chrono::NaiveDateTime,
        content_path: &Path,
    ) -> Result<i64, DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO entries (title, mood, timestamp, content_path) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                title,
                mood,
                timestamp.format(TIMESTAMP_FORMAT).to_string(),
                content_path.to_string_lossy(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
    }

    /// Helper function to map a row to an Entry
    fn row_to_entry(row: &rusqlite::Row) -> Result<Entry, rusqlite::Error> {
        let raw_timestamp: String = row.get(3)?;
        let timestamp = chrono::NaiveDateTime::parse_from_str(&raw_timestamp, TIMESTAMP_FORMAT)
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
            })?;
        let content_path: String = row.get(4)?;

        Ok(Entry {
            id: row.get(0)?,
            title: row.get(1)?,
            mood: row.get(2)?,
            timestamp,
            content_path: PathBuf::from(content_path),
        })
    }

    /// Get all entries, most recent first
    pub fn get_all_entries(&self) -> Result<Vec<Entry>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, mood, timestamp, content_path
             FROM entries ORDER BY timestamp DESC, id DESC",
        )?;
        let entries = stmt
            .query_map([], Self::row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Get a single entry by ID
    pub fn get_entry(&self, id: i64) -> Result<Option<Entry>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, mood, timestamp, content_path FROM entries WHERE id = ?1",
        )?;
        let entry = stmt
            .query_row(rusqlite::params![id], Self::row_to_entry)
            .optional()?;
        Ok(entry)
    }

    /// Entries whose title contains `needle`, ignoring ASCII case
    pub fn find_entries_by_title(&self, needle: &str) -> Result<Vec<Entry>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, mood, timestamp, content_path
             FROM entries WHERE title LIKE ?1 ESCAPE '\\' ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(rusqlite::params![like_pattern(needle)], Self::row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn find_entries_by_mood(&self, mood: Mood) -> Result<Vec<Entry>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, mood, timestamp, content_path
             FROM entries WHERE mood = ?1 ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(rusqlite::params![mood], Self::row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Whether an entry other than `excluding_id` already records `path`
    pub fn content_path_in_use(&self, path: &Path, excluding_id: i64) -> Result<bool, DatabaseError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM entries WHERE content_path = ?1 AND id != ?2",
            rusqlite::params![path.to_string_lossy(), excluding_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Write the mutable columns of an entry back in one transaction
    pub fn update_entry(&self, entry: &Entry) -> Result<(), DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE entries SET title = ?1, mood = ?2, content_path = ?3 WHERE id = ?4",
            rusqlite::params![
                entry.title,
                entry.mood,
                entry.content_path.to_string_lossy(),
                entry.id
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Delete an entry and every to-do it owns. Returns the number of to-dos removed.
    pub fn delete_entry_cascade(&self, id: i64) -> Result<usize, DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        let removed_todos =
            tx.execute("DELETE FROM todos WHERE entry_id = ?1", rusqlite::params![id])?;
        tx.execute("DELETE FROM entries WHERE id = ?1", rusqlite::params![id])?;
        tx.commit()?;
        Ok(removed_todos)
    }

    // ---- todos ----

    /// Insert a to-do row and return its ID
    pub fn insert_todo(&self, task: &str, status: &str, entry_id: i64) -> Result<i64, DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO todos (task, status, entry_id) VALUES (?1, ?2, ?3)",
            rusqlite::params![task, status, entry_id],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
    }

    fn row_to_todo(row: &rusqlite::Row) -> Result<Todo, rusqlite::Error> {
        Ok(Todo {
            id: row.get(0)?,
            task: row.get(1)?,
            status: row.get(2)?,
            entry_id: row.get(3)?,
        })
    }

    pub fn get_all_todos(&self) -> Result<Vec<Todo>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, task, status, entry_id FROM todos ORDER BY id ASC")?;
        let todos = stmt
            .query_map([], Self::row_to_todo)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(todos)
    }

    pub fn get_todo(&self, id: i64) -> Result<Option<Todo>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, task, status, entry_id FROM todos WHERE id = ?1")?;
        let todo = stmt
            .query_row(rusqlite::params![id], Self::row_to_todo)
            .optional()?;
        Ok(todo)
    }

    pub fn get_todos_for_entry(&self, entry_id: i64) -> Result<Vec<Todo>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, task, status, entry_id FROM todos WHERE entry_id = ?1 ORDER BY id ASC",
        )?;
        let todos = stmt
            .query_map(rusqlite::params![entry_id], Self::row_to_todo)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(todos)
    }

    /// To-dos whose task contains `needle`, ignoring ASCII case
    pub fn find_todos_by_task(&self, needle: &str) -> Result<Vec<Todo>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, task, status, entry_id FROM todos
             WHERE task LIKE ?1 ESCAPE '\\' ORDER BY id ASC",
        )?;
        let todos = stmt
            .query_map(rusqlite::params![like_pattern(needle)], Self::row_to_todo)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(todos)
    }

    pub fn update_todo(&self, todo: &Todo) -> Result<(), DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE todos SET task = ?1, status = ?2, entry_id = ?3 WHERE id = ?4",
            rusqlite::params![todo.task, todo.status, todo.entry_id, todo.id],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn delete_todo(&self, id: i64) -> Result<(), DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM todos WHERE id = ?1", rusqlite::params![id])?;
        tx.commit()?;
        Ok(())
    }
}

/// Build a `LIKE` pattern matching `needle` anywhere, with wildcards escaped
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

//! Journal entries: rows in `entries` mirrored by one content file each.
//!
//! The file is written before the row is inserted, so a failed write never
//! leaves a row behind. Later file operations (rename, overwrite, remove) are
//! best-effort and degrade to [`SyncWarning`]s.

use std::io;
use std::path::{Path, PathBuf};

use chrono::{NaiveDateTime, Timelike, Utc};

use crate::content_file;
use crate::database::{Database, DatabaseError};
use crate::error::{Result, StoreError, require_text};
use crate::models::{Entry, EntryUpdate, Mood, Todo};
use crate::sync::{FileOp, SyncWarning, Synced};

/// Result of reading an entry's content file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentLookup {
    Text(String),
    EntryNotFound,
    /// The row exists but its file could not be read
    Unavailable(SyncWarning),
}

pub struct EntryStore<'db> {
    db: &'db Database,
    entries_dir: PathBuf,
}

fn parse_mood(value: i64) -> Result<Mood> {
    Mood::try_from(value).map_err(StoreError::Validation)
}

impl<'db> EntryStore<'db> {
    pub fn new(db: &'db Database, entries_dir: impl Into<PathBuf>) -> Self {
        Self {
            db,
            entries_dir: entries_dir.into(),
        }
    }

    pub fn database(&self) -> &'db Database {
        self.db
    }

    pub fn entries_dir(&self) -> &Path {
        &self.entries_dir
    }

    /// Create an entry stamped with the current UTC time
    pub fn create(&self, title: &str, content: &str, mood: Option<i64>) -> Result<Entry> {
        self.create_at(title, content, mood, Utc::now().naive_utc())
    }

    /// Create an entry with an explicit creation time (truncated to whole seconds)
    pub fn create_at(
        &self,
        title: &str,
        content: &str,
        mood: Option<i64>,
        timestamp: NaiveDateTime,
    ) -> Result<Entry> {
        let title = require_text("Title", title)?;
        let mood = mood.map(parse_mood).transpose()?;
        let timestamp = timestamp.with_nanosecond(0).unwrap_or(timestamp);

        let content_path = content_file::entry_path(&self.entries_dir, title, &timestamp);
        let text = content_file::render_entry(title, mood, &timestamp, content);
        content_file::write_new(&content_path, &text).map_err(|source| {
            if source.kind() == io::ErrorKind::AlreadyExists && content_path.is_file() {
                StoreError::PathConflict(content_path.clone())
            } else {
                StoreError::ContentWrite {
                    path: content_path.clone(),
                    source,
                }
            }
        })?;

        let id = match self.db.insert_entry(title, mood, &timestamp, &content_path) {
            Ok(id) => id,
            Err(err) => {
                // The row never made it, so the file we just wrote belongs to nobody
                if let Err(cleanup) = content_file::remove(&content_path) {
                    tracing::warn!(
                        path = %content_path.display(),
                        "failed to remove content file after insert error: {}",
                        cleanup
                    );
                }
                return Err(conflict_or(err, &content_path));
            }
        };

        tracing::debug!(id, path = %content_path.display(), "created entry");
        Ok(Entry {
            id,
            title: title.to_string(),
            mood,
            timestamp,
            content_path,
        })
    }

    /// All entries, most recent first
    pub fn list(&self) -> Result<Vec<Entry>> {
        Ok(self.db.get_all_entries()?)
    }

    pub fn find_by_id(&self, id: i64) -> Result<Option<Entry>> {
        Ok(self.db.get_entry(id)?)
    }

    /// Entries whose title contains `needle`, case-insensitively
    pub fn find_by_title(&self, needle: &str) -> Result<Vec<Entry>> {
        Ok(self.db.find_entries_by_title(needle)?)
    }

    /// Entries with exactly this mood. Values outside 1..=5 match nothing.
    pub fn find_by_mood(&self, value: i64) -> Result<Vec<Entry>> {
        match Mood::new(value) {
            Some(mood) => Ok(self.db.find_entries_by_mood(mood)?),
            None => Ok(Vec::new()),
        }
    }

    /// To-dos owned by an entry
    pub fn todos(&self, entry_id: i64) -> Result<Vec<Todo>> {
        Ok(self.db.get_todos_for_entry(entry_id)?)
    }

    pub fn read_content(&self, id: i64) -> Result<ContentLookup> {
        let Some(entry) = self.db.get_entry(id)? else {
            return Ok(ContentLookup::EntryNotFound);
        };

        match content_file::read(&entry.content_path) {
            Ok(text) => Ok(ContentLookup::Text(text)),
            Err(err) => {
                let warning = SyncWarning::from_io(FileOp::Read, &entry.content_path, &err);
                tracing::warn!("{}", warning);
                Ok(ContentLookup::Unavailable(warning))
            }
        }
    }

    /// Apply the supplied fields. Returns `None` when the entry does not exist.
    ///
    /// A new title renames the file (keeping the original timestamp in the name).
    /// New content rewrites the whole file, dropping any appended audit blocks.
    pub fn update(&self, id: i64, changes: EntryUpdate) -> Result<Option<Synced<Entry>>> {
        let Some(entry) = self.db.get_entry(id)? else {
            return Ok(None);
        };

        // Validate everything before the first side effect
        let new_title = changes
            .title
            .as_deref()
            .map(|t| require_text("Title", t))
            .transpose()?;
        let new_mood = changes.mood.map(parse_mood).transpose()?;

        let mut synced = Synced::new(entry);
        if changes.is_empty() {
            return Ok(Some(synced));
        }

        if let Some(title) = new_title {
            self.retitle(&mut synced, title)?;
        }

        if let Some(mood) = new_mood {
            synced.value.mood = Some(mood);
        }

        if let Some(content) = changes.content.as_deref() {
            let entry = &synced.value;
            let text =
                content_file::render_entry(&entry.title, entry.mood, &entry.timestamp, content);
            let path = entry.content_path.clone();
            if let Err(err) = content_file::overwrite(&path, &text) {
                synced.warn(SyncWarning::from_io(FileOp::Write, path, &err));
            }
        }

        self.db
            .update_entry(&synced.value)
            .map_err(|err| conflict_or(err, &synced.value.content_path))?;

        tracing::debug!(id, path = %synced.value.content_path.display(), "updated entry");
        Ok(Some(synced))
    }

    /// Point the entry at a path derived from `title`, moving the file if it is there
    fn retitle(&self, synced: &mut Synced<Entry>, title: &str) -> Result<()> {
        let old_path = synced.value.content_path.clone();
        let dir = old_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(self.entries_dir.as_path());
        let new_path = content_file::entry_path(dir, title, &synced.value.timestamp);

        if new_path != old_path {
            // A row can hold the path even when its file is gone
            if new_path.exists() || self.db.content_path_in_use(&new_path, synced.value.id)? {
                return Err(StoreError::PathConflict(new_path));
            }
            match content_file::rename(&old_path, &new_path) {
                Ok(()) => {
                    tracing::debug!(
                        from = %old_path.display(),
                        to = %new_path.display(),
                        "renamed content file"
                    );
                    synced.value.content_path = new_path;
                }
                // Nothing to move: the stored path dangles until the file is rewritten
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    synced.warn(SyncWarning::from_io(FileOp::Rename, &old_path, &err));
                    synced.value.content_path = new_path;
                }
                // The file is still at the old path, so the row keeps pointing there
                Err(err) => synced.warn(SyncWarning::from_io(FileOp::Rename, &old_path, &err)),
            }
        }

        synced.value.title = title.to_string();
        Ok(())
    }

    /// Remove the file (best-effort) and then the row along with its to-dos.
    /// Returns the deleted entry, or `None` when it did not exist.
    pub fn delete(&self, id: i64) -> Result<Option<Synced<Entry>>> {
        let Some(entry) = self.db.get_entry(id)? else {
            return Ok(None);
        };

        let path = entry.content_path.clone();
        let mut synced = Synced::new(entry);
        if let Err(err) = content_file::remove(&path) {
            synced.warn(SyncWarning::from_io(FileOp::Remove, path, &err));
        }

        let removed_todos = self.db.delete_entry_cascade(id)?;
        tracing::debug!(id, removed_todos, "deleted entry");
        Ok(Some(synced))
    }
}

fn conflict_or(err: DatabaseError, path: &Path) -> StoreError {
    if err.is_unique_violation() {
        StoreError::PathConflict(path.to_path_buf())
    } else {
        StoreError::Database(err)
    }
}

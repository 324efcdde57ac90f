//! To-dos attached to entries.
//!
//! Every create, update and delete is committed first and then recorded as an
//! audit block at the end of the owning entry's content file. The append is
//! best-effort: a missing or unwritable file produces a [`SyncWarning`] and
//! leaves the committed row alone.

use std::path::Path;

use crate::content_file::{self, AuditEvent};
use crate::database::{Database, DatabaseError};
use crate::entry_store::EntryStore;
use crate::error::{Result, StoreError, require_text};
use crate::models::{DEFAULT_TODO_STATUS, Entry, Todo, TodoUpdate};
use crate::sync::{FileOp, SyncWarning, Synced};

pub struct TodoStore<'s> {
    entries: &'s EntryStore<'s>,
}

impl<'s> TodoStore<'s> {
    pub fn new(entries: &'s EntryStore<'s>) -> Self {
        Self { entries }
    }

    fn db(&self) -> &'s Database {
        self.entries.database()
    }

    fn owner(&self, entry_id: i64) -> Result<Entry> {
        self.entries
            .find_by_id(entry_id)?
            .ok_or(StoreError::Referential(entry_id))
    }

    /// Add a to-do to an existing entry. `status` defaults to "pending".
    pub fn create(&self, task: &str, entry_id: i64, status: Option<&str>) -> Result<Synced<Todo>> {
        let task = require_text("Task", task)?;
        let status = status.unwrap_or(DEFAULT_TODO_STATUS);
        let entry = self.owner(entry_id)?;

        let id = self
            .db()
            .insert_todo(task, status, entry_id)
            .map_err(|err| referential_or(err, entry_id))?;
        tracing::debug!(id, entry_id, "created todo");

        let mut synced = Synced::new(Todo {
            id,
            task: task.to_string(),
            status: status.to_string(),
            entry_id,
        });
        let block = AuditEvent::Added { task, status }.render();
        append_audit(&mut synced, &entry.content_path, &block);
        Ok(synced)
    }

    pub fn list(&self) -> Result<Vec<Todo>> {
        Ok(self.db().get_all_todos()?)
    }

    pub fn find_by_id(&self, id: i64) -> Result<Option<Todo>> {
        Ok(self.db().get_todo(id)?)
    }

    /// To-dos whose task contains `needle`, case-insensitively
    pub fn find_by_task(&self, needle: &str) -> Result<Vec<Todo>> {
        Ok(self.db().find_todos_by_task(needle)?)
    }

    /// Apply the supplied fields and record the before/after pair in the
    /// (possibly new) owning entry's file. Returns `None` when the to-do does not exist.
    pub fn update(&self, id: i64, changes: TodoUpdate) -> Result<Option<Synced<Todo>>> {
        let Some(todo) = self.db().get_todo(id)? else {
            return Ok(None);
        };

        let new_task = changes
            .task
            .as_deref()
            .map(|t| require_text("Task", t))
            .transpose()?;
        let owner = match changes.entry_id {
            Some(entry_id) => Some(self.owner(entry_id)?),
            None => self.entries.find_by_id(todo.entry_id)?,
        };

        let old_task = todo.task.clone();
        let old_status = todo.status.clone();

        let mut updated = todo;
        if let Some(task) = new_task {
            updated.task = task.to_string();
        }
        if let Some(status) = changes.status {
            updated.status = status;
        }
        if let Some(entry_id) = changes.entry_id {
            updated.entry_id = entry_id;
        }

        self.db()
            .update_todo(&updated)
            .map_err(|err| referential_or(err, updated.entry_id))?;
        tracing::debug!(id, entry_id = updated.entry_id, "updated todo");

        let block = AuditEvent::Updated {
            old_task: &old_task,
            old_status: &old_status,
            task: &updated.task,
            status: &updated.status,
        }
        .render();
        let mut synced = Synced::new(updated);
        match owner {
            Some(entry) => append_audit(&mut synced, &entry.content_path, &block),
            None => tracing::warn!(id, "todo has no owning entry; audit skipped"),
        }
        Ok(Some(synced))
    }

    /// Delete the row, then note the deletion in the owning entry's file.
    /// Returns the deleted to-do, or `None` when it did not exist.
    pub fn delete(&self, id: i64) -> Result<Option<Synced<Todo>>> {
        let Some(todo) = self.db().get_todo(id)? else {
            return Ok(None);
        };
        // Resolve the file before the row goes away
        let owner = self.entries.find_by_id(todo.entry_id)?;

        self.db().delete_todo(id)?;
        tracing::debug!(id, entry_id = todo.entry_id, "deleted todo");

        let block = AuditEvent::Deleted {
            task: &todo.task,
            status: &todo.status,
        }
        .render();
        let mut synced = Synced::new(todo);
        match owner {
            Some(entry) => append_audit(&mut synced, &entry.content_path, &block),
            None => tracing::warn!(id, "todo has no owning entry; audit skipped"),
        }
        Ok(Some(synced))
    }
}

fn append_audit<T>(synced: &mut Synced<T>, path: &Path, block: &str) {
    if let Err(err) = content_file::append(path, block) {
        synced.warn(SyncWarning::from_io(FileOp::Append, path, &err));
    }
}

fn referential_or(err: DatabaseError, entry_id: i64) -> StoreError {
    // The entry vanished between the lookup and the write
    if err.is_foreign_key_violation() {
        StoreError::Referential(entry_id)
    } else {
        StoreError::Database(err)
    }
}

//! The database and the content files are only eventually consistent.
//! These tests pin down what happens when they drift apart.

use std::fs;

use jnl::{ContentLookup, EntryUpdate, FileOp, StoreError, SyncWarning, TodoStore, TodoUpdate};

mod common;
use common::{Fixture, at, read};

#[test]
fn test_read_content_after_file_removed_out_of_band() {
    let fx = Fixture::new();
    let entries = fx.entries();
    let entry = entries.create("Vanishing", "now you see me", None).unwrap();
    fs::remove_file(&entry.content_path).unwrap();

    match entries.read_content(entry.id).unwrap() {
        ContentLookup::Unavailable(warning) => {
            assert!(warning.is_missing_file());
            assert_eq!(warning.op(), FileOp::Read);
        }
        other => panic!("expected unavailable content, got {other:?}"),
    }
    // The row is untouched
    assert_eq!(entries.find_by_id(entry.id).unwrap(), Some(entry));
}

#[test]
fn test_todo_committed_even_when_entry_file_missing() {
    let fx = Fixture::new();
    let entries = fx.entries();
    let todos = TodoStore::new(&entries);
    let entry = entries.create("Fileless", "", None).unwrap();
    fs::remove_file(&entry.content_path).unwrap();

    let synced = todos.create("Still saved", entry.id, None).unwrap();

    assert_eq!(
        synced.warnings,
        vec![SyncWarning::missing(FileOp::Append, entry.content_path.clone())]
    );
    assert_eq!(todos.find_by_id(synced.value.id).unwrap(), Some(synced.value.clone()));
    // Appending never resurrects the file
    assert!(!entry.content_path.exists());

    let updated = todos
        .update(synced.value.id, TodoUpdate::default().status("done"))
        .unwrap()
        .unwrap();
    assert_eq!(updated.warnings.len(), 1);
    assert_eq!(todos.find_by_id(synced.value.id).unwrap().unwrap().status, "done");

    let deleted = todos.delete(synced.value.id).unwrap().unwrap();
    assert_eq!(deleted.warnings.len(), 1);
    assert!(todos.list().unwrap().is_empty());
}

#[test]
fn test_rename_with_missing_file_leaves_dangling_path() {
    let fx = Fixture::new();
    let entries = fx.entries();
    let entry = entries.create_at("Before", "text", Some(2), at(13, 0, 0)).unwrap();
    fs::remove_file(&entry.content_path).unwrap();

    let synced = entries
        .update(entry.id, EntryUpdate::default().title("After"))
        .unwrap()
        .unwrap();

    assert_eq!(synced.warnings.len(), 1);
    assert!(synced.warnings[0].is_missing_file());
    assert_eq!(synced.warnings[0].op(), FileOp::Rename);

    let stored = entries.find_by_id(entry.id).unwrap().unwrap();
    assert_eq!(stored.title, "After");
    assert!(stored.content_path.ends_with("After_2024-06-15_13-00-00.txt"));
    assert!(!stored.content_path.exists());

    // Supplying content later re-creates the file at the stored path
    let rewritten = entries
        .update(entry.id, EntryUpdate::default().content("restored"))
        .unwrap()
        .unwrap();
    assert!(rewritten.is_clean());
    assert!(read(&stored.content_path).ends_with("restored\n"));
}

#[test]
fn test_content_update_discards_audit_blocks() {
    let fx = Fixture::new();
    let entries = fx.entries();
    let todos = TodoStore::new(&entries);
    let entry = entries.create("Lossy", "original", Some(3)).unwrap();
    todos.create("Remember me", entry.id, None).unwrap();
    assert!(read(&entry.content_path).contains("✅ To-Do"));

    entries
        .update(entry.id, EntryUpdate::default().content("rewritten"))
        .unwrap()
        .unwrap();

    let text = read(&entry.content_path);
    assert!(text.ends_with("rewritten\n"));
    assert!(!text.contains("✅ To-Do"));
    assert!(!text.contains("Remember me"));
    // The row survives; only its history in the file is gone
    assert_eq!(entries.todos(entry.id).unwrap().len(), 1);
}

#[test]
fn test_delete_with_missing_file_still_removes_row() {
    let fx = Fixture::new();
    let entries = fx.entries();
    let todos = TodoStore::new(&entries);
    let entry = entries.create("Gone already", "", None).unwrap();
    todos.create("Dangling", entry.id, None).unwrap();
    fs::remove_file(&entry.content_path).unwrap();

    let synced = entries.delete(entry.id).unwrap().unwrap();

    assert_eq!(
        synced.warnings,
        vec![SyncWarning::missing(FileOp::Remove, entry.content_path.clone())]
    );
    assert!(entries.find_by_id(entry.id).unwrap().is_none());
    assert!(todos.list().unwrap().is_empty());
}

#[test]
fn test_failed_insert_leaves_no_file() {
    let fx = Fixture::new();
    fx.db
        .conn()
        .execute_batch(
            "CREATE TRIGGER reject_entries BEFORE INSERT ON entries
             BEGIN SELECT RAISE(ABORT, 'entries are read-only'); END;",
        )
        .unwrap();
    let entries = fx.entries();

    let err = entries.create("Never stored", "text", Some(1)).unwrap_err();

    assert!(matches!(err, StoreError::Database(_)));
    assert!(entries.list().unwrap().is_empty());
    assert!(fx.files().is_empty());
}

#[test]
fn test_unwritable_entries_dir_aborts_create() {
    let fx = Fixture::new();
    // A plain file where the directory should be
    fs::write(fx.entries_dir(), "not a directory").unwrap();
    let entries = fx.entries();

    let err = entries.create("Nowhere to go", "text", None).unwrap_err();

    assert!(matches!(err, StoreError::ContentWrite { .. }));
    assert!(entries.list().unwrap().is_empty());
}

#[test]
fn test_externally_edited_file_is_read_verbatim() {
    let fx = Fixture::new();
    let entries = fx.entries();
    let entry = entries.create("Edited", "draft", None).unwrap();
    fs::write(&entry.content_path, "hand written\n").unwrap();

    assert_eq!(
        entries.read_content(entry.id).unwrap(),
        ContentLookup::Text("hand written\n".to_string())
    );
}

#[test]
fn test_failed_rename_keeps_stored_path() {
    let fx = Fixture::new();
    let entries = fx.entries();
    let entry = entries.create("Short", "still here", None).unwrap();
    // Longer than any file name the filesystem accepts
    let long_title = "x".repeat(300);

    let synced = entries
        .update(entry.id, EntryUpdate::default().title(long_title.as_str()))
        .unwrap()
        .unwrap();

    assert_eq!(synced.warnings.len(), 1);
    assert_eq!(synced.warnings[0].op(), FileOp::Rename);
    assert!(!synced.warnings[0].is_missing_file());

    let stored = entries.find_by_id(entry.id).unwrap().unwrap();
    assert_eq!(stored.title, long_title);
    assert_eq!(stored.content_path, entry.content_path);
    assert!(stored.content_path.exists());
    match entries.read_content(entry.id).unwrap() {
        ContentLookup::Text(text) => assert!(text.ends_with("still here\n")),
        other => panic!("expected text, got {other:?}"),
    }
}

#[test]
fn test_rename_onto_path_held_by_row_without_file() {
    let fx = Fixture::new();
    let entries = fx.entries();
    let alpha = entries.create_at("Alpha", "alpha text", None, at(10, 0, 0)).unwrap();
    let beta = entries.create_at("Beta", "beta text", None, at(10, 0, 0)).unwrap();
    fs::remove_file(&beta.content_path).unwrap();

    let err = entries
        .update(alpha.id, EntryUpdate::default().title("Beta"))
        .unwrap_err();

    assert!(matches!(err, StoreError::PathConflict(ref p) if *p == beta.content_path));
    // Neither the files nor the rows moved
    assert!(read(&alpha.content_path).ends_with("alpha text\n"));
    assert!(!beta.content_path.exists());
    assert_eq!(entries.find_by_id(alpha.id).unwrap(), Some(alpha));
    assert_eq!(entries.find_by_id(beta.id).unwrap(), Some(beta));
}

#[test]
fn test_unappendable_file_reports_io_warning() {
    let fx = Fixture::new();
    let entries = fx.entries();
    let todos = TodoStore::new(&entries);
    let entry = entries.create("Blocked", "", None).unwrap();
    // A directory squatting on the file's path cannot be appended to
    fs::remove_file(&entry.content_path).unwrap();
    fs::create_dir(&entry.content_path).unwrap();

    let synced = todos.create("Saved anyway", entry.id, None).unwrap();

    assert_eq!(synced.warnings.len(), 1);
    assert!(matches!(
        &synced.warnings[0],
        SyncWarning::Io { op: FileOp::Append, path, .. } if *path == entry.content_path
    ));
    assert_eq!(todos.find_by_id(synced.value.id).unwrap(), Some(synced.value));
}

#[test]
fn test_partial_audit_block_is_never_reconciled() {
    let fx = Fixture::new();
    let entries = fx.entries();
    let todos = TodoStore::new(&entries);
    let entry = entries.create("Interrupted", "body", None).unwrap();
    let todo = todos.create("Half written", entry.id, None).unwrap().value;

    // Simulate an append cut off before the status line reached the disk
    let full = read(&entry.content_path);
    let cut = full.rfind("📌 Status").unwrap();
    fs::write(&entry.content_path, &full[..cut]).unwrap();

    // The row is committed regardless of what the file holds
    assert_eq!(todos.find_by_id(todo.id).unwrap(), Some(todo.clone()));

    let updated = todos
        .update(todo.id, TodoUpdate::default().status("done"))
        .unwrap()
        .unwrap();
    assert!(updated.is_clean());

    // Later blocks land after the fragment; the missing line stays missing
    let text = read(&entry.content_path);
    assert!(text.starts_with(&full[..cut]));
    assert_eq!(text.matches("📝 Task   : Half written").count(), 2);
    assert_eq!(text.matches("📌 Status").count(), 1);
    assert!(text.ends_with("📌 Status : Done\n"));
}

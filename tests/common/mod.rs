#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use jnl::{Database, EntryStore};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A database file and an entries directory inside one temp dir
pub struct Fixture {
    pub dir: TempDir,
    pub db: Database,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let db = Database::open(&dir.path().join("journal.db")).unwrap();
        Self { dir, db }
    }

    pub fn entries_dir(&self) -> PathBuf {
        self.dir.path().join("entries")
    }

    pub fn entries(&self) -> EntryStore<'_> {
        EntryStore::new(&self.db, self.entries_dir())
    }

    /// Content files currently on disk
    pub fn files(&self) -> Vec<PathBuf> {
        match fs::read_dir(self.entries_dir()) {
            Ok(read_dir) => {
                let mut files: Vec<PathBuf> = read_dir.map(|e| e.unwrap().path()).collect();
                files.sort();
                files
            }
            Err(_) => Vec::new(),
        }
    }
}

pub fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 15)
        .and_then(|d| d.and_hms_opt(h, m, s))
        .unwrap()
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Format used for timestamps in the database and in content file headers
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Status given to a to-do when the caller does not supply one
pub const DEFAULT_TODO_STATUS: &str = "pending";

/// A mood rating in the inclusive range 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Mood(u8);

impl Mood {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 5;

    /// Validate a raw mood value
    pub fn new(value: i64) -> Option<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Some(Mood(value as u8))
        } else {
            None
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Human-readable label written into content files
    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "😞 Very Sad",
            2 => "😕 Sad",
            3 => "😐 Neutral",
            4 => "🙂 Happy",
            _ => "😄 Very Happy",
        }
    }
}

impl TryFrom<i64> for Mood {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Mood::new(value).ok_or_else(|| {
            format!("Mood must be an integer between {} and {}, got {}", Mood::MIN, Mood::MAX, value)
        })
    }
}

impl From<Mood> for i64 {
    fn from(mood: Mood) -> Self {
        i64::from(mood.0)
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ToSql for Mood {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(i64::from(self.0)))
    }
}

impl FromSql for Mood {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = i64::column_result(value)?;
        Mood::new(raw).ok_or(FromSqlError::OutOfRange(raw))
    }
}

/// Label for an optional mood, "N/A" when unspecified
pub fn mood_label(mood: Option<Mood>) -> &'static str {
    mood.map(Mood::label).unwrap_or("N/A")
}

/// Journal entry metadata. The long-form text lives in the file at `content_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub title: String,
    pub mood: Option<Mood>,
    pub timestamp: NaiveDateTime,
    pub content_path: PathBuf,
}

impl Entry {
    pub fn timestamp_string(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} | mood: {} | {}",
            self.id,
            self.title,
            mood_label(self.mood),
            self.timestamp_string()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub task: String,
    pub status: String, // pending, done, or anything else
    pub entry_id: i64,
}

impl fmt::Display for Todo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} | status: {} | entry: {}",
            self.id, self.task, self.status, self.entry_id
        )
    }
}

/// Partial update of an entry. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryUpdate {
    pub title: Option<String>,
    pub mood: Option<i64>,
    pub content: Option<String>,
}

impl EntryUpdate {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn mood(mut self, mood: i64) -> Self {
        self.mood = Some(mood);
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.mood.is_none() && self.content.is_none()
    }
}

/// Partial update of a to-do. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoUpdate {
    pub task: Option<String>,
    pub status: Option<String>,
    pub entry_id: Option<i64>,
}

impl TodoUpdate {
    pub fn task(mut self, task: impl Into<String>) -> Self {
        self.task = Some(task.into());
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn entry_id(mut self, entry_id: i64) -> Self {
        self.entry_id = Some(entry_id);
        self
    }
}

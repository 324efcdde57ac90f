//! Layout and I/O for the per-entry content files.
//!
//! A content file starts with a fixed header followed by the raw entry text.
//! To-do mutations append audit blocks after it; nothing in this module ever
//! rewrites an existing block.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::models::{Mood, TIMESTAMP_FORMAT, mood_label};

const RULE_WIDTH: usize = 40;

/// Timestamp layout used in file names (no characters that are awkward in paths)
const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

fn heavy_rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn light_rule() -> String {
    "-".repeat(RULE_WIDTH)
}

/// Replace whitespace and path separators so a title can be used as a file name
pub fn normalize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            if c.is_whitespace() || c == '/' || c == '\\' {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// `<entries_dir>/<normalized title>_<YYYY-MM-DD_HH-MM-SS>.txt`
pub fn entry_path(entries_dir: &Path, title: &str, timestamp: &NaiveDateTime) -> PathBuf {
    entries_dir.join(format!(
        "{}_{}.txt",
        normalize_title(title),
        timestamp.format(FILE_TIMESTAMP_FORMAT)
    ))
}

/// Render the header and content of an entry file
pub fn render_entry(title: &str, mood: Option<Mood>, timestamp: &NaiveDateTime, content: &str) -> String {
    let heavy = heavy_rule();
    let light = light_rule();
    let mut out = String::new();
    out.push_str(&format!("{heavy}\n"));
    out.push_str("       📝 Journal Entry\n");
    out.push_str(&format!("{heavy}\n\n"));
    out.push_str(&format!("Title     : {title}\n"));
    out.push_str(&format!("Mood      : {}\n", mood_label(mood)));
    out.push_str(&format!("Timestamp : {}\n\n", timestamp.format(TIMESTAMP_FORMAT)));
    out.push_str(&format!("{light}\n"));
    out.push_str("Content:\n");
    out.push_str(&format!("{light}\n"));
    out.push_str(content);
    out.push('\n');
    out
}

/// Upper-case the first character and lower-case the rest; empty renders as "N/A"
pub fn display_status(status: &str) -> String {
    let mut chars = status.chars();
    match chars.next() {
        None => "N/A".to_string(),
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
    }
}

/// A to-do mutation recorded in the owning entry's file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEvent<'a> {
    Added {
        task: &'a str,
        status: &'a str,
    },
    Updated {
        old_task: &'a str,
        old_status: &'a str,
        task: &'a str,
        status: &'a str,
    },
    Deleted {
        task: &'a str,
        status: &'a str,
    },
}

impl AuditEvent<'_> {
    pub fn render(&self) -> String {
        match *self {
            AuditEvent::Added { task, status } => block("          ✅ To-Do", "Task", task, "Status", status),
            AuditEvent::Updated {
                old_task,
                old_status,
                task,
                status,
            } => {
                let mut out = block(
                    "   ❗️ Previous To-Do Updated",
                    "Old Task",
                    old_task,
                    "Old Status",
                    old_status,
                );
                out.push_str(&block("       🔄 New To-Do", "Task", task, "Status", status));
                out
            }
            AuditEvent::Deleted { task, status } => {
                block("       ❌ To-Do Deleted", "Task", task, "Status", status)
            }
        }
    }
}

fn block(header: &str, task_label: &str, task: &str, status_label: &str, status: &str) -> String {
    let heavy = heavy_rule();
    // Labels are padded so the colons line up within a block
    let width = task_label.len().max(status_label.len());
    format!(
        "\n{heavy}\n{header}\n{heavy}\n📝 {task_label:<width$} : {task}\n📌 {status_label:<width$} : {}\n",
        display_status(status)
    )
}

/// Create a brand-new content file, creating the directory on demand.
/// Fails with `AlreadyExists` rather than clobbering another entry's file.
pub fn write_new(path: &Path, text: &str) -> io::Result<()> {
    ensure_parent(path)?;
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(text.as_bytes())?;
    file.sync_all()
}

/// Replace the whole file, creating it if it is gone
pub fn overwrite(path: &Path, text: &str) -> io::Result<()> {
    ensure_parent(path)?;
    fs::write(path, text)
}

/// Append to an existing file. A missing file is reported as `NotFound`, never created.
pub fn append(path: &Path, text: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().append(true).open(path)?;
    file.write_all(text.as_bytes())
}

pub fn read(path: &Path) -> io::Result<String> {
    fs::read_to_string(path)
}

pub fn rename(from: &Path, to: &Path) -> io::Result<()> {
    ensure_parent(to)?;
    fs::rename(from, to)
}

pub fn remove(path: &Path) -> io::Result<()> {
    fs::remove_file(path)
}

fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

//! Non-fatal reports about the content-file mirror.
//!
//! The database is authoritative. When a file operation that follows a
//! database change cannot be carried out, the store logs a [`SyncWarning`]
//! and hands it back alongside the committed value instead of failing.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// File operation a warning refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOp {
    Read,
    Rename,
    Write,
    Append,
    Remove,
}

impl fmt::Display for FileOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileOp::Read => "read",
            FileOp::Rename => "rename",
            FileOp::Write => "write",
            FileOp::Append => "append",
            FileOp::Remove => "remove",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncWarning {
    #[error("content file not found during {op}: {}", .path.display())]
    MissingFile { op: FileOp, path: PathBuf },
    #[error("content file {op} failed for {}: {message}", .path.display())]
    Io {
        op: FileOp,
        path: PathBuf,
        message: String,
    },
}

impl SyncWarning {
    pub fn missing(op: FileOp, path: impl Into<PathBuf>) -> Self {
        SyncWarning::MissingFile {
            op,
            path: path.into(),
        }
    }

    /// Classify an I/O error, treating `NotFound` as a missing file
    pub fn from_io(op: FileOp, path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        let path = path.into();
        if err.kind() == std::io::ErrorKind::NotFound {
            SyncWarning::MissingFile { op, path }
        } else {
            SyncWarning::Io {
                op,
                path,
                message: err.to_string(),
            }
        }
    }

    pub fn op(&self) -> FileOp {
        match self {
            SyncWarning::MissingFile { op, .. } | SyncWarning::Io { op, .. } => *op,
        }
    }

    pub fn is_missing_file(&self) -> bool {
        matches!(self, SyncWarning::MissingFile { .. })
    }
}

/// A committed value plus whatever went wrong mirroring it to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synced<T> {
    pub value: T,
    pub warnings: Vec<SyncWarning>,
}

impl<T> Synced<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    /// Log the warning and keep it for the caller
    pub(crate) fn warn(&mut self, warning: SyncWarning) {
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

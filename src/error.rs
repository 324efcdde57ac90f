use std::path::PathBuf;
use thiserror::Error;

use crate::database::DatabaseError;

/// Errors that stop a store operation before anything is persisted
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No entry found with ID {0}")]
    Referential(i64),

    #[error("Content path already in use: {}", .0.display())]
    PathConflict(PathBuf),

    #[error("Failed to write content file {}: {source}", .path.display())]
    ContentWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl StoreError {
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }

    pub fn is_referential(&self) -> bool {
        matches!(self, StoreError::Referential(_))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Reject blank values for required text fields
pub(crate) fn require_text<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    if value.trim().is_empty() {
        Err(StoreError::Validation(format!("{field} must not be empty")))
    } else {
        Ok(value)
    }
}

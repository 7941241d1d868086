//! Storage traits and error types
//!
//! This module defines the interface the pipeline hands its final batch to,
//! and the errors a sink can report.

use crate::catalog::MedicalCode;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// Connection or health probe failed; the caller keeps polling
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    /// The batch was rolled back and dropped
    #[error("Failed to write {rows} records: {source}")]
    Write {
        rows: usize,
        #[source]
        source: rusqlite::Error,
    },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Destination for flattened catalog records
pub trait RecordSink {
    /// Creates the `medical_codes` table if it is missing
    fn ensure_schema(&mut self) -> StorageResult<()>;

    /// Inserts the whole batch or nothing
    ///
    /// # Returns
    ///
    /// The number of rows written
    fn insert_batch(&mut self, records: &[MedicalCode]) -> StorageResult<usize>;
}

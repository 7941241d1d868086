//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the RecordSink trait.

use crate::catalog::MedicalCode;
use crate::storage::schema::{initialize_schema, INSERT_SQL};
use crate::storage::traits::{RecordSink, StorageError, StorageResult};
use rusqlite::{params, Connection};
use std::path::Path;
use std::time::Duration;

/// SQLite storage backend
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    /// Opens the database and checks that it answers
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteSink)` - Database opened and the probe succeeded
    /// * `Err(StorageError::Unavailable)` - Open or probe failed
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| StorageError::Unavailable(format!("{}: {}", path.display(), e)))?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )
        .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        let sink = Self { conn };
        sink.probe()?;
        Ok(sink)
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Polls until the database can be opened and probed
    ///
    /// Never gives up: the rest of the pipeline cannot proceed without the
    /// store, so an unavailable database only delays the run.
    pub async fn connect_when_ready(path: &Path, poll_interval: Duration) -> Self {
        let mut probes: u64 = 1;
        loop {
            match Self::open(path) {
                Ok(sink) => {
                    tracing::info!("Database {} ready after {} probe(s)", path.display(), probes);
                    return sink;
                }
                Err(e) => {
                    tracing::warn!(
                        "Database not ready ({}); probing again in {}s",
                        e,
                        poll_interval.as_secs_f64()
                    );
                    tokio::time::sleep(poll_interval).await;
                    probes += 1;
                }
            }
        }
    }

    /// Health probe
    fn probe(&self) -> StorageResult<()> {
        self.conn
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(|e| StorageError::Unavailable(format!("health probe failed: {}", e)))?;
        Ok(())
    }

    /// Counts rows in the code table
    pub fn count_records(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM medical_codes", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl RecordSink for SqliteSink {
    fn ensure_schema(&mut self) -> StorageResult<()> {
        initialize_schema(&self.conn)?;
        Ok(())
    }

    fn insert_batch(&mut self, records: &[MedicalCode]) -> StorageResult<usize> {
        let rows = records.len();
        let write_error = |source| StorageError::Write { rows, source };

        // Dropping the transaction on any error rolls the whole batch back
        let tx = self.conn.transaction().map_err(write_error)?;
        {
            let mut stmt = tx.prepare(INSERT_SQL).map_err(write_error)?;
            for record in records {
                stmt.execute(params![
                    record.group_code,
                    record.group_desc,
                    record.code,
                    record.code_desc
                ])
                .map_err(write_error)?;
            }
        }
        tx.commit().map_err(write_error)?;

        Ok(rows)
    }
}

//! Storage module for persisting harvested codes
//!
//! This module handles all database operations, including:
//! - Waiting for the database to become available
//! - Creating the `medical_codes` table
//! - All-or-nothing bulk insert of the flattened batch

mod schema;
mod sqlite;
mod traits;

pub use schema::{initialize_schema, SCHEMA_SQL};
pub use sqlite::SqliteSink;
pub use traits::{RecordSink, StorageError, StorageResult};

use crate::catalog::MedicalCode;

/// Hands a batch to a sink
///
/// Schema creation failures are logged and ignored so an existing table is
/// reused; insert failures are returned and the batch is not retried.
///
/// # Returns
///
/// * `Ok(usize)` - Number of records written
/// * `Err(StorageError)` - The batch was rolled back
pub fn persist<S: RecordSink>(sink: &mut S, records: &[MedicalCode]) -> StorageResult<usize> {
    if let Err(e) = sink.ensure_schema() {
        tracing::warn!("Schema creation failed, using existing table: {}", e);
    }

    let written = sink.insert_batch(records)?;
    tracing::info!("Stored {} medical codes", written);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sink that records calls, optionally failing schema creation
    #[derive(Default)]
    struct RecordingSink {
        fail_schema: bool,
        fail_insert: bool,
        schema_calls: usize,
        batches: Vec<Vec<MedicalCode>>,
    }

    impl RecordSink for RecordingSink {
        fn ensure_schema(&mut self) -> StorageResult<()> {
            self.schema_calls += 1;
            if self.fail_schema {
                return Err(StorageError::Unavailable("table already exists".to_string()));
            }
            Ok(())
        }

        fn insert_batch(&mut self, records: &[MedicalCode]) -> StorageResult<usize> {
            if self.fail_insert {
                return Err(StorageError::Write {
                    rows: records.len(),
                    source: rusqlite::Error::QueryReturnedNoRows,
                });
            }
            self.batches.push(records.to_vec());
            Ok(records.len())
        }
    }

    fn records() -> Vec<MedicalCode> {
        vec![MedicalCode {
            group_code: "A00-A09".to_string(),
            group_desc: "Intestinal infectious diseases".to_string(),
            code: "A04".to_string(),
            code_desc: "Other bacterial intestinal infections".to_string(),
        }]
    }

    #[test]
    fn test_persist_writes_batch() {
        let mut sink = RecordingSink::default();
        assert_eq!(persist(&mut sink, &records()).unwrap(), 1);
        assert_eq!(sink.schema_calls, 1);
        assert_eq!(sink.batches, vec![records()]);
    }

    #[test]
    fn test_schema_failure_is_not_fatal() {
        let mut sink = RecordingSink {
            fail_schema: true,
            ..RecordingSink::default()
        };
        assert_eq!(persist(&mut sink, &records()).unwrap(), 1);
        assert_eq!(sink.batches.len(), 1);
    }

    #[test]
    fn test_insert_failure_is_returned() {
        let mut sink = RecordingSink {
            fail_insert: true,
            ..RecordingSink::default()
        };
        assert!(matches!(
            persist(&mut sink, &records()),
            Err(StorageError::Write { rows: 1, .. })
        ));
    }
}

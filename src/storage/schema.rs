//! Database schema definitions
//!
//! This module contains the SQL schema for the harvested code table.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per leaf code, tagged with its top-level category
CREATE TABLE IF NOT EXISTS medical_codes (
    pk INTEGER PRIMARY KEY AUTOINCREMENT,
    group_code TEXT NOT NULL,
    group_desc TEXT NOT NULL,
    code TEXT NOT NULL UNIQUE,
    code_desc TEXT NOT NULL
);
"#;

/// Insert statement used for every record of a batch
pub const INSERT_SQL: &str =
    "INSERT INTO medical_codes (group_code, group_desc, code, code_desc) VALUES (?1, ?2, ?3, ?4)";

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

//! Append-only audit records for CSV import batches.
//!
//! Batches are diagnostic only: nothing else reads them, and they are never
//! mutated after creation.

use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{Error, database_id::DatabaseId, owner::OwnerId};

/// The outcome of one CSV import, as submitted to the committer.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportBatch {
    /// The ID of the batch record.
    pub id: DatabaseId,
    /// The name of the imported file.
    pub filename: String,
    /// How many candidate rows were submitted.
    pub row_count: usize,
    /// How many rows were inserted into the ledger.
    pub success_count: usize,
    /// How many rows were not inserted (duplicates of existing rows).
    pub error_count: usize,
    /// When the import ran.
    pub imported_at: OffsetDateTime,
    /// The owner that ran the import.
    pub owner_id: OwnerId,
}

/// Record the outcome of an import batch.
pub fn record_import_batch(
    filename: &str,
    row_count: usize,
    success_count: usize,
    error_count: usize,
    owner: OwnerId,
    connection: &Connection,
) -> Result<ImportBatch, Error> {
    let imported_at = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO import_batch (filename, row_count, success_count, error_count, imported_at, owner_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        (
            filename,
            row_count as i64,
            success_count as i64,
            error_count as i64,
            imported_at,
            owner.as_i64(),
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(ImportBatch {
        id,
        filename: filename.to_owned(),
        row_count,
        success_count,
        error_count,
        imported_at,
        owner_id: owner,
    })
}

/// Retrieve the owner's import history, newest first.
pub fn get_import_batches(
    owner: OwnerId,
    connection: &Connection,
) -> Result<Vec<ImportBatch>, Error> {
    connection
        .prepare(
            "SELECT id, filename, row_count, success_count, error_count, imported_at, owner_id
             FROM import_batch
             WHERE owner_id = :owner_id
             ORDER BY imported_at DESC, id DESC;",
        )?
        .query_map(&[(":owner_id", &owner.as_i64())], |row| {
            Ok(ImportBatch {
                id: row.get(0)?,
                filename: row.get(1)?,
                row_count: row.get::<_, i64>(2)? as usize,
                success_count: row.get::<_, i64>(3)? as usize,
                error_count: row.get::<_, i64>(4)? as usize,
                imported_at: row.get(5)?,
                owner_id: OwnerId::new(row.get(6)?),
            })
        })?
        .map(|maybe_batch| maybe_batch.map_err(Error::SqlError))
        .collect()
}

/// Initialize the import batch table.
pub fn create_import_batch_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS import_batch (
            id INTEGER PRIMARY KEY,
            filename TEXT NOT NULL,
            row_count INTEGER NOT NULL,
            success_count INTEGER NOT NULL,
            error_count INTEGER NOT NULL,
            imported_at TEXT NOT NULL,
            owner_id INTEGER NOT NULL
        )",
        (),
    )?;

    Ok(())
}

#[cfg(test)]
mod import_batch_tests {
    use rusqlite::Connection;

    use crate::{db::initialize, owner::OwnerId};

    use super::{get_import_batches, record_import_batch};

    const OWNER: OwnerId = OwnerId::new(1);

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn record_and_list_round_trip() {
        let conn = get_test_connection();

        let recorded = record_import_batch("statement.csv", 10, 7, 3, OWNER, &conn)
            .expect("Could not record batch");

        let batches = get_import_batches(OWNER, &conn).expect("Could not list batches");
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].id, recorded.id);
        assert_eq!(batches[0].filename, "statement.csv");
        assert_eq!(batches[0].row_count, 10);
        assert_eq!(batches[0].success_count, 7);
        assert_eq!(batches[0].error_count, 3);
    }

    #[test]
    fn batches_are_owner_scoped() {
        let conn = get_test_connection();
        record_import_batch("statement.csv", 1, 1, 0, OWNER, &conn).unwrap();

        let batches = get_import_batches(OwnerId::new(2), &conn).unwrap();

        assert_eq!(batches, []);
    }
}

//! Database initialization for the application's SQLite schema.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, account::create_account_table, budget::create_budget_table,
    category::create_category_table, csv_import::create_mapping_preset_table,
    import_batch::create_import_batch_table, transaction::create_transaction_table,
};

/// Create all application tables if they do not exist yet.
///
/// Table creation runs inside one exclusive SQL transaction, so a half
/// initialized schema is never left behind.
///
/// # Errors
///
/// Returns an [Error::SqlError] if any table cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // SQLite leaves foreign keys off by default; the transaction table
    // relies on them for category and account references.
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_category_table(&transaction)?;
    create_account_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_budget_table(&transaction)?;
    create_import_batch_table(&transaction)?;
    create_mapping_preset_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod initialize_tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn creates_all_tables() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("Could not initialize database");

        let table_count: u32 = connection
            .query_row(
                "SELECT COUNT(name) FROM sqlite_master WHERE type = 'table'
                 AND name IN ('category', 'account', 'transaction', 'budget', 'import_batch', 'mapping_preset');",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(table_count, 6);
    }

    #[test]
    fn is_idempotent() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("Could not initialize database");
        initialize(&connection).expect("Second initialize should succeed");
    }
}

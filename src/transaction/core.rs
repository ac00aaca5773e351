//! Defines the core data model and database operations for ledger
//! transactions.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    account::AccountId,
    category::CategoryId,
    csv_import::{is_income, transaction_hash},
    owner::OwnerId,
};

/// Database identifier for a transaction.
pub type TransactionId = i64;

/// A normalized ledger row: an event where money was spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money spent or earned. Positive amounts are income,
    /// negative amounts are expenses.
    pub amount: f64,
    /// Whether the amount is income. Always equal to `amount > 0`.
    pub is_income: bool,
    /// The category the transaction is assigned to, if any.
    pub category_id: Option<CategoryId>,
    /// The account the transaction was imported against, if any.
    pub account_id: Option<AccountId>,
    /// The category text as it appeared in the source CSV, if any.
    pub original_category: Option<String>,
    /// Content digest over date, description, and amount used as the
    /// deduplication key for re-import safety.
    pub hash: String,
    /// The owner this transaction belongs to.
    pub owner_id: OwnerId,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(amount: f64, date: Date, description: &str) -> TransactionBuilder {
        TransactionBuilder {
            amount,
            date,
            description: description.to_owned(),
            category_id: None,
            account_id: None,
            original_category: None,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// `is_income` and the dedup hash are derived from the other fields at
/// insert time, so they cannot be set here: the sign invariant and hash
/// determinism hold for every persisted row.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The monetary amount of the transaction. Positive values are income,
    /// negative values are expenses.
    pub amount: f64,
    /// The date when the transaction occurred.
    pub date: Date,
    /// A human-readable description of the transaction.
    pub description: String,
    /// The category to assign the transaction to.
    pub category_id: Option<CategoryId>,
    /// The account to attach the transaction to.
    pub account_id: Option<AccountId>,
    /// The category text from the source file, if the transaction was
    /// imported.
    pub original_category: Option<String>,
}

impl TransactionBuilder {
    /// Set the category for the transaction.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }

    /// Set the account for the transaction.
    pub fn account_id(mut self, account_id: Option<AccountId>) -> Self {
        self.account_id = account_id;
        self
    }

    /// Set the original category text for the transaction.
    pub fn original_category(mut self, original_category: Option<String>) -> Self {
        self.original_category = original_category;
        self
    }
}

/// Create a new transaction in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCategory] if the category ID does not refer to a real
///   category,
/// - or [Error::DuplicateTransaction] if the owner already has a
///   transaction with the same date, description, and amount,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    owner: OwnerId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let is_income = is_income(builder.amount);
    let hash = transaction_hash(builder.date, &builder.description, builder.amount);

    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\"
             (date, description, amount, is_income, category_id, account_id, original_category, hash, owner_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             RETURNING id, date, description, amount, is_income, category_id, account_id, original_category, hash, owner_id",
        )?
        .query_row(
            (
                builder.date,
                &builder.description,
                builder.amount,
                is_income,
                builder.category_id,
                builder.account_id,
                &builder.original_category,
                &hash,
                owner.as_i64(),
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidCategory(builder.category_id),
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateTransaction,
            error => error.into(),
        })?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`, scoped to `owner`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to the owner's transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    owner: OwnerId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, date, description, amount, is_income, category_id, account_id, original_category, hash, owner_id
             FROM \"transaction\" WHERE id = :id AND owner_id = :owner_id",
        )?
        .query_row(
            &[(":id", &id), (":owner_id", &owner.as_i64())],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Reassign a transaction to a different category (or to none).
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingTransaction] if the transaction does not exist
///   for this owner,
/// - or [Error::InvalidCategory] if the category ID is not valid.
pub fn update_transaction_category(
    id: TransactionId,
    category_id: Option<CategoryId>,
    owner: OwnerId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection
        .execute(
            "UPDATE \"transaction\" SET category_id = ?1 WHERE id = ?2 AND owner_id = ?3",
            (category_id, id, owner.as_i64()),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidCategory(category_id),
            error => error.into(),
        })?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

/// Delete a transaction by ID.
///
/// # Errors
/// Returns [Error::DeleteMissingTransaction] if the transaction does not
/// exist for this owner.
pub fn delete_transaction(
    id: TransactionId,
    owner: OwnerId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND owner_id = ?2",
        (id, owner.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Get the total number of the owner's transactions.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn count_transactions(owner: OwnerId, connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE owner_id = :owner_id;",
            &[(":owner_id", &owner.as_i64())],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// The `(hash, owner_id)` uniqueness constraint is the deduplication
/// mechanism for re-imports, and the sole concurrency-safety mechanism for
/// simultaneous imports of the same content.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            description TEXT NOT NULL,
            amount REAL NOT NULL,
            is_income INTEGER NOT NULL,
            category_id INTEGER,
            account_id INTEGER,
            original_category TEXT,
            hash TEXT NOT NULL,
            owner_id INTEGER NOT NULL,
            UNIQUE(hash, owner_id),
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL,
            FOREIGN KEY(account_id) REFERENCES account(id) ON UPDATE CASCADE ON DELETE SET NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_owner_date ON \"transaction\"(owner_id, date);
        CREATE INDEX IF NOT EXISTS idx_transaction_owner_category ON \"transaction\"(owner_id, category_id, date);",
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        date: row.get(1)?,
        description: row.get(2)?,
        amount: row.get(3)?,
        is_income: row.get(4)?,
        category_id: row.get(5)?,
        account_id: row.get(6)?,
        original_category: row.get(7)?,
        hash: row.get(8)?,
        owner_id: OwnerId::new(row.get(9)?),
    })
}

//! Database query helpers for the ledger used by reporting.

use rusqlite::Connection;
use time::Date;

use crate::{Error, category::CategoryId, owner::OwnerId};

use super::{Transaction, map_transaction_row};

/// Get the owner's most recent transactions, newest first.
///
/// Transactions on the same date are returned in reverse insertion order so
/// the list stays stable across imports.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_recent_transactions(
    owner: OwnerId,
    limit: u32,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, date, description, amount, is_income, category_id, account_id, original_category, hash, owner_id
             FROM \"transaction\"
             WHERE owner_id = :owner_id
             ORDER BY date DESC, id DESC
             LIMIT :limit",
        )?
        .query_map(
            &[(":owner_id", &owner.as_i64()), (":limit", &i64::from(limit))],
            map_transaction_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::SqlError))
        .collect()
}

/// Get transactions in an inclusive date range, oldest first.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_transactions_in_range(
    owner: OwnerId,
    start: Date,
    end: Date,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, date, description, amount, is_income, category_id, account_id, original_category, hash, owner_id
             FROM \"transaction\"
             WHERE owner_id = ?1 AND date BETWEEN ?2 AND ?3
             ORDER BY date ASC, id ASC",
        )?
        .query_map((owner.as_i64(), start, end), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::SqlError))
        .collect()
}

/// The date of the owner's earliest transaction, if any exist.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn earliest_transaction_date(
    owner: OwnerId,
    connection: &Connection,
) -> Result<Option<Date>, Error> {
    connection
        .query_row(
            "SELECT MIN(date) FROM \"transaction\" WHERE owner_id = :owner_id;",
            &[(":owner_id", &owner.as_i64())],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// The date of the owner's latest transaction, if any exist.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn latest_transaction_date(
    owner: OwnerId,
    connection: &Connection,
) -> Result<Option<Date>, Error> {
    connection
        .query_row(
            "SELECT MAX(date) FROM \"transaction\" WHERE owner_id = :owner_id;",
            &[(":owner_id", &owner.as_i64())],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Sum the owner's spending for one category over an inclusive date range.
///
/// Only expenses count: income assigned to the category is excluded, and
/// expense amounts contribute their absolute value.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn sum_category_expenses(
    category_id: CategoryId,
    start: Date,
    end: Date,
    owner: OwnerId,
    connection: &Connection,
) -> Result<f64, Error> {
    let total: f64 = connection
        .prepare(
            "SELECT COALESCE(SUM(ABS(amount)), 0) FROM \"transaction\"
             WHERE owner_id = ?1 AND category_id = ?2 AND is_income = 0
                AND date BETWEEN ?3 AND ?4",
        )?
        .query_row((owner.as_i64(), category_id, start, end), |row| row.get(0))?;

    Ok(total)
}

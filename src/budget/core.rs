//! Core budget model and database operations.

use rusqlite::{Connection, Row};

use crate::{Error, category::CategoryId, month::Month, owner::OwnerId};

/// Database identifier for a budget.
pub type BudgetId = i64;

/// A spending limit for one category in one month.
#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetId,
    /// The category the budget applies to.
    pub category_id: CategoryId,
    /// The month the budget applies to.
    pub month: Month,
    /// The budgeted amount.
    pub amount: f64,
    /// The owner this budget belongs to.
    pub owner_id: OwnerId,
}

/// Set the budget for a category and month.
///
/// Setting a budget for an (owner, category, month) that already has one
/// replaces the amount rather than creating a second row.
///
/// # Errors
/// Returns [Error::InvalidCategory] if `category_id` does not refer to a
/// real category.
pub fn set_budget(
    category_id: CategoryId,
    month: Month,
    amount: f64,
    owner: OwnerId,
    connection: &Connection,
) -> Result<Budget, Error> {
    connection
        .prepare(
            "INSERT INTO budget (category_id, month, amount, owner_id)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(owner_id, category_id, month) DO UPDATE SET amount = excluded.amount
             RETURNING id, category_id, month, amount, owner_id",
        )?
        .query_row(
            (category_id, month.to_string(), amount, owner.as_i64()),
            map_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidCategory(Some(category_id)),
            error => error.into(),
        })
}

/// Remove the budget for a category and month.
///
/// # Errors
/// Returns [Error::DeleteMissingBudget] if no such budget exists.
pub fn delete_budget(
    category_id: CategoryId,
    month: Month,
    owner: OwnerId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budget WHERE category_id = ?1 AND month = ?2 AND owner_id = ?3",
        (category_id, month.to_string(), owner.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingBudget);
    }

    Ok(())
}

/// Retrieve all of the owner's budgets for a month.
pub fn get_budgets_for_month(
    month: Month,
    owner: OwnerId,
    connection: &Connection,
) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT id, category_id, month, amount, owner_id FROM budget
             WHERE owner_id = ?1 AND month = ?2",
        )?
        .query_map((owner.as_i64(), month.to_string()), map_row)?
        .map(|maybe_budget| maybe_budget.map_err(Error::SqlError))
        .collect()
}

/// Initialize the budget table.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            category_id INTEGER NOT NULL,
            month TEXT NOT NULL,
            amount REAL NOT NULL,
            owner_id INTEGER NOT NULL,
            UNIQUE(owner_id, category_id, month),
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    let raw_month: String = row.get(2)?;
    let month = Month::parse(&raw_month).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            Box::new(error),
        )
    })?;

    Ok(Budget {
        id: row.get(0)?,
        category_id: row.get(1)?,
        month,
        amount: row.get(3)?,
        owner_id: OwnerId::new(row.get(4)?),
    })
}

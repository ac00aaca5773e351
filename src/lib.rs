//! ledgerly imports bank transaction history from arbitrary CSV exports
//! into a normalized SQLite ledger, then derives budgets, dashboard
//! summaries, and category analytics from that ledger.
//!
//! The interesting part is the ingestion pipeline in [csv_import]: a
//! quote-aware tokenizer, header-based column auto-detection, date/amount
//! normalization, and content-hash deduplication so re-importing a file is
//! always safe. The [budget] and [dashboard] modules reduce the normalized
//! ledger into budget-vs-actual reports and dashboard summaries.

#![warn(missing_docs)]

pub mod account;
pub mod budget;
pub mod category;
pub mod csv_import;
pub mod dashboard;
mod database_id;
pub mod db;
pub mod import_batch;
pub mod month;
pub mod owner;
pub mod transaction;

pub use database_id::DatabaseId;
pub use db::initialize as initialize_db;
pub use month::Month;
pub use owner::{OwnerId, resolve_owner};

use crate::category::CategoryId;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The uploaded CSV file contained no non-blank lines.
    #[error("the CSV file is empty")]
    EmptyCsv,

    /// The uploaded file exceeds the size ceiling.
    ///
    /// Checked before the file content is read, so oversized uploads cost
    /// nothing to reject.
    #[error("file size of {0} bytes exceeds the 10 MiB limit")]
    FileTooLarge(u64),

    /// The uploaded file does not have a `.csv` extension.
    #[error("only CSV files are allowed")]
    NotCsv,

    /// The uploaded file has more data rows than the ceiling allows.
    #[error("file contains {0} rows, maximum allowed is 50000")]
    RowLimitExceeded(usize),

    /// A column mapping is missing one of the required fields (date,
    /// description, or amount), so rows cannot be mapped to transactions.
    #[error("column mapping is missing a required field (date, description, or amount)")]
    MappingIncomplete,

    /// No owner identity was provided.
    ///
    /// Every entry point requires an owner; this error is terminal and is
    /// reported uniformly rather than hinting at which data exists.
    #[error("unauthorized: no owner identity was provided")]
    Unauthorized,

    /// An empty string was used to create a category name.
    #[error("category name cannot be empty")]
    EmptyCategoryName,

    /// A month string was not in `YYYY-MM` form.
    #[error("'{0}' is not a valid month, expected the format YYYY-MM")]
    InvalidMonth(String),

    /// The category ID used did not match a valid category.
    #[error("the category ID does not refer to a valid category")]
    InvalidCategory(Option<CategoryId>),

    /// The owner already has a transaction with this content.
    ///
    /// Content is identified by the hash over date, description, and
    /// amount; see
    /// [transaction_hash](crate::csv_import::transaction_hash).
    #[error("a transaction with the same date, description, and amount already exists")]
    DuplicateTransaction,

    /// The specified account name already exists for this owner.
    #[error("the account \"{0}\" already exists")]
    DuplicateAccountName(String),

    /// System categories keep their seed configuration and cannot be
    /// archived.
    #[error("system categories cannot be archived")]
    ArchiveSystemCategory,

    /// System categories keep their seed configuration and cannot be
    /// deleted.
    #[error("system categories cannot be deleted")]
    DeleteSystemCategory,

    /// Tried to update a category that does not exist.
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist.
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// Tried to update a transaction that does not exist.
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist.
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to delete a budget that does not exist.
    #[error("tried to delete a budget that is not in the database")]
    DeleteMissingBudget,

    /// An error occurred while serializing a struct as JSON.
    #[error("could not serialize as JSON: {0}")]
    JsonSerialization(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

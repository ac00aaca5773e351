//! The normalized transaction ledger and its queries.

mod core;
mod query;

pub use self::core::{
    Transaction, TransactionBuilder, TransactionId, count_transactions, create_transaction,
    create_transaction_table, delete_transaction, get_transaction, map_transaction_row,
    update_transaction_category,
};
pub use query::{
    earliest_transaction_date, get_recent_transactions, get_transactions_in_range,
    latest_transaction_date, sum_category_expenses,
};

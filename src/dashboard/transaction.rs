//! A slim transaction view for dashboard aggregation, joined with category
//! display data.

use rusqlite::Connection;
use time::Date;

use crate::{Error, owner::OwnerId};

/// Label used for spending with no category.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// Chart color used for spending with no category.
pub const UNCATEGORIZED_COLOR: &str = "#6B7280";

/// The fields of a transaction the dashboard reductions need.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct CategorizedTransaction {
    pub date: Date,
    pub amount: f64,
    pub is_income: bool,
    /// The assigned category's name, if any.
    pub category_name: Option<String>,
    /// The assigned category's color, if any.
    pub category_color: Option<String>,
}

/// Get the owner's transactions in an inclusive date range with category
/// display data attached.
pub(super) fn get_categorized_transactions_in_range(
    owner: OwnerId,
    start: Date,
    end: Date,
    connection: &Connection,
) -> Result<Vec<CategorizedTransaction>, Error> {
    connection
        .prepare(
            "SELECT t.date, t.amount, t.is_income, category.name, category.color
             FROM \"transaction\" t
             LEFT JOIN category ON t.category_id = category.id
             WHERE t.owner_id = ?1 AND t.date BETWEEN ?2 AND ?3
             ORDER BY t.date ASC, t.id ASC",
        )?
        .query_map((owner.as_i64(), start, end), |row| {
            Ok(CategorizedTransaction {
                date: row.get(0)?,
                amount: row.get(1)?,
                is_income: row.get(2)?,
                category_name: row.get(3)?,
                category_color: row.get(4)?,
            })
        })?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::SqlError))
        .collect()
}

#[cfg(test)]
mod categorized_transaction_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        category::{CategoryName, create_category},
        db::initialize,
        owner::OwnerId,
        transaction::{Transaction, create_transaction},
    };

    use super::get_categorized_transactions_in_range;

    const OWNER: OwnerId = OwnerId::new(1);

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn joins_category_display_data() {
        let conn = get_test_connection();
        let category = create_category(
            CategoryName::new_unchecked("Dining"),
            "#EF4444",
            OWNER,
            &conn,
        )
        .unwrap();
        create_transaction(
            Transaction::build(-12.0, date!(2024 - 03 - 10), "Kebab")
                .category_id(Some(category.id)),
            OWNER,
            &conn,
        )
        .unwrap();
        create_transaction(
            Transaction::build(-5.0, date!(2024 - 03 - 11), "Mystery"),
            OWNER,
            &conn,
        )
        .unwrap();

        let transactions = get_categorized_transactions_in_range(
            OWNER,
            date!(2024 - 03 - 01),
            date!(2024 - 03 - 31),
            &conn,
        )
        .expect("Could not get transactions");

        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].category_name.as_deref(), Some("Dining"));
        assert_eq!(transactions[0].category_color.as_deref(), Some("#EF4444"));
        assert_eq!(transactions[1].category_name, None);
        assert_eq!(transactions[1].category_color, None);
    }
}

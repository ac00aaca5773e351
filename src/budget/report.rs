//! Budget-vs-actual rollups and the month picker enumeration.

use rusqlite::Connection;
use time::Date;

use crate::{
    Error,
    budget::{Budget, get_budgets_for_month},
    category::{Category, get_categories},
    month::Month,
    owner::OwnerId,
    transaction::{earliest_transaction_date, latest_transaction_date, sum_category_expenses},
};

/// One row of the monthly budget report: a category, its optional budget,
/// and what was actually spent.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBudgetStatus {
    /// The category being reported on.
    pub category: Category,
    /// The budget for this category and month, if one is set.
    pub budget: Option<Budget>,
    /// Total spent in the month (sum of absolute expense amounts).
    pub spent: f64,
    /// Amount left before the budget is exhausted; zero when no budget is
    /// set. Negative when the budget has been exceeded.
    pub remaining: f64,
    /// Spend as a percentage of the budget; zero when no budget is set.
    pub percentage: f64,
}

/// Compute budget-vs-actual for every active category in a month.
///
/// Categories without a budget still appear, with `remaining` and
/// `percentage` of zero, so the report always covers the owner's whole
/// active category set.
///
/// # Errors
/// Returns [Error::SqlError] if any of the underlying queries fail.
pub fn monthly_budget_status(
    month: Month,
    owner: OwnerId,
    connection: &Connection,
) -> Result<Vec<CategoryBudgetStatus>, Error> {
    let categories = get_categories(owner, connection)?;
    let budgets = get_budgets_for_month(month, owner, connection)?;

    let start = month.first_day();
    let end = month.last_day();

    categories
        .into_iter()
        .map(|category| {
            let budget = budgets
                .iter()
                .find(|budget| budget.category_id == category.id)
                .cloned();
            let spent = sum_category_expenses(category.id, start, end, owner, connection)?;

            let (remaining, percentage) = match &budget {
                Some(budget) => (budget.amount - spent, spent / budget.amount * 100.0),
                None => (0.0, 0.0),
            };

            Ok(CategoryBudgetStatus {
                category,
                budget,
                spent,
                remaining,
                percentage,
            })
        })
        .collect()
}

/// An entry in the month picker: the `YYYY-MM` value and a display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthOption {
    /// Machine-readable month, e.g. `2024-03`.
    pub value: String,
    /// Human-readable label, e.g. "March 2024".
    pub label: String,
}

impl MonthOption {
    fn from_month(month: Month) -> Self {
        Self {
            value: month.to_string(),
            label: month.label(),
        }
    }
}

/// Enumerate the months the owner can budget for, most recent first.
///
/// The range runs from the month of the earliest transaction through the
/// month after the latest one, so there is always one future month for
/// forward planning. With no transactions at all, the current month is the
/// only entry.
///
/// # Errors
/// Returns [Error::SqlError] if the date queries fail.
pub fn available_months(
    today: Date,
    owner: OwnerId,
    connection: &Connection,
) -> Result<Vec<MonthOption>, Error> {
    let Some(earliest) = earliest_transaction_date(owner, connection)? else {
        return Ok(vec![MonthOption::from_month(Month::containing(today))]);
    };
    let latest = latest_transaction_date(owner, connection)?.unwrap_or(today);

    let end = Month::containing(latest).next();
    let mut current = Month::containing(earliest);

    let mut months = Vec::new();
    while current <= end {
        months.push(MonthOption::from_month(current));
        current = current.next();
    }

    months.reverse();
    Ok(months)
}

#[cfg(test)]
mod monthly_budget_status_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        budget::set_budget,
        category::{Category, CategoryName, archive_category, create_category},
        db::initialize,
        month::Month,
        owner::OwnerId,
        transaction::{Transaction, create_transaction},
    };

    use super::monthly_budget_status;

    const OWNER: OwnerId = OwnerId::new(1);

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn create_test_category(name: &str, connection: &Connection) -> Category {
        create_category(CategoryName::new_unchecked(name), "#111111", OWNER, connection)
            .expect("Could not create test category")
    }

    #[test]
    fn pairs_budgets_with_monthly_spend() {
        let conn = get_test_connection();
        let groceries = create_test_category("Groceries", &conn);
        let month = Month::parse("2024-03").unwrap();
        set_budget(groceries.id, month, 100.0, OWNER, &conn).unwrap();

        for (amount, date, description) in [
            (-50.0, date!(2024 - 03 - 05), "veges"),
            (-30.0, date!(2024 - 03 - 20), "meat"),
            // Outside the month, must not count.
            (-25.0, date!(2024 - 04 - 01), "april"),
            // Income in the category, must not count.
            (20.0, date!(2024 - 03 - 21), "refund"),
        ] {
            create_transaction(
                Transaction::build(amount, date, description).category_id(Some(groceries.id)),
                OWNER,
                &conn,
            )
            .unwrap();
        }

        let report = monthly_budget_status(month, OWNER, &conn).expect("Could not build report");

        assert_eq!(report.len(), 1);
        let status = &report[0];
        assert_eq!(status.spent, 80.0);
        assert_eq!(status.remaining, 20.0);
        assert_eq!(status.percentage, 80.0);
    }

    #[test]
    fn category_without_budget_reports_zeroes() {
        let conn = get_test_connection();
        let category = create_test_category("Dining", &conn);
        let month = Month::parse("2024-03").unwrap();
        create_transaction(
            Transaction::build(-40.0, date!(2024 - 03 - 10), "kebab")
                .category_id(Some(category.id)),
            OWNER,
            &conn,
        )
        .unwrap();

        let report = monthly_budget_status(month, OWNER, &conn).unwrap();

        assert_eq!(report.len(), 1);
        let status = &report[0];
        assert_eq!(status.budget, None);
        assert_eq!(status.spent, 40.0);
        assert_eq!(status.remaining, 0.0);
        assert_eq!(status.percentage, 0.0);
    }

    #[test]
    fn over_budget_category_reports_negative_remaining() {
        let conn = get_test_connection();
        let category = create_test_category("Dining", &conn);
        let month = Month::parse("2024-03").unwrap();
        set_budget(category.id, month, 50.0, OWNER, &conn).unwrap();
        create_transaction(
            Transaction::build(-75.0, date!(2024 - 03 - 10), "banquet")
                .category_id(Some(category.id)),
            OWNER,
            &conn,
        )
        .unwrap();

        let report = monthly_budget_status(month, OWNER, &conn).unwrap();

        assert_eq!(report[0].remaining, -25.0);
        assert_eq!(report[0].percentage, 150.0);
    }

    #[test]
    fn archived_categories_are_excluded() {
        let conn = get_test_connection();
        let category = create_test_category("Old hobby", &conn);
        archive_category(category.id, OWNER, &conn).unwrap();

        let report =
            monthly_budget_status(Month::parse("2024-03").unwrap(), OWNER, &conn).unwrap();

        assert_eq!(report, []);
    }
}

//! Builds the dashboard summary by reducing the current month's ledger in
//! memory.

use std::collections::{BTreeMap, HashMap};

use rusqlite::Connection;
use time::{Date, Duration};

use crate::{
    Error,
    budget::get_budgets_for_month,
    category::get_all_categories,
    month::Month,
    owner::OwnerId,
    transaction::{
        Transaction, get_recent_transactions, get_transactions_in_range, sum_category_expenses,
    },
};

use super::transaction::{
    UNCATEGORIZED_COLOR, UNCATEGORIZED_LABEL, get_categorized_transactions_in_range,
};

/// How many recent transactions the dashboard shows.
const RECENT_TRANSACTION_COUNT: u32 = 10;

/// How many budget alerts the dashboard shows at most.
const MAX_BUDGET_ALERTS: usize = 10;

/// The trend window for the daily spending series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendPeriod {
    /// The last 7 days.
    Week,
    /// The last 14 days.
    Fortnight,
    /// The last 30 days.
    Month,
    /// The days elapsed in the current month.
    MonthToDate,
}

impl TrendPeriod {
    /// The number of days in the window ending on `today`.
    pub fn days(self, today: Date) -> u32 {
        match self {
            Self::Week => 7,
            Self::Fortnight => 14,
            Self::Month => 30,
            Self::MonthToDate => u32::from(today.day()),
        }
    }
}

/// Month-to-date spending for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySpend {
    /// The category name, or [UNCATEGORIZED_LABEL].
    pub name: String,
    /// The category's chart color, or [UNCATEGORIZED_COLOR].
    pub color: String,
    /// Total spent this month (sum of absolute expense amounts).
    pub amount: f64,
}

/// Spending on a single day of the trend window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailySpend {
    /// The day.
    pub date: Date,
    /// Total spent that day; zero for days with no spending.
    pub amount: f64,
}

/// A budgeted category surfaced on the dashboard because its spend ratio is
/// high or its absolute spend is large.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetAlert {
    /// The budgeted category's name.
    pub category_name: String,
    /// The budgeted category's chart color.
    pub category_color: String,
    /// The budgeted amount for the current month.
    pub budget_amount: f64,
    /// Spend so far this month.
    pub spent: f64,
    /// Spend as a percentage of the budget.
    pub percentage: f64,
}

/// The display band a budget alert falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertBand {
    /// Below 80% of budget.
    Ok,
    /// At or above 80%, below 100%.
    Approaching,
    /// At or above 100%.
    Over,
}

impl AlertBand {
    /// Classify a budget utilization percentage.
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 100.0 {
            Self::Over
        } else if percentage >= 80.0 {
            Self::Approaching
        } else {
            Self::Ok
        }
    }
}

impl BudgetAlert {
    /// The display band this alert falls into.
    pub fn band(&self) -> AlertBand {
        AlertBand::from_percentage(self.percentage)
    }
}

/// Everything the dashboard shows, computed from one ledger snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    /// Income for the current month.
    pub income: f64,
    /// Expenses for the current month (as a positive number).
    pub expenses: f64,
    /// `income - expenses`.
    pub net: f64,
    /// Month-to-date spending per category, highest first.
    pub spending_by_category: Vec<CategorySpend>,
    /// Daily spending over the trend window, oldest day first, zero-filled.
    pub spending_trend: Vec<DailySpend>,
    /// The most recent transactions, newest first.
    pub recent_transactions: Vec<Transaction>,
    /// Budgeted categories worth attention: every category at 80% or more
    /// of budget, then the top spenders, deduplicated and capped.
    pub budget_alerts: Vec<BudgetAlert>,
}

/// Compute the dashboard summary for the month containing `today`.
///
/// Pure read-reduce: given the same ledger snapshot this is idempotent, and
/// the per-budget spend queries are order-independent.
///
/// # Errors
///
/// Returns [Error::SqlError] if any of the underlying queries fail.
pub fn dashboard_summary(
    trend_period: TrendPeriod,
    today: Date,
    owner: OwnerId,
    connection: &Connection,
) -> Result<DashboardSummary, Error> {
    let month = Month::containing(today);
    let month_transactions = get_categorized_transactions_in_range(
        owner,
        month.first_day(),
        month.last_day(),
        connection,
    )?;

    let income: f64 = month_transactions
        .iter()
        .filter(|transaction| transaction.is_income)
        .map(|transaction| transaction.amount)
        .sum();
    let expenses: f64 = month_transactions
        .iter()
        .filter(|transaction| !transaction.is_income)
        .map(|transaction| transaction.amount.abs())
        .sum();

    let spending_by_category = rank_category_spending(&month_transactions);
    let spending_trend = daily_spending(trend_period, today, owner, connection)?;
    let recent_transactions =
        get_recent_transactions(owner, RECENT_TRANSACTION_COUNT, connection)?;
    let budget_alerts = featured_budget_alerts(month, owner, connection)?;

    Ok(DashboardSummary {
        income,
        expenses,
        net: income - expenses,
        spending_by_category,
        spending_trend,
        recent_transactions,
        budget_alerts,
    })
}

/// Sum month-to-date expenses per category and rank them highest first.
fn rank_category_spending(
    transactions: &[super::transaction::CategorizedTransaction],
) -> Vec<CategorySpend> {
    let mut spending: HashMap<String, CategorySpend> = HashMap::new();

    for transaction in transactions.iter().filter(|t| !t.is_income) {
        let name = transaction
            .category_name
            .clone()
            .unwrap_or_else(|| UNCATEGORIZED_LABEL.to_owned());
        let color = transaction
            .category_color
            .clone()
            .unwrap_or_else(|| UNCATEGORIZED_COLOR.to_owned());

        spending
            .entry(name.clone())
            .or_insert(CategorySpend {
                name,
                color,
                amount: 0.0,
            })
            .amount += transaction.amount.abs();
    }

    let mut ranked: Vec<CategorySpend> = spending.into_values().collect();
    ranked.sort_by(|a, b| {
        b.amount
            .total_cmp(&a.amount)
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked
}

/// Build the zero-filled daily spending series for the trend window.
fn daily_spending(
    trend_period: TrendPeriod,
    today: Date,
    owner: OwnerId,
    connection: &Connection,
) -> Result<Vec<DailySpend>, Error> {
    let days = trend_period.days(today);
    let start = today - Duration::days(i64::from(days) - 1);

    let mut totals_by_day: BTreeMap<Date, f64> = BTreeMap::new();
    let mut day = start;
    while day <= today {
        totals_by_day.insert(day, 0.0);
        day = day + Duration::days(1);
    }

    for transaction in get_transactions_in_range(owner, start, today, connection)? {
        if transaction.is_income {
            continue;
        }

        if let Some(total) = totals_by_day.get_mut(&transaction.date) {
            *total += transaction.amount.abs();
        }
    }

    Ok(totals_by_day
        .into_iter()
        .map(|(date, amount)| DailySpend { date, amount })
        .collect())
}

/// Pick the budget alerts worth showing: every budget at 80% utilization or
/// more, then the five highest spenders, deduplicated by category name and
/// capped at [MAX_BUDGET_ALERTS], over-utilized entries first.
fn featured_budget_alerts(
    month: Month,
    owner: OwnerId,
    connection: &Connection,
) -> Result<Vec<BudgetAlert>, Error> {
    let budgets = get_budgets_for_month(month, owner, connection)?;
    let categories = get_all_categories(owner, connection)?;
    let display_by_id: HashMap<i64, (&str, &str)> = categories
        .iter()
        .map(|category| {
            (
                category.id,
                (category.name.as_ref(), category.color.as_str()),
            )
        })
        .collect();

    let start = month.first_day();
    let end = month.last_day();

    let mut alerts = Vec::with_capacity(budgets.len());
    for budget in &budgets {
        let Some((name, color)) = display_by_id.get(&budget.category_id) else {
            // A budget whose category vanished has nothing to display.
            continue;
        };

        let spent = sum_category_expenses(budget.category_id, start, end, owner, connection)?;

        alerts.push(BudgetAlert {
            category_name: (*name).to_owned(),
            category_color: (*color).to_owned(),
            budget_amount: budget.amount,
            spent,
            percentage: spent / budget.amount * 100.0,
        });
    }

    alerts.sort_by(|a, b| b.spent.total_cmp(&a.spent));
    let top_spenders: Vec<BudgetAlert> = alerts.iter().take(5).cloned().collect();
    let over_threshold: Vec<BudgetAlert> = alerts
        .iter()
        .filter(|alert| alert.percentage >= 80.0 && !top_spenders.contains(alert))
        .cloned()
        .collect();

    let mut featured: Vec<BudgetAlert> = Vec::new();
    for alert in over_threshold.into_iter().chain(top_spenders) {
        if featured
            .iter()
            .all(|existing| existing.category_name != alert.category_name)
        {
            featured.push(alert);
        }
    }
    featured.truncate(MAX_BUDGET_ALERTS);

    Ok(featured)
}


#[cfg(test)]
mod dashboard_summary_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        budget::set_budget,
        category::{Category, CategoryName, create_category},
        dashboard::{AlertBand, UNCATEGORIZED_LABEL},
        db::initialize,
        month::Month,
        owner::OwnerId,
        transaction::{Transaction, create_transaction},
    };

    use super::{TrendPeriod, dashboard_summary};

    const OWNER: OwnerId = OwnerId::new(1);
    const TODAY: time::Date = date!(2024 - 03 - 15);

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
    fn summary_totals_cover_the_current_month() {
        let conn = get_test_connection();
        for (amount, date, description) in [
            (2000.0, date!(2024 - 03 - 01), "Salary"),
            (-600.0, date!(2024 - 03 - 02), "Rent"),
            (-150.0, date!(2024 - 03 - 10), "Groceries"),
            // Outside the current month, must not count.
            (-999.0, date!(2024 - 02 - 28), "Old rent"),
        ] {
            create_transaction(Transaction::build(amount, date, description), OWNER, &conn)
                .unwrap();
        }

        let summary = dashboard_summary(TrendPeriod::Week, TODAY, OWNER, &conn)
            .expect("Could not build summary");

        assert_eq!(summary.income, 2000.0);
        assert_eq!(summary.expenses, 750.0);
        assert_eq!(summary.net, 1250.0);
    }

    #[test]
    fn category_spending_is_ranked_descending() {
        let conn = get_test_connection();
        let groceries = create_test_category("Groceries", &conn);
        let dining = create_test_category("Dining", &conn);

        for (amount, category_id, description) in [
            (-40.0, Some(dining.id), "Kebab"),
            (-120.0, Some(groceries.id), "Supermarket"),
            (-10.0, None, "Mystery"),
        ] {
            create_transaction(
                Transaction::build(amount, date!(2024 - 03 - 10), description)
                    .category_id(category_id),
                OWNER,
                &conn,
            )
            .unwrap();
        }

        let summary = dashboard_summary(TrendPeriod::Week, TODAY, OWNER, &conn).unwrap();

        let names: Vec<&str> = summary
            .spending_by_category
            .iter()
            .map(|spend| spend.name.as_str())
            .collect();
        assert_eq!(names, ["Groceries", "Dining", UNCATEGORIZED_LABEL]);
        assert_eq!(summary.spending_by_category[0].amount, 120.0);
    }

    #[test]
    fn trend_is_zero_filled_and_chronological() {
        let conn = get_test_connection();
        create_transaction(
            Transaction::build(-30.0, date!(2024 - 03 - 14), "Yesterday"),
            OWNER,
            &conn,
        )
        .unwrap();
        create_transaction(
            Transaction::build(-20.0, date!(2024 - 03 - 15), "Today"),
            OWNER,
            &conn,
        )
        .unwrap();
        // Income on a trend day must not appear as spending.
        create_transaction(
            Transaction::build(500.0, date!(2024 - 03 - 15), "Refund"),
            OWNER,
            &conn,
        )
        .unwrap();

        let summary = dashboard_summary(TrendPeriod::Week, TODAY, OWNER, &conn).unwrap();

        assert_eq!(summary.spending_trend.len(), 7);
        assert_eq!(summary.spending_trend[0].date, date!(2024 - 03 - 09));
        assert_eq!(summary.spending_trend[6].date, date!(2024 - 03 - 15));
        let amounts: Vec<f64> = summary
            .spending_trend
            .iter()
            .map(|day| day.amount)
            .collect();
        assert_eq!(amounts, [0.0, 0.0, 0.0, 0.0, 0.0, 30.0, 20.0]);
    }

    #[test]
    fn month_to_date_trend_starts_on_the_first() {
        let conn = get_test_connection();

        let summary =
            dashboard_summary(TrendPeriod::MonthToDate, TODAY, OWNER, &conn).unwrap();

        assert_eq!(summary.spending_trend.len(), 15);
        assert_eq!(summary.spending_trend[0].date, date!(2024 - 03 - 01));
        assert_eq!(summary.spending_trend[14].date, TODAY);
    }

    #[test]
    fn recent_transactions_are_capped_at_ten() {
        let conn = get_test_connection();
        for i in 1..=12 {
            create_transaction(
                Transaction::build(-(i as f64), date!(2024 - 03 - 10), &format!("t{i}")),
                OWNER,
                &conn,
            )
            .unwrap();
        }

        let summary = dashboard_summary(TrendPeriod::Week, TODAY, OWNER, &conn).unwrap();

        assert_eq!(summary.recent_transactions.len(), 10);
        assert_eq!(summary.recent_transactions[0].description, "t12");
    }

    #[test]
    fn budget_at_eighty_percent_is_an_approaching_alert() {
        let conn = get_test_connection();
        let groceries = create_test_category("Groceries", &conn);
        let month = Month::containing(TODAY);
        set_budget(groceries.id, month, 100.0, OWNER, &conn).unwrap();
        create_transaction(
            Transaction::build(-80.0, date!(2024 - 03 - 10), "Supermarket")
                .category_id(Some(groceries.id)),
            OWNER,
            &conn,
        )
        .unwrap();

        let summary = dashboard_summary(TrendPeriod::Week, TODAY, OWNER, &conn).unwrap();

        assert_eq!(summary.budget_alerts.len(), 1);
        let alert = &summary.budget_alerts[0];
        assert_eq!(alert.percentage, 80.0);
        assert_eq!(alert.band(), AlertBand::Approaching);
    }

    #[test]
    fn budget_fully_spent_is_an_over_alert() {
        let conn = get_test_connection();
        let groceries = create_test_category("Groceries", &conn);
        let month = Month::containing(TODAY);
        set_budget(groceries.id, month, 100.0, OWNER, &conn).unwrap();
        create_transaction(
            Transaction::build(-100.0, date!(2024 - 03 - 10), "Supermarket")
                .category_id(Some(groceries.id)),
            OWNER,
            &conn,
        )
        .unwrap();

        let summary = dashboard_summary(TrendPeriod::Week, TODAY, OWNER, &conn).unwrap();

        assert_eq!(summary.budget_alerts[0].band(), AlertBand::Over);
    }

    #[test]
    fn over_threshold_alerts_rank_ahead_of_big_spenders() {
        let conn = get_test_connection();
        let month = Month::containing(TODAY);

        // Six categories with large budgets and large spend, all under 80%.
        for i in 0..6 {
            let category = create_test_category(&format!("Big {i}"), &conn);
            set_budget(category.id, month, 10_000.0, OWNER, &conn).unwrap();
            create_transaction(
                Transaction::build(-(1000.0 + i as f64), date!(2024 - 03 - 05), &format!("big {i}"))
                    .category_id(Some(category.id)),
                OWNER,
                &conn,
            )
            .unwrap();
        }

        // A small category at 90% utilization.
        let hot = create_test_category("Hot", &conn);
        set_budget(hot.id, month, 100.0, OWNER, &conn).unwrap();
        create_transaction(
            Transaction::build(-90.0, date!(2024 - 03 - 06), "hot spend")
                .category_id(Some(hot.id)),
            OWNER,
            &conn,
        )
        .unwrap();

        let summary = dashboard_summary(TrendPeriod::Week, TODAY, OWNER, &conn).unwrap();

        // The 90% category leads despite having the smallest spend, followed
        // by the five biggest spenders; no duplicates.
        assert_eq!(summary.budget_alerts[0].category_name, "Hot");
        assert_eq!(summary.budget_alerts.len(), 6);
        assert_eq!(summary.budget_alerts[1].category_name, "Big 5");
    }

    #[test]
    fn empty_ledger_produces_an_empty_summary() {
        let conn = get_test_connection();

        let summary = dashboard_summary(TrendPeriod::Week, TODAY, OWNER, &conn).unwrap();

        assert_eq!(summary.income, 0.0);
        assert_eq!(summary.expenses, 0.0);
        assert_eq!(summary.net, 0.0);
        assert_eq!(summary.spending_by_category, []);
        assert_eq!(summary.recent_transactions, []);
        assert_eq!(summary.budget_alerts, []);
        // The trend is still zero-filled for the full window.
        assert_eq!(summary.spending_trend.len(), 7);
        assert!(summary.spending_trend.iter().all(|day| day.amount == 0.0));
    }
}

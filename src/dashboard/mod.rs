//! The dashboard summary: month-to-date totals, category spending,
//! the daily spend trend, and budget alerts.

mod summary;
mod transaction;

pub use summary::{
    AlertBand, BudgetAlert, CategorySpend, DailySpend, DashboardSummary, TrendPeriod,
    dashboard_summary,
};
pub use transaction::{UNCATEGORIZED_COLOR, UNCATEGORIZED_LABEL};

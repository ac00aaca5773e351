//! The ledgerly command line interface.

use std::{fs, path::PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use rusqlite::Connection;
use time::OffsetDateTime;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use ledgerly::{
    Error, Month, OwnerId,
    account::{create_account, get_accounts},
    budget::{available_months, delete_budget, monthly_budget_status, set_budget},
    category::{
        CategoryName, create_category, ensure_default_categories, get_categories_with_stats,
        merge_categories,
    },
    csv_import::{
        ColumnMapping, auto_detect_columns, get_mapping_presets, import_transactions, map_rows,
        save_mapping_preset, tokenize, validate_file, validate_row_count,
    },
    dashboard::{AlertBand, TrendPeriod, dashboard_summary},
    import_batch::get_import_batches,
    initialize_db, resolve_owner,
};

/// Import bank CSV exports into a normalized ledger and report on it.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// File path to the application SQLite database.
    #[arg(long, global = true, default_value = "ledgerly.db")]
    db_path: String,

    /// The owner identity to operate as. Falls back to the LEDGERLY_OWNER
    /// environment variable.
    #[arg(long, global = true)]
    owner: Option<i64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a CSV bank export into the ledger.
    Import {
        /// The CSV file to import.
        file: PathBuf,

        /// Override the detected column mapping, e.g.
        /// "date=0,description=1,amount=2,category=3".
        #[arg(long)]
        mapping: Option<String>,

        /// Use a saved mapping preset instead of auto-detection.
        #[arg(long, conflicts_with = "mapping")]
        preset: Option<String>,

        /// Save the mapping used for this import under a preset name.
        #[arg(long)]
        save_preset: Option<String>,

        /// Category ID applied to rows whose category cannot be resolved.
        #[arg(long)]
        default_category: Option<i64>,

        /// Account ID every imported row is attached to.
        #[arg(long)]
        account: Option<i64>,
    },

    /// Show the dashboard summary for the current month.
    Dashboard {
        /// The window for the daily spending trend.
        #[arg(long, value_enum, default_value = "week")]
        trend: TrendArg,
    },

    /// Show budget-vs-actual for every active category in a month.
    Budgets {
        /// The month to report on, e.g. 2024-03. Defaults to the current
        /// month.
        #[arg(long)]
        month: Option<String>,
    },

    /// Set the budget for a category and month.
    SetBudget {
        /// The category the budget applies to.
        #[arg(long)]
        category: i64,

        /// The month the budget applies to, e.g. 2024-03.
        #[arg(long)]
        month: String,

        /// The budgeted amount.
        #[arg(long)]
        amount: f64,
    },

    /// Remove the budget for a category and month.
    RemoveBudget {
        /// The category the budget applies to.
        #[arg(long)]
        category: i64,

        /// The month the budget applies to, e.g. 2024-03.
        #[arg(long)]
        month: String,
    },

    /// List the months available for budgeting, most recent first.
    Months,

    /// List categories with all-time spending statistics.
    Categories {
        /// Include archived categories.
        #[arg(long)]
        include_archived: bool,
    },

    /// Create a new category.
    AddCategory {
        /// The category name.
        name: String,

        /// Hex color used when charting the category.
        #[arg(long, default_value = "#6B7280")]
        color: String,
    },

    /// Merge one category into another and delete the source.
    MergeCategories {
        /// The category to merge away.
        #[arg(long)]
        from: i64,

        /// The category that receives the transactions.
        #[arg(long)]
        to: i64,
    },

    /// List accounts.
    Accounts,

    /// Create a new account.
    AddAccount {
        /// The account name.
        name: String,

        /// The bank or institution the account is held with.
        #[arg(long)]
        institution: Option<String>,
    },

    /// List saved column mapping presets.
    Presets,

    /// Show the import history.
    History,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TrendArg {
    /// The last 7 days.
    Week,
    /// The last 14 days.
    Fortnight,
    /// The last 30 days.
    Month,
    /// The days elapsed in the current month.
    MonthToDate,
}

impl From<TrendArg> for TrendPeriod {
    fn from(value: TrendArg) -> Self {
        match value {
            TrendArg::Week => TrendPeriod::Week,
            TrendArg::Fortnight => TrendPeriod::Fortnight,
            TrendArg::Month => TrendPeriod::Month,
            TrendArg::MonthToDate => TrendPeriod::MonthToDate,
        }
    }
}

fn main() {
    setup_logging();

    let cli = Cli::parse();

    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().pretty().with_filter(filter))
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let owner = resolve_owner(cli.owner)?;

    let connection = Connection::open(&cli.db_path)?;
    initialize_db(&connection)?;
    ensure_default_categories(owner, &connection)?;

    let today = OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date();

    match cli.command {
        Command::Import {
            file,
            mapping,
            preset,
            save_preset,
            default_category,
            account,
        } => {
            let filename = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.display().to_string());
            let size_bytes = fs::metadata(&file)?.len();
            validate_file(&filename, size_bytes)?;

            let content = fs::read_to_string(&file)?;
            validate_row_count(&content)?;

            let csv = tokenize(&content)?;

            let column_mapping = match (&preset, &mapping) {
                (Some(preset_name), _) => find_preset(preset_name, owner, &connection)?,
                (None, Some(overrides)) => {
                    apply_mapping_overrides(auto_detect_columns(&csv.headers), overrides)?
                }
                (None, None) => auto_detect_columns(&csv.headers),
            };

            if !column_mapping.is_usable() {
                return Err(Error::MappingIncomplete.into());
            }

            let candidates = map_rows(&csv.rows, &column_mapping);

            if candidates.is_empty() {
                println!("No valid transactions found in {filename}.");
                return Ok(());
            }

            let outcome = import_transactions(
                &candidates,
                default_category,
                account,
                &filename,
                owner,
                &connection,
            )?;

            if let Some(preset_name) = save_preset {
                save_mapping_preset(&preset_name, &column_mapping, owner, &connection)?;
                println!("Saved mapping preset '{preset_name}'.");
            }

            println!(
                "Imported {} transactions from {filename} ({} duplicates skipped).",
                outcome.imported, outcome.duplicates
            );
        }

        Command::Dashboard { trend } => {
            let summary = dashboard_summary(trend.into(), today, owner, &connection)?;

            println!("This month");
            println!("  income:   {:>12.2}", summary.income);
            println!("  expenses: {:>12.2}", summary.expenses);
            println!("  net:      {:>12.2}", summary.net);

            if !summary.spending_by_category.is_empty() {
                println!("\nSpending by category");
                for spend in &summary.spending_by_category {
                    println!("  {:<24} {:>12.2}", spend.name, spend.amount);
                }
            }

            println!("\nDaily spending");
            for day in &summary.spending_trend {
                println!("  {} {:>12.2}", day.date, day.amount);
            }

            if !summary.budget_alerts.is_empty() {
                println!("\nBudget alerts");
                for alert in &summary.budget_alerts {
                    let band = match alert.band() {
                        AlertBand::Over => "OVER",
                        AlertBand::Approaching => "WARN",
                        AlertBand::Ok => "ok",
                    };
                    println!(
                        "  [{band:>4}] {:<24} {:>10.2} of {:>10.2} ({:.0}%)",
                        alert.category_name, alert.spent, alert.budget_amount, alert.percentage
                    );
                }
            }

            if !summary.recent_transactions.is_empty() {
                println!("\nRecent transactions");
                for transaction in &summary.recent_transactions {
                    println!(
                        "  {} {:<32} {:>12.2}",
                        transaction.date, transaction.description, transaction.amount
                    );
                }
            }
        }

        Command::Budgets { month } => {
            let month = match month {
                Some(raw) => Month::parse(&raw)?,
                None => Month::containing(today),
            };

            let report = monthly_budget_status(month, owner, &connection)?;

            println!("Budgets for {}", month.label());
            for status in &report {
                match &status.budget {
                    Some(budget) => println!(
                        "  {:<24} {:>10.2} of {:>10.2} ({:.0}%), {:.2} remaining",
                        status.category.name.as_ref(),
                        status.spent,
                        budget.amount,
                        status.percentage,
                        status.remaining
                    ),
                    None => println!(
                        "  {:<24} {:>10.2} (no budget)",
                        status.category.name.as_ref(),
                        status.spent
                    ),
                }
            }
        }

        Command::SetBudget {
            category,
            month,
            amount,
        } => {
            let month = Month::parse(&month)?;
            let budget = set_budget(category, month, amount, owner, &connection)?;
            println!(
                "Budget for category {} in {} set to {:.2}.",
                budget.category_id, budget.month, budget.amount
            );
        }

        Command::RemoveBudget { category, month } => {
            let month = Month::parse(&month)?;
            delete_budget(category, month, owner, &connection)?;
            println!("Budget removed.");
        }

        Command::Months => {
            for month in available_months(today, owner, &connection)? {
                println!("{}  {}", month.value, month.label);
            }
        }

        Command::Categories { include_archived } => {
            let stats = get_categories_with_stats(include_archived, owner, &connection)?;

            for entry in &stats {
                let mut flags = String::new();
                if entry.category.is_system {
                    flags.push_str(" [system]");
                }
                if entry.category.archived {
                    flags.push_str(" [archived]");
                }
                println!(
                    "  {:>4} {:<24} {:>12.2} spent across {} transactions{flags}",
                    entry.category.id,
                    entry.category.name.as_ref(),
                    entry.total_spent,
                    entry.transaction_count
                );
            }
        }

        Command::AddCategory { name, color } => {
            let category =
                create_category(CategoryName::new(&name)?, &color, owner, &connection)?;
            println!("Created category {} ({}).", category.name, category.id);
        }

        Command::MergeCategories { from, to } => {
            merge_categories(from, to, owner, &connection)?;
            println!("Merged category {from} into {to}.");
        }

        Command::Accounts => {
            for account in get_accounts(owner, &connection)? {
                match &account.institution {
                    Some(institution) => {
                        println!("  {:>4} {} ({institution})", account.id, account.name)
                    }
                    None => println!("  {:>4} {}", account.id, account.name),
                }
            }
        }

        Command::AddAccount { name, institution } => {
            let account =
                create_account(&name, institution.as_deref(), owner, &connection)?;
            println!("Created account {} ({}).", account.name, account.id);
        }

        Command::Presets => {
            for preset in get_mapping_presets(owner, &connection)? {
                println!("  {:>4} {:<24} {:?}", preset.id, preset.name, preset.mapping);
            }
        }

        Command::History => {
            for batch in get_import_batches(owner, &connection)? {
                println!(
                    "  {} {:<32} {} rows, {} imported, {} duplicates",
                    batch.imported_at.date(),
                    batch.filename,
                    batch.row_count,
                    batch.success_count,
                    batch.error_count
                );
            }
        }
    }

    Ok(())
}

/// Look up a saved mapping preset by name.
fn find_preset(
    name: &str,
    owner: OwnerId,
    connection: &Connection,
) -> Result<ColumnMapping, Error> {
    get_mapping_presets(owner, connection)?
        .into_iter()
        .find(|preset| preset.name == name)
        .map(|preset| preset.mapping)
        .ok_or(Error::NotFound)
}

/// Apply "field=index" overrides to a detected mapping.
///
/// Accepts a comma-separated list such as `date=0,description=1,amount=2`;
/// an index of `none` clears the field.
fn apply_mapping_overrides(
    mut mapping: ColumnMapping,
    overrides: &str,
) -> Result<ColumnMapping, Error> {
    for pair in overrides.split(',') {
        let (field, raw_index) = pair
            .split_once('=')
            .ok_or(Error::MappingIncomplete)?;

        let index = match raw_index.trim() {
            "none" => None,
            raw => Some(
                raw.parse::<usize>()
                    .map_err(|_| Error::MappingIncomplete)?,
            ),
        };

        match field.trim() {
            "date" => mapping.date = index,
            "description" => mapping.description = index,
            "amount" => mapping.amount = index,
            "category" => mapping.category = index,
            "account" => mapping.account = index,
            "balance" => mapping.balance = index,
            _ => return Err(Error::MappingIncomplete),
        }
    }

    Ok(mapping)
}

#[cfg(test)]
mod apply_mapping_overrides_tests {
    use ledgerly::{Error, csv_import::ColumnMapping};

    use super::apply_mapping_overrides;

    #[test]
    fn overrides_replace_detected_fields() {
        let detected = ColumnMapping {
            date: Some(0),
            description: Some(1),
            amount: Some(2),
            ..ColumnMapping::default()
        };

        let mapping = apply_mapping_overrides(detected, "amount=5,category=3")
            .expect("Could not apply overrides");

        assert_eq!(mapping.date, Some(0));
        assert_eq!(mapping.amount, Some(5));
        assert_eq!(mapping.category, Some(3));
    }

    #[test]
    fn none_clears_a_field() {
        let detected = ColumnMapping {
            date: Some(0),
            description: Some(1),
            amount: Some(2),
            balance: Some(4),
            ..ColumnMapping::default()
        };

        let mapping =
            apply_mapping_overrides(detected, "balance=none").expect("Could not apply override");

        assert_eq!(mapping.balance, None);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = apply_mapping_overrides(ColumnMapping::default(), "flavour=1");

        assert_eq!(result, Err(Error::MappingIncomplete));
    }

    #[test]
    fn malformed_pairs_are_rejected() {
        let result = apply_mapping_overrides(ColumnMapping::default(), "date");

        assert_eq!(result, Err(Error::MappingIncomplete));
    }
}

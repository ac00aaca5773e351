//! Guesses which CSV column holds which transaction field from the header
//! names.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// The assignment of logical transaction fields to source CSV column
/// positions.
///
/// `date`, `description`, and `amount` are required for a mapping to be
/// usable; the rest are optional extras. A mapping usually starts from
/// [auto_detect_columns] and may be overridden field-by-field before the
/// import is committed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Column holding the transaction date.
    pub date: Option<usize>,
    /// Column holding the transaction description.
    pub description: Option<usize>,
    /// Column holding the signed amount.
    pub amount: Option<usize>,
    /// Column holding a category name, if the bank provides one.
    pub category: Option<usize>,
    /// Column holding an account identifier.
    pub account: Option<usize>,
    /// Column holding a running balance. Parsed but unused by the mapper.
    pub balance: Option<usize>,
}

impl ColumnMapping {
    /// Whether the mapping assigns all three required fields.
    pub fn is_usable(&self) -> bool {
        self.date.is_some() && self.description.is_some() && self.amount.is_some()
    }
}

static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("(?i)date|posted|transaction.*date").expect("hard-coded pattern compiles")
});
static DESCRIPTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("(?i)description|memo|details|merchant|payee").expect("hard-coded pattern compiles")
});
static AMOUNT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("(?i)amount|value|sum|debit|credit").expect("hard-coded pattern compiles")
});
static CATEGORY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("(?i)category|type|class").expect("hard-coded pattern compiles")
});
static ACCOUNT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("(?i)account").expect("hard-coded pattern compiles"));
static BALANCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("(?i)balance").expect("hard-coded pattern compiles"));

/// Guess a column mapping from the header names.
///
/// Each field independently claims the first header whose lowercased,
/// trimmed text matches its pattern set; once claimed, a field is never
/// reassigned. Fields do not exclude each other, so one header may satisfy
/// several fields (e.g. "Account Balance" is claimed by both the account
/// and balance fields).
///
/// The result is advisory: callers must allow a full override before the
/// mapping is used for an import.
pub fn auto_detect_columns(headers: &[String]) -> ColumnMapping {
    let mut mapping = ColumnMapping::default();

    for (index, header) in headers.iter().enumerate() {
        let clean_header = header.trim().to_lowercase();

        claim(&mut mapping.date, &DATE_PATTERN, &clean_header, index);
        claim(
            &mut mapping.description,
            &DESCRIPTION_PATTERN,
            &clean_header,
            index,
        );
        claim(&mut mapping.amount, &AMOUNT_PATTERN, &clean_header, index);
        claim(
            &mut mapping.category,
            &CATEGORY_PATTERN,
            &clean_header,
            index,
        );
        claim(&mut mapping.account, &ACCOUNT_PATTERN, &clean_header, index);
        claim(&mut mapping.balance, &BALANCE_PATTERN, &clean_header, index);
    }

    mapping
}

fn claim(slot: &mut Option<usize>, pattern: &Regex, header: &str, index: usize) {
    if slot.is_none() && pattern.is_match(header) {
        *slot = Some(index);
    }
}

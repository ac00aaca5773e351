//! Pure normalizers for the fields of a CSV transaction row: dates,
//! amounts, the income flag, and the deduplication digest.

use sha2::{Digest, Sha256};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

/// The date shapes accepted by [parse_date], tried in order.
///
/// Slash dates are read month-first (`03/04/2024` is March 4th). Day-first
/// regional formats cannot be told apart from month-first ones by shape
/// alone, so no attempt is made to disambiguate them.
const DATE_FORMATS: &[&[BorrowedFormatItem]] = &[
    format_description!("[year]-[month padding:none]-[day padding:none]"),
    format_description!("[month padding:none]/[day padding:none]/[year]"),
    format_description!("[year]/[month padding:none]/[day padding:none]"),
    format_description!("[day padding:none] [month repr:short] [year]"),
    format_description!("[day padding:none]-[month repr:short]-[year]"),
    format_description!("[month repr:long] [day padding:none], [year]"),
];

/// Parse a raw date string to a calendar date.
///
/// Accepts `YYYY-MM-DD`, `MM/DD/YYYY`, and a handful of other shapes banks
/// commonly export; month and day may be one or two digits. Any time-of-day
/// component is unsupported: the output is calendar date granularity only.
///
/// Returns `None` for anything unparseable.
pub fn parse_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();

    if raw.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| Date::parse(raw, format).ok())
}

/// Parse a raw amount string to a signed number.
///
/// Currency symbols (`$€£¥`), thousands separators, and whitespace are
/// stripped. Amounts wrapped in parentheses follow the accounting
/// convention for negative values, so `(45.00)` parses to `-45.0`.
///
/// Returns `None` for empty input or anything that is not a number after
/// cleaning.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let is_parenthesized = raw.contains('(') && raw.contains(')');

    let cleaned: String = raw
        .chars()
        .filter(|character| {
            !matches!(character, '$' | '€' | '£' | '¥' | ',' | '(' | ')')
                && !character.is_whitespace()
        })
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    let amount: f64 = cleaned.parse().ok()?;

    if is_parenthesized {
        Some(-amount.abs())
    } else {
        Some(amount)
    }
}

/// Whether an amount counts as income.
///
/// Strictly greater than zero: a zero-amount transaction is an expense.
pub fn is_income(amount: f64) -> bool {
    amount > 0.0
}

/// Compute the deduplication digest for a transaction.
///
/// The digest is the lowercase hex SHA-256 of `date|description|amount`,
/// with the date in `YYYY-MM-DD` form and the amount rendered from its
/// parsed numeric value (`45`, not `45.00`). Two rows with the same digest
/// under the same owner are the same transaction, regardless of which
/// import they arrived in.
///
/// Category and account are deliberately excluded: the same content
/// imported against two different accounts collapses to one ledger row.
/// That is current product behavior, pending sign-off, and must not be
/// changed here silently.
pub fn transaction_hash(date: Date, description: &str, amount: f64) -> String {
    let payload = format!("{date}|{description}|{amount}");

    format!("{:x}", Sha256::digest(payload.as_bytes()))
}


#[cfg(test)]
mod parse_amount_tests {
    use super::parse_amount;

    #[test]
    fn plain_numbers_parse() {
        assert_eq!(parse_amount("45.00"), Some(45.0));
        assert_eq!(parse_amount("-45.00"), Some(-45.0));
        assert_eq!(parse_amount("0"), Some(0.0));
    }

    #[test]
    fn currency_symbols_and_separators_are_stripped() {
        assert_eq!(parse_amount("$1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("€ 99.99"), Some(99.99));
        assert_eq!(parse_amount("£1,000"), Some(1000.0));
        assert_eq!(parse_amount("¥1,000,000"), Some(1_000_000.0));
    }

    #[test]
    fn parenthesized_amounts_are_negative() {
        assert_eq!(parse_amount("(45.00)"), Some(-45.0));
        assert_eq!(parse_amount("($1,234.56)"), Some(-1234.56));
    }

    #[test]
    fn empty_input_is_none() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("   "), None);
        assert_eq!(parse_amount("()"), None);
    }

    #[test]
    fn non_numeric_input_is_none() {
        assert_eq!(parse_amount("N/A"), None);
        assert_eq!(parse_amount("12.34.56"), None);
        assert_eq!(parse_amount("abc"), None);
    }
}

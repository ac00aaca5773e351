//! Applies a column mapping and the field normalizers to raw CSV rows,
//! producing transaction candidates ready for the import committer.

use time::Date;

use super::{
    detect::ColumnMapping,
    normalize::{is_income, parse_amount, parse_date, transaction_hash},
};

/// A parsed-but-not-yet-committed transaction produced by the row mapper.
///
/// Candidates are immutable once produced and are consumed exactly once by
/// the import committer.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionCandidate {
    /// The normalized transaction date.
    pub date: Date,
    /// The trimmed description text.
    pub description: String,
    /// The signed amount.
    pub amount: f64,
    /// Whether the amount is income. Always equal to `amount > 0`.
    pub is_income: bool,
    /// The category text from the source file, if a category column was
    /// mapped and non-empty.
    pub category: Option<String>,
    /// The account text from the source file, if an account column was
    /// mapped and non-empty.
    pub account: Option<String>,
    /// The deduplication digest over date, description, and amount.
    pub hash: String,
}

/// Map raw CSV rows to transaction candidates.
///
/// Rows that fail normalization are silently dropped, never an error: a row
/// is skipped when its date or amount does not parse, or its description is
/// empty after trimming. Indices outside a ragged row read as empty fields.
/// An empty result is a valid outcome the caller must handle.
///
/// Callers should check [ColumnMapping::is_usable] first; if a required
/// field is unmapped this function produces no candidates.
pub fn map_rows(rows: &[Vec<String>], mapping: &ColumnMapping) -> Vec<TransactionCandidate> {
    let (Some(date_column), Some(description_column), Some(amount_column)) =
        (mapping.date, mapping.description, mapping.amount)
    else {
        return Vec::new();
    };

    rows.iter()
        .filter_map(|row| {
            let date = parse_date(field(row, date_column))?;
            let amount = parse_amount(field(row, amount_column))?;
            let description = field(row, description_column).trim();

            if description.is_empty() {
                return None;
            }

            let hash = transaction_hash(date, description, amount);

            Some(TransactionCandidate {
                date,
                description: description.to_owned(),
                amount,
                is_income: is_income(amount),
                category: optional_field(row, mapping.category),
                account: optional_field(row, mapping.account),
                hash,
            })
        })
        .collect()
}

/// Read a required field, treating an out-of-range index as empty.
fn field(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}

/// Read an optional field: `None` when the column is unmapped, out of
/// range, or empty after trimming.
fn optional_field(row: &[String], index: Option<usize>) -> Option<String> {
    index
        .and_then(|index| row.get(index))
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

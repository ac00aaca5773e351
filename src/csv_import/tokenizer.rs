//! Tokenizes raw CSV text into a header row and data rows.

use crate::Error;

/// The tokenized form of a CSV document: one header row plus zero or more
/// data rows.
///
/// Rows are not padded or truncated to the header width. Bank exports
/// routinely have ragged rows, so consumers must index defensively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCsv {
    /// The column headers from the first non-blank line.
    pub headers: Vec<String>,
    /// The data rows, in file order.
    pub rows: Vec<Vec<String>>,
}

/// Tokenize CSV text into headers and data rows.
///
/// Blank lines are dropped, and the first surviving line is treated as the
/// header row. Fields are split on commas outside double quotes; a doubled
/// quote inside a quoted field emits a literal quote; fields are trimmed of
/// surrounding whitespace.
///
/// Line breaks inside quoted fields are not supported: the text is split
/// into lines before quoting is considered, so such a field comes back as
/// two broken rows.
///
/// # Errors
///
/// Returns [Error::EmptyCsv] if `content` has no non-blank lines.
pub fn tokenize(content: &str) -> Result<RawCsv, Error> {
    let mut lines = content.lines().filter(|line| !line.trim().is_empty());

    let Some(header_line) = lines.next() else {
        return Err(Error::EmptyCsv);
    };

    let headers = parse_line(header_line);
    let rows = lines
        .map(parse_line)
        .filter(|row| !row.is_empty())
        .collect();

    Ok(RawCsv { headers, rows })
}

/// Split a single CSV line into fields, respecting double quotes.
fn parse_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    let mut characters = line.chars().peekable();

    while let Some(character) = characters.next() {
        match character {
            '"' if in_quotes && characters.peek() == Some(&'"') => {
                // An escaped quote ("") inside a quoted field.
                current.push('"');
                characters.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_owned());
                current.clear();
            }
            character => current.push(character),
        }
    }

    // The last field has no terminating comma.
    fields.push(current.trim().to_owned());

    fields
}

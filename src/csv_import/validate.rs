//! Resource-usage gates applied before a CSV file is parsed.
//!
//! Both checks are advisory: callers must invoke them before the expensive
//! tokenize/map stages. Neither parses the file semantically.

use crate::Error;

/// The largest accepted upload, in bytes (10 MiB).
pub const MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// The largest accepted number of data rows.
pub const MAX_DATA_ROWS: usize = 50_000;

/// Check a file's size and extension before reading its contents.
///
/// # Errors
///
/// Returns [Error::FileTooLarge] if the file exceeds [MAX_FILE_BYTES], or
/// [Error::NotCsv] if `filename` does not end in `.csv` (case-insensitive).
pub fn validate_file(filename: &str, size_bytes: u64) -> Result<(), Error> {
    if size_bytes > MAX_FILE_BYTES {
        return Err(Error::FileTooLarge(size_bytes));
    }

    if !filename.to_lowercase().ends_with(".csv") {
        return Err(Error::NotCsv);
    }

    Ok(())
}

/// Check the number of data rows before mapping.
///
/// Counts non-blank lines minus one for the header.
///
/// # Errors
///
/// Returns [Error::RowLimitExceeded] if the file has more than
/// [MAX_DATA_ROWS] data rows.
pub fn validate_row_count(content: &str) -> Result<(), Error> {
    let line_count = content.lines().filter(|line| !line.trim().is_empty()).count();
    let data_rows = line_count.saturating_sub(1);

    if data_rows > MAX_DATA_ROWS {
        return Err(Error::RowLimitExceeded(data_rows));
    }

    Ok(())
}

#[cfg(test)]
mod validate_file_tests {
    use crate::Error;

    use super::{MAX_FILE_BYTES, validate_file};

    #[test]
    fn accepts_a_small_csv() {
        assert_eq!(validate_file("statement.csv", 1024), Ok(()));
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert_eq!(validate_file("STATEMENT.CSV", 1024), Ok(()));
        assert_eq!(validate_file("statement.Csv", 1024), Ok(()));
    }

    #[test]
    fn rejects_oversized_files() {
        let size = MAX_FILE_BYTES + 1;

        assert_eq!(
            validate_file("statement.csv", size),
            Err(Error::FileTooLarge(size))
        );
    }

    #[test]
    fn size_limit_is_inclusive() {
        assert_eq!(validate_file("statement.csv", MAX_FILE_BYTES), Ok(()));
    }

    #[test]
    fn rejects_non_csv_extensions() {
        assert_eq!(validate_file("statement.xlsx", 1024), Err(Error::NotCsv));
        assert_eq!(validate_file("statement", 1024), Err(Error::NotCsv));
        assert_eq!(validate_file("statement.csv.txt", 1024), Err(Error::NotCsv));
    }

    #[test]
    fn size_is_checked_before_extension() {
        let size = MAX_FILE_BYTES + 1;

        assert_eq!(
            validate_file("statement.xlsx", size),
            Err(Error::FileTooLarge(size))
        );
    }
}

//! The CSV ingestion pipeline: untrusted bank exports in, normalized
//! transaction candidates out.
//!
//! The pipeline stages, in order: the validation gate ([validate_file],
//! [validate_row_count]), the tokenizer ([tokenize]), column auto-detection
//! ([auto_detect_columns]), the row mapper ([map_rows]), and the dedup/import
//! committer ([import_transactions]). Each stage is a pure function apart
//! from the committer, which talks to the database.

mod commit;
mod detect;
mod mapper;
mod normalize;
mod preset;
mod tokenizer;
mod validate;

pub use commit::{ImportOutcome, import_transactions};
pub use detect::{ColumnMapping, auto_detect_columns};
pub use mapper::{TransactionCandidate, map_rows};
pub use normalize::{is_income, parse_amount, parse_date, transaction_hash};
pub use preset::{
    MappingPreset, create_mapping_preset_table, get_mapping_presets, save_mapping_preset,
};
pub use tokenizer::{RawCsv, tokenize};
pub use validate::{MAX_DATA_ROWS, MAX_FILE_BYTES, validate_file, validate_row_count};

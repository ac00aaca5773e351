//! Commits mapped transaction candidates to the ledger with content-hash
//! deduplication.

use std::collections::HashMap;

use rusqlite::Connection;

use crate::{
    Error,
    account::AccountId,
    category::{CategoryId, get_all_categories},
    import_batch::record_import_batch,
    owner::OwnerId,
};

use super::mapper::TransactionCandidate;

/// The result of committing an import: how many candidates became new
/// ledger rows, and how many collapsed into existing ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Rows inserted into the ledger.
    pub imported: usize,
    /// Rows skipped because a transaction with the same content hash
    /// already existed for this owner.
    pub duplicates: usize,
}

/// Commit transaction candidates to the ledger.
///
/// Per-candidate category resolution: the candidate's free-text category
/// name is matched case-insensitively against the owner's category set
/// (via a lookup table built once per call); an unmatched or absent name
/// falls back to `default_category_id`, or to no category at all. The
/// account is always `default_account_id`; there is no per-row account
/// resolution.
///
/// The insert is idempotent on `(hash, owner)`: re-importing identical
/// content is a no-op that never overwrites user edits to already-imported
/// rows. All inserts happen in one SQL transaction, so a failure part-way
/// leaves no partial import behind and the candidates stay valid for retry.
///
/// An [ImportBatch](crate::import_batch::ImportBatch) audit record is
/// written after the inserts commit; a failure there is logged and does not
/// fail the import.
///
/// # Errors
///
/// Returns [Error::SqlError] if the category lookup, the inserts, or the
/// commit itself fail.
pub fn import_transactions(
    candidates: &[TransactionCandidate],
    default_category_id: Option<CategoryId>,
    default_account_id: Option<AccountId>,
    filename: &str,
    owner: OwnerId,
    connection: &Connection,
) -> Result<ImportOutcome, Error> {
    let categories = get_all_categories(owner, connection)?;
    let category_ids_by_name: HashMap<String, CategoryId> = categories
        .iter()
        .map(|category| (category.name.as_ref().to_lowercase(), category.id))
        .collect();

    let tx = connection.unchecked_transaction()?;
    let mut imported = 0;

    {
        // Prepare the insert statement once for reuse across the batch.
        let mut statement = tx.prepare(
            "INSERT INTO \"transaction\"
             (date, description, amount, is_income, category_id, account_id, original_category, hash, owner_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(hash, owner_id) DO NOTHING
             RETURNING id",
        )?;

        for candidate in candidates {
            let category_id = candidate
                .category
                .as_deref()
                .and_then(|name| category_ids_by_name.get(&name.to_lowercase()).copied())
                .or(default_category_id);

            let inserted = statement.query_row(
                (
                    candidate.date,
                    &candidate.description,
                    candidate.amount,
                    candidate.is_income,
                    category_id,
                    default_account_id,
                    &candidate.category,
                    &candidate.hash,
                    owner.as_i64(),
                ),
                |row| row.get::<_, i64>(0),
            );

            match inserted {
                Ok(_) => imported += 1,
                // The conflict clause swallowed the row: an existing
                // transaction already has this content hash.
                Err(rusqlite::Error::QueryReturnedNoRows) => {}
                Err(error) => return Err(error.into()),
            }
        }
    }

    tx.commit()?;

    let outcome = ImportOutcome {
        imported,
        duplicates: candidates.len() - imported,
    };

    if let Err(error) = record_import_batch(
        filename,
        candidates.len(),
        outcome.imported,
        outcome.duplicates,
        owner,
        connection,
    ) {
        tracing::error!("could not record import batch for '{filename}': {error}");
    }

    Ok(outcome)
}

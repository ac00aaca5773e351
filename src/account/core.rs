use rusqlite::Connection;

use crate::{Error, owner::OwnerId};

/// Database identifier for an account.
pub type AccountId = i64;

/// A bank account or credit card that transactions are imported against.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The id for the account.
    pub id: AccountId,
    /// The name of the account, unique per owner.
    pub name: String,
    /// The bank or institution the account is held with, if known.
    pub institution: Option<String>,
    /// The owner this account belongs to.
    pub owner_id: OwnerId,
}

pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            institution TEXT,
            owner_id INTEGER NOT NULL,
            UNIQUE(owner_id, name)
        )",
        (),
    )?;

    Ok(())
}

/// Create an account and return it with its generated ID.
///
/// # Errors
///
/// Returns [Error::DuplicateAccountName] if the owner already has an
/// account with this name.
pub fn create_account(
    name: &str,
    institution: Option<&str>,
    owner: OwnerId,
    connection: &Connection,
) -> Result<Account, Error> {
    connection
        .execute(
            "INSERT INTO account (name, institution, owner_id) VALUES (?1, ?2, ?3);",
            (name, institution, owner.as_i64()),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateAccountName(name.to_owned()),
            error => error.into(),
        })?;

    let id = connection.last_insert_rowid();

    Ok(Account {
        id,
        name: name.to_owned(),
        institution: institution.map(str::to_owned),
        owner_id: owner,
    })
}

/// Retrieve the owner's accounts ordered by name.
pub fn get_accounts(owner: OwnerId, connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare(
            "SELECT id, name, institution, owner_id FROM account
             WHERE owner_id = :owner_id
             ORDER BY name ASC;",
        )?
        .query_map(&[(":owner_id", &owner.as_i64())], |row| {
            Ok(Account {
                id: row.get(0)?,
                name: row.get(1)?,
                institution: row.get(2)?,
                owner_id: OwnerId::new(row.get(3)?),
            })
        })?
        .map(|maybe_account| maybe_account.map_err(|error| error.into()))
        .collect()
}

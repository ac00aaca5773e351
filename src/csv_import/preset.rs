//! Saved column mappings, reusable across imports.

use rusqlite::{Connection, Row};

use crate::{Error, database_id::DatabaseId, owner::OwnerId};

use super::detect::ColumnMapping;

/// A named, owner-scoped column mapping saved for future imports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingPreset {
    /// The ID of the preset.
    pub id: DatabaseId,
    /// The user-chosen preset name, e.g. "Kiwibank visa".
    pub name: String,
    /// The saved mapping.
    pub mapping: ColumnMapping,
}

/// Save a column mapping under a name for reuse.
///
/// # Errors
///
/// Returns [Error::JsonSerialization] if the mapping cannot be encoded, or
/// [Error::SqlError] on storage failure.
pub fn save_mapping_preset(
    name: &str,
    mapping: &ColumnMapping,
    owner: OwnerId,
    connection: &Connection,
) -> Result<MappingPreset, Error> {
    let mapping_json = serde_json::to_string(mapping)
        .map_err(|error| Error::JsonSerialization(error.to_string()))?;

    connection.execute(
        "INSERT INTO mapping_preset (name, mapping, owner_id) VALUES (?1, ?2, ?3);",
        (name, &mapping_json, owner.as_i64()),
    )?;

    let id = connection.last_insert_rowid();

    Ok(MappingPreset {
        id,
        name: name.to_owned(),
        mapping: *mapping,
    })
}

/// Retrieve the owner's saved mappings, most recently saved first.
pub fn get_mapping_presets(
    owner: OwnerId,
    connection: &Connection,
) -> Result<Vec<MappingPreset>, Error> {
    connection
        .prepare(
            "SELECT id, name, mapping FROM mapping_preset
             WHERE owner_id = :owner_id
             ORDER BY id DESC;",
        )?
        .query_map(&[(":owner_id", &owner.as_i64())], map_row)?
        .map(|maybe_preset| maybe_preset.map_err(Error::SqlError))
        .collect()
}

/// Initialize the mapping preset table.
pub fn create_mapping_preset_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS mapping_preset (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            mapping TEXT NOT NULL,
            owner_id INTEGER NOT NULL
        )",
        (),
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<MappingPreset, rusqlite::Error> {
    let raw_mapping: String = row.get(2)?;
    let mapping = serde_json::from_str(&raw_mapping).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            Box::new(error),
        )
    })?;

    Ok(MappingPreset {
        id: row.get(0)?,
        name: row.get(1)?,
        mapping,
    })
}

#[cfg(test)]
mod mapping_preset_tests {
    use rusqlite::Connection;

    use crate::{csv_import::ColumnMapping, db::initialize, owner::OwnerId};

    use super::{get_mapping_presets, save_mapping_preset};

    const OWNER: OwnerId = OwnerId::new(1);

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn save_and_load_round_trips() {
        let conn = get_test_connection();
        let mapping = ColumnMapping {
            date: Some(0),
            description: Some(2),
            amount: Some(5),
            category: None,
            account: Some(1),
            balance: None,
        };

        let saved = save_mapping_preset("Kiwibank visa", &mapping, OWNER, &conn)
            .expect("Could not save preset");

        let presets = get_mapping_presets(OWNER, &conn).expect("Could not load presets");
        assert_eq!(presets, [saved]);
        assert_eq!(presets[0].mapping, mapping);
    }

    #[test]
    fn presets_are_most_recent_first() {
        let conn = get_test_connection();
        let mapping = ColumnMapping::default();

        save_mapping_preset("first", &mapping, OWNER, &conn).unwrap();
        save_mapping_preset("second", &mapping, OWNER, &conn).unwrap();

        let presets = get_mapping_presets(OWNER, &conn).unwrap();
        let names: Vec<&str> = presets.iter().map(|preset| preset.name.as_str()).collect();
        assert_eq!(names, ["second", "first"]);
    }

    #[test]
    fn presets_are_owner_scoped() {
        let conn = get_test_connection();
        save_mapping_preset("mine", &ColumnMapping::default(), OWNER, &conn).unwrap();

        let presets = get_mapping_presets(OwnerId::new(2), &conn).unwrap();

        assert_eq!(presets, []);
    }
}

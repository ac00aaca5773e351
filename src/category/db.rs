//! Database operations for categories.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    category::{Category, CategoryId, CategoryName, CategoryWithStats, DEFAULT_CATEGORIES},
    owner::OwnerId,
};

/// Create a category and return it with its generated ID.
pub fn create_category(
    name: CategoryName,
    color: &str,
    owner: OwnerId,
    connection: &Connection,
) -> Result<Category, Error> {
    connection.execute(
        "INSERT INTO category (name, color, is_system, archived, owner_id)
         VALUES (?1, ?2, 0, 0, ?3);",
        (name.as_ref(), color, owner.as_i64()),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        name,
        color: color.to_owned(),
        is_system: false,
        archived: false,
        owner_id: owner,
    })
}

/// Create the owner's seed categories if they have none yet.
///
/// Runs at most once per owner: any existing category, archived or not,
/// suppresses the bootstrap.
pub fn ensure_default_categories(owner: OwnerId, connection: &Connection) -> Result<(), Error> {
    let count: u32 = connection.query_row(
        "SELECT COUNT(id) FROM category WHERE owner_id = :owner_id;",
        &[(":owner_id", &owner.as_i64())],
        |row| row.get(0),
    )?;

    if count > 0 {
        return Ok(());
    }

    let mut statement = connection.prepare(
        "INSERT INTO category (name, color, is_system, archived, owner_id)
         VALUES (?1, ?2, ?3, 0, ?4);",
    )?;

    for (name, color, is_system) in DEFAULT_CATEGORIES {
        statement.execute((name, color, is_system, owner.as_i64()))?;
    }

    Ok(())
}

/// Retrieve a single category by ID, scoped to `owner`.
pub fn get_category(
    category_id: CategoryId,
    owner: OwnerId,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(
            "SELECT id, name, color, is_system, archived, owner_id FROM category
             WHERE id = :id AND owner_id = :owner_id;",
        )?
        .query_row(
            &[(":id", &category_id), (":owner_id", &owner.as_i64())],
            map_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve the owner's active (non-archived) categories ordered by name.
pub fn get_categories(owner: OwnerId, connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, name, color, is_system, archived, owner_id FROM category
             WHERE owner_id = :owner_id AND archived = 0
             ORDER BY name ASC;",
        )?
        .query_map(&[(":owner_id", &owner.as_i64())], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Retrieve all of the owner's categories, archived included.
///
/// Used to build the import-time name lookup, which must also match
/// archived categories so history stays consistent.
pub fn get_all_categories(owner: OwnerId, connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, name, color, is_system, archived, owner_id FROM category
             WHERE owner_id = :owner_id
             ORDER BY name ASC;",
        )?
        .query_map(&[(":owner_id", &owner.as_i64())], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Retrieve categories with all-time spend totals and transaction counts.
///
/// `include_archived` controls whether archived categories appear.
/// Totals only count expenses; income assigned to a category does not
/// contribute to its spend.
pub fn get_categories_with_stats(
    include_archived: bool,
    owner: OwnerId,
    connection: &Connection,
) -> Result<Vec<CategoryWithStats>, Error> {
    let archived_clause = if include_archived {
        ""
    } else {
        "AND category.archived = 0"
    };

    let query = format!(
        "SELECT category.id, category.name, category.color, category.is_system,
                category.archived, category.owner_id,
                COALESCE(SUM(CASE WHEN t.is_income = 0 THEN ABS(t.amount) ELSE 0 END), 0),
                COUNT(t.id)
         FROM category
         LEFT JOIN \"transaction\" t ON t.category_id = category.id AND t.owner_id = category.owner_id
         WHERE category.owner_id = :owner_id {archived_clause}
         GROUP BY category.id
         ORDER BY category.name ASC;"
    );

    connection
        .prepare(&query)?
        .query_map(&[(":owner_id", &owner.as_i64())], |row| {
            Ok(CategoryWithStats {
                category: map_row(row)?,
                total_spent: row.get(6)?,
                transaction_count: row.get(7)?,
            })
        })?
        .map(|maybe_stats| maybe_stats.map_err(|error| error.into()))
        .collect()
}

/// Update a category's name and color.
///
/// System categories keep their seed name; only the color is applied.
///
/// # Errors
///
/// Returns [Error::UpdateMissingCategory] if the category does not exist
/// for this owner.
pub fn update_category(
    category_id: CategoryId,
    new_name: CategoryName,
    new_color: &str,
    owner: OwnerId,
    connection: &Connection,
) -> Result<Category, Error> {
    let category = get_category(category_id, owner, connection).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingCategory,
        error => error,
    })?;

    let name = if category.is_system {
        category.name.clone()
    } else {
        new_name
    };

    connection.execute(
        "UPDATE category SET name = ?1, color = ?2 WHERE id = ?3 AND owner_id = ?4;",
        (name.as_ref(), new_color, category_id, owner.as_i64()),
    )?;

    Ok(Category {
        name,
        color: new_color.to_owned(),
        ..category
    })
}

/// Archive a category, hiding it from pickers and budget reports.
///
/// # Errors
///
/// Returns [Error::ArchiveSystemCategory] for system categories and
/// [Error::UpdateMissingCategory] if the category does not exist.
pub fn archive_category(
    category_id: CategoryId,
    owner: OwnerId,
    connection: &Connection,
) -> Result<(), Error> {
    let category = get_category(category_id, owner, connection).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingCategory,
        error => error,
    })?;

    if category.is_system {
        return Err(Error::ArchiveSystemCategory);
    }

    connection.execute(
        "UPDATE category SET archived = 1 WHERE id = ?1 AND owner_id = ?2;",
        (category_id, owner.as_i64()),
    )?;

    Ok(())
}

/// Restore an archived category.
///
/// # Errors
///
/// Returns [Error::UpdateMissingCategory] if the category does not exist.
pub fn unarchive_category(
    category_id: CategoryId,
    owner: OwnerId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE category SET archived = 0 WHERE id = ?1 AND owner_id = ?2;",
        (category_id, owner.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCategory);
    }

    Ok(())
}

/// Delete a category, detaching its transactions first.
///
/// Transactions keep their `original_category` text, so the assignment can
/// be reconstructed from the audit trail if needed.
///
/// # Errors
///
/// Returns [Error::DeleteSystemCategory] for system categories and
/// [Error::DeleteMissingCategory] if the category does not exist.
pub fn delete_category(
    category_id: CategoryId,
    owner: OwnerId,
    connection: &Connection,
) -> Result<(), Error> {
    let category = get_category(category_id, owner, connection).map_err(|error| match error {
        Error::NotFound => Error::DeleteMissingCategory,
        error => error,
    })?;

    if category.is_system {
        return Err(Error::DeleteSystemCategory);
    }

    connection.execute(
        "UPDATE \"transaction\" SET category_id = NULL
         WHERE category_id = ?1 AND owner_id = ?2;",
        (category_id, owner.as_i64()),
    )?;

    connection.execute(
        "DELETE FROM category WHERE id = ?1 AND owner_id = ?2;",
        (category_id, owner.as_i64()),
    )?;

    Ok(())
}

/// Merge one category into another: all transactions are retargeted to the
/// destination, then the source category is deleted.
///
/// # Errors
///
/// Returns [Error::NotFound] if the destination category does not exist for
/// this owner, plus anything [delete_category] can return for the source.
pub fn merge_categories(
    from_category_id: CategoryId,
    to_category_id: CategoryId,
    owner: OwnerId,
    connection: &Connection,
) -> Result<(), Error> {
    // Validate the destination before touching any transactions.
    get_category(to_category_id, owner, connection)?;

    connection.execute(
        "UPDATE \"transaction\" SET category_id = ?1
         WHERE category_id = ?2 AND owner_id = ?3;",
        (to_category_id, from_category_id, owner.as_i64()),
    )?;

    delete_category(from_category_id, owner, connection)
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            color TEXT NOT NULL,
            is_system INTEGER NOT NULL DEFAULT 0,
            archived INTEGER NOT NULL DEFAULT 0,
            owner_id INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_category_owner ON category(owner_id, name);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let name = CategoryName::new_unchecked(&raw_name);

    Ok(Category {
        id,
        name,
        color: row.get(2)?,
        is_system: row.get(3)?,
        archived: row.get(4)?,
        owner_id: OwnerId::new(row.get(5)?),
    })
}

#[cfg(test)]
mod category_name_tests {
    use crate::{Error, category::CategoryName};

    #[test]
    fn new_fails_on_empty_string() {
        let name = CategoryName::new("");

        assert_eq!(name, Err(Error::EmptyCategoryName));
    }

    #[test]
    fn new_fails_on_just_whitespace() {
        let name = CategoryName::new("\n\t \r");

        assert_eq!(name, Err(Error::EmptyCategoryName));
    }

    #[test]
    fn new_trims_surrounding_whitespace() {
        let name = CategoryName::new("  Groceries ").expect("Could not create name");

        assert_eq!(name.as_ref(), "Groceries");
    }
}

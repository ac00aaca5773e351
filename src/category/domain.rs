//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, owner::OwnerId};

/// Database identifier for a category.
pub type CategoryId = i64;

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryName] if `name` is
    /// empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A spending category, e.g. 'Groceries', 'Dining'.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The display name of the category.
    pub name: CategoryName,
    /// Hex color used when charting this category, e.g. `#F59E0B`.
    pub color: String,
    /// System categories are created by the bootstrap seed and keep their
    /// names forever; they cannot be archived, merged away, or deleted.
    pub is_system: bool,
    /// Archived categories are hidden from pickers and budget reports but
    /// keep their transaction history.
    pub archived: bool,
    /// The owner this category belongs to.
    pub owner_id: OwnerId,
}

/// A category paired with all-time spending statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryWithStats {
    /// The category.
    pub category: Category,
    /// Total spent in this category (sum of absolute expense amounts).
    pub total_spent: f64,
    /// Number of transactions assigned to this category.
    pub transaction_count: u32,
}

/// The seed set created for an owner on first use: `(name, color, is_system)`.
pub const DEFAULT_CATEGORIES: &[(&str, &str, bool)] = &[
    ("Uncategorized", "#6B7280", true),
    ("Income", "#10B981", true),
    ("Transfer", "#3B82F6", true),
    ("Groceries", "#F59E0B", false),
    ("Dining", "#EF4444", false),
    ("Transportation", "#8B5CF6", false),
    ("Shopping", "#EC4899", false),
    ("Entertainment", "#14B8A6", false),
    ("Bills", "#F97316", false),
    ("Healthcare", "#06B6D4", false),
];

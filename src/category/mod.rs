//! Categories group transactions for budgeting and reporting.
//!
//! Categories are owner-scoped. A fixed seed set is created on first use;
//! seed categories marked as system categories keep their names forever and
//! can be neither archived nor deleted.

mod db;
mod domain;

pub use db::{
    archive_category, create_category, create_category_table, delete_category,
    ensure_default_categories, get_all_categories, get_categories, get_categories_with_stats,
    get_category, merge_categories, unarchive_category, update_category,
};
pub use domain::{Category, CategoryId, CategoryName, CategoryWithStats, DEFAULT_CATEGORIES};

//! Bank accounts that imported transactions can be attached to.

mod core;

pub use self::core::{Account, AccountId, create_account, create_account_table, get_accounts};

//! The owner identity under which all ledger data is partitioned.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Environment variable consulted when no owner is passed explicitly.
pub const OWNER_ENV_VAR: &str = "LEDGERLY_OWNER";

/// The user or household scope that owns a set of ledger rows.
///
/// Every storage operation is implicitly filtered by this identity. The
/// identity itself comes from an external collaborator (the CLI flag or
/// environment in this crate); this type only carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(i64);

impl OwnerId {
    /// Wrap a raw owner identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// The owner identifier as the integer stored in the database.
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolve the owner identity from an explicit value or the
/// [OWNER_ENV_VAR] environment variable.
///
/// # Errors
///
/// Returns [Error::Unauthorized] if neither source provides an identity.
/// This is terminal: every entry point in this crate requires an owner.
pub fn resolve_owner(explicit: Option<i64>) -> Result<OwnerId, Error> {
    if let Some(id) = explicit {
        return Ok(OwnerId::new(id));
    }

    std::env::var(OWNER_ENV_VAR)
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .map(OwnerId::new)
        .ok_or(Error::Unauthorized)
}

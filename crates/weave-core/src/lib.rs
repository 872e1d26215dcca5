//! # weave-core
//!
//! The social graph & feed composition core: access control under a
//! friendship/block/privacy/group-membership model, four ranked feed
//! strategies, preference-gated notification fan-out, @mention resolution,
//! and counter-driven achievements.
//!
//! The core is synchronous: every user-initiated action is one short-lived
//! unit of work against the injected store. Compound writes run inside a
//! single transaction; notification fan-out happens after commit and its
//! failures are logged, never propagated.
//!
//! ## Modules
//!
//! - [`visibility`] — fail-closed access checks over posts
//! - [`profile`] — registration, profile updates, user search
//! - [`friendship`] — friend request / accept / reject / block state machine
//! - [`content`] — posts, hashtags, comments, reactions, bookmarks, search
//! - [`feed`] — the four feed strategies and trending hashtags
//! - [`mentions`] — @handle and #tag extraction
//! - [`notify`] — the preference-gated notification router
//! - [`achievements`] — activity-counter awards
//! - [`groups`] — groups, membership, live-stream broadcast
//! - [`stories`] — 24-hour ephemeral stories
//! - [`economy`] — balances, daily bonus, transfers, marketplace, ads
//! - [`moderation`] — reports, admins, bans

pub mod achievements;
pub mod content;
pub mod economy;
pub mod feed;
pub mod friendship;
pub mod groups;
pub mod mentions;
pub mod moderation;
pub mod notify;
pub mod profile;
pub mod stories;
pub mod visibility;

use std::path::Path;

use rusqlite::Connection;
use weave_db::DbError;

/// Error types for core operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Length or shape violation, rejected before any write.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Missing target entity or handle.
    #[error("not found: {0}")]
    NotFound(String),

    /// Blocked pair, missing group membership, or non-admin admin action.
    #[error("permission denied: {0}")]
    Permission(String),

    /// Duplicate friend edge, existing block, or other uniqueness clash.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Underlying store failure; the compound operation was rolled back.
    #[error("persistence failure: {0}")]
    Persistence(#[from] DbError),
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Persistence(DbError::Sqlite(err))
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

/// The social core service, owning the injected store connection.
///
/// Reads take `&self`; every mutating operation takes `&mut self`, making
/// the single-logical-writer model explicit in the API.
pub struct Social {
    conn: Connection,
}

impl Social {
    /// Wrap an already-opened (and migrated) connection.
    pub fn new(conn: Connection) -> Self {
        Social { conn }
    }

    /// Open or create the database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Social {
            conn: weave_db::open(path)?,
        })
    }

    /// Open an in-memory store (for testing).
    pub fn open_memory() -> Result<Self> {
        Ok(Social {
            conn: weave_db::open_memory()?,
        })
    }

    /// Direct access to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Reject text longer than `max` characters.
pub(crate) fn validate_len(text: &str, max: usize, field: &str) -> Result<()> {
    if text.chars().count() > max {
        return Err(CoreError::Validation(format!(
            "{field} too long (max {max} chars)"
        )));
    }
    Ok(())
}

/// Map a uniqueness violation to a domain conflict, passing other store
/// errors through as persistence failures.
pub(crate) fn constraint_to_conflict(err: DbError, message: &str) -> CoreError {
    if err.is_constraint() {
        CoreError::Conflict(message.to_string())
    } else {
        CoreError::Persistence(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_len() {
        assert!(validate_len("short", 10, "field").is_ok());
        assert!(validate_len(&"x".repeat(11), 10, "field").is_err());
        // Limits count characters, not bytes.
        assert!(validate_len(&"é".repeat(10), 10, "field").is_ok());
    }

    #[test]
    fn test_open_memory() {
        let social = Social::open_memory().expect("open");
        let fk: i32 = social
            .connection()
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .expect("pragma");
        assert_eq!(fk, 1);
    }
}

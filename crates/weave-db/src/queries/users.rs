//! User query functions.

use rusqlite::{Connection, OptionalExtension};

use weave_types::UserId;

use crate::Result;

/// A raw user row from the database.
#[derive(Debug, Clone)]
pub struct UserRow {
    pub user_id: UserId,
    pub handle: String,
    pub reg_date: i64,
    pub last_seen: i64,
    pub is_private: bool,
    pub bio: String,
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        user_id: row.get(0)?,
        handle: row.get(1)?,
        reg_date: row.get(2)?,
        last_seen: row.get(3)?,
        is_private: row.get(4)?,
        bio: row.get(5)?,
    })
}

const USER_COLUMNS: &str = "user_id, handle, reg_date, last_seen, is_private, bio";

/// Insert a new user.
pub fn insert(
    conn: &Connection,
    user_id: UserId,
    handle: &str,
    is_private: bool,
    bio: &str,
    now: i64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO users (user_id, handle, reg_date, last_seen, is_private, bio)
         VALUES (?1, ?2, ?3, ?3, ?4, ?5)",
        rusqlite::params![user_id, handle, now, is_private, bio],
    )?;
    Ok(())
}

/// Get a user by id.
pub fn get(conn: &Connection, user_id: UserId) -> Result<Option<UserRow>> {
    let row = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
            [user_id],
            row_to_user,
        )
        .optional()?;
    Ok(row)
}

/// Get a user by handle.
pub fn by_handle(conn: &Connection, handle: &str) -> Result<Option<UserRow>> {
    let row = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE handle = ?1"),
            [handle],
            row_to_user,
        )
        .optional()?;
    Ok(row)
}

/// Whether a user id is registered.
pub fn exists(conn: &Connection, user_id: UserId) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE user_id = ?1",
        [user_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Update the handle.
pub fn set_handle(conn: &Connection, user_id: UserId, handle: &str) -> Result<()> {
    conn.execute(
        "UPDATE users SET handle = ?1 WHERE user_id = ?2",
        rusqlite::params![handle, user_id],
    )?;
    Ok(())
}

/// Update the bio.
pub fn set_bio(conn: &Connection, user_id: UserId, bio: &str) -> Result<()> {
    conn.execute(
        "UPDATE users SET bio = ?1 WHERE user_id = ?2",
        rusqlite::params![bio, user_id],
    )?;
    Ok(())
}

/// Update the privacy flag.
pub fn set_privacy(conn: &Connection, user_id: UserId, is_private: bool) -> Result<()> {
    conn.execute(
        "UPDATE users SET is_private = ?1 WHERE user_id = ?2",
        rusqlite::params![is_private, user_id],
    )?;
    Ok(())
}

/// Bump the last-seen timestamp.
pub fn touch_last_seen(conn: &Connection, user_id: UserId, now: i64) -> Result<()> {
    conn.execute(
        "UPDATE users SET last_seen = ?1 WHERE user_id = ?2",
        rusqlite::params![now, user_id],
    )?;
    Ok(())
}

/// Search users by handle substring, excluding the system identity.
pub fn search(conn: &Connection, keyword: &str, limit: u32) -> Result<Vec<UserRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users
         WHERE handle LIKE ?1 AND user_id != 0
         ORDER BY handle LIMIT ?2"
    ))?;

    let rows = stmt
        .query_map(rusqlite::params![format!("%{keyword}%"), limit], row_to_user)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Connection {
        crate::open_memory().expect("open test db")
    }

    #[test]
    fn test_insert_and_get() {
        let conn = test_db();
        insert(&conn, 1, "alice", false, "hi there", 1000).expect("insert");

        let user = get(&conn, 1).expect("get").expect("present");
        assert_eq!(user.handle, "alice");
        assert_eq!(user.reg_date, 1000);
        assert_eq!(user.last_seen, 1000);
        assert!(!user.is_private);
    }

    #[test]
    fn test_missing_user_is_none() {
        let conn = test_db();
        assert!(get(&conn, 42).expect("get").is_none());
    }

    #[test]
    fn test_duplicate_handle_rejected() {
        let conn = test_db();
        insert(&conn, 1, "alice", false, "", 1000).expect("insert");
        let result = insert(&conn, 2, "alice", false, "", 1000);
        assert!(result.expect_err("duplicate").is_constraint());
    }

    #[test]
    fn test_by_handle() {
        let conn = test_db();
        insert(&conn, 7, "bob", true, "", 1000).expect("insert");
        let user = by_handle(&conn, "bob").expect("query").expect("present");
        assert_eq!(user.user_id, 7);
        assert!(user.is_private);
    }

    #[test]
    fn test_search_excludes_system() {
        let conn = test_db();
        insert(&conn, 1, "systematic", false, "", 1000).expect("insert");
        let found = search(&conn, "syst", 20).expect("search");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].user_id, 1);
    }
}

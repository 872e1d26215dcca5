//! Group, membership, and live-stream query functions.

use rusqlite::{Connection, OptionalExtension};

use weave_types::social::GroupRole;
use weave_types::{GroupId, StreamId, UserId};

use crate::Result;

/// A raw group row.
#[derive(Debug, Clone)]
pub struct GroupRow {
    pub group_id: GroupId,
    pub name: String,
    pub creator_id: UserId,
    pub description: String,
    pub is_public: bool,
}

/// Insert a group and return its id.
pub fn insert(
    conn: &Connection,
    name: &str,
    creator_id: UserId,
    description: &str,
    is_public: bool,
) -> Result<GroupId> {
    conn.execute(
        "INSERT INTO groups (name, creator_id, description, is_public)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![name, creator_id, description, is_public],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Get a group by id.
pub fn get(conn: &Connection, group_id: GroupId) -> Result<Option<GroupRow>> {
    let row = conn
        .query_row(
            "SELECT group_id, name, creator_id, description, is_public
             FROM groups WHERE group_id = ?1",
            [group_id],
            |row| {
                Ok(GroupRow {
                    group_id: row.get(0)?,
                    name: row.get(1)?,
                    creator_id: row.get(2)?,
                    description: row.get(3)?,
                    is_public: row.get(4)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}

/// Insert a membership row.
pub fn insert_member(
    conn: &Connection,
    group_id: GroupId,
    user_id: UserId,
    role: GroupRole,
    now: i64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO group_members (group_id, user_id, role, joined_at)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![group_id, user_id, role.as_str(), now],
    )?;
    Ok(())
}

/// Whether the user is a member of the group.
pub fn is_member(conn: &Connection, group_id: GroupId, user_id: UserId) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM group_members WHERE group_id = ?1 AND user_id = ?2",
        [group_id, user_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Ids of all current members of the group.
pub fn member_ids(conn: &Connection, group_id: GroupId) -> Result<Vec<UserId>> {
    let mut stmt = conn
        .prepare("SELECT user_id FROM group_members WHERE group_id = ?1 ORDER BY user_id")?;
    let ids = stmt
        .query_map([group_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(ids)
}

/// Number of groups the user created.
pub fn created_count(conn: &Connection, user_id: UserId) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM groups WHERE creator_id = ?1",
        [user_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Search public groups by name substring.
pub fn search_public(conn: &Connection, keyword: &str, limit: u32) -> Result<Vec<GroupRow>> {
    let mut stmt = conn.prepare(
        "SELECT group_id, name, creator_id, description, is_public
         FROM groups WHERE name LIKE ?1 AND is_public = 1
         ORDER BY name LIMIT ?2",
    )?;
    let rows = stmt
        .query_map(rusqlite::params![format!("%{keyword}%"), limit], |row| {
            Ok(GroupRow {
                group_id: row.get(0)?,
                name: row.get(1)?,
                creator_id: row.get(2)?,
                description: row.get(3)?,
                is_public: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Insert a live stream and return its id.
pub fn insert_stream(
    conn: &Connection,
    user_id: UserId,
    group_id: GroupId,
    title: &str,
    now: i64,
) -> Result<StreamId> {
    conn.execute(
        "INSERT INTO live_streams (user_id, group_id, title, started_at)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![user_id, group_id, title, now],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Mark a stream ended. Returns `false` if it was not active.
pub fn end_stream(conn: &Connection, stream_id: StreamId) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE live_streams SET status = 'ended' WHERE stream_id = ?1 AND status = 'active'",
        [stream_id],
    )?;
    Ok(updated > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::users;

    fn test_db() -> Connection {
        let conn = crate::open_memory().expect("open test db");
        users::insert(&conn, 1, "alice", false, "", 100).expect("user");
        users::insert(&conn, 2, "bob", false, "", 100).expect("user");
        conn
    }

    #[test]
    fn test_group_and_membership() {
        let conn = test_db();
        let group = insert(&conn, "rustaceans", 1, "crab people", true).expect("group");
        insert_member(&conn, group, 1, GroupRole::Admin, 100).expect("member");

        assert!(is_member(&conn, group, 1).expect("query"));
        assert!(!is_member(&conn, group, 2).expect("query"));
        assert_eq!(created_count(&conn, 1).expect("count"), 1);
    }

    #[test]
    fn test_duplicate_membership_rejected() {
        let conn = test_db();
        let group = insert(&conn, "g", 1, "", true).expect("group");
        insert_member(&conn, group, 1, GroupRole::Admin, 100).expect("member");
        let result = insert_member(&conn, group, 1, GroupRole::Member, 101);
        assert!(result.expect_err("duplicate").is_constraint());
    }

    #[test]
    fn test_search_public_only() {
        let conn = test_db();
        insert(&conn, "open club", 1, "", true).expect("group");
        insert(&conn, "secret club", 1, "", false).expect("group");

        let found = search_public(&conn, "club", 10).expect("search");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "open club");
    }

    #[test]
    fn test_stream_lifecycle() {
        let conn = test_db();
        let group = insert(&conn, "g", 1, "", true).expect("group");
        let stream = insert_stream(&conn, 1, group, "launch", 1000).expect("stream");

        assert!(end_stream(&conn, stream).expect("end"));
        assert!(!end_stream(&conn, stream).expect("end again"));
    }
}

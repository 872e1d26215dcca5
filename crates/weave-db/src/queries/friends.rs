//! Friend edge and block query functions.

use rusqlite::{Connection, OptionalExtension};

use weave_types::social::FriendStatus;
use weave_types::UserId;

use crate::{DbError, Result};

/// A directed friend edge.
#[derive(Debug, Clone)]
pub struct FriendEdge {
    pub user_id: UserId,
    pub friend_id: UserId,
    pub status: FriendStatus,
    pub created_at: i64,
}

/// Insert a directed edge.
pub fn insert_edge(
    conn: &Connection,
    user_id: UserId,
    friend_id: UserId,
    status: FriendStatus,
    now: i64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO friends (user_id, friend_id, status, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![user_id, friend_id, status.as_str(), now],
    )?;
    Ok(())
}

/// Whether any edge exists between the pair, in either direction.
pub fn edge_exists_between(conn: &Connection, a: UserId, b: UserId) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM friends
         WHERE (user_id = ?1 AND friend_id = ?2) OR (user_id = ?2 AND friend_id = ?1)",
        [a, b],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Get the directed edge owner -> target, if present.
pub fn get_edge(conn: &Connection, owner: UserId, target: UserId) -> Result<Option<FriendEdge>> {
    let row = conn
        .query_row(
            "SELECT user_id, friend_id, status, created_at FROM friends
             WHERE user_id = ?1 AND friend_id = ?2",
            [owner, target],
            |row| {
                Ok((
                    row.get::<_, UserId>(0)?,
                    row.get::<_, UserId>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            },
        )
        .optional()?;

    match row {
        None => Ok(None),
        Some((user_id, friend_id, status, created_at)) => {
            let status = status
                .parse()
                .map_err(|e: String| DbError::Constraint(e))?;
            Ok(Some(FriendEdge {
                user_id,
                friend_id,
                status,
                created_at,
            }))
        }
    }
}

/// Transition the directed edge owner -> target from one status to another.
///
/// Returns `false` if no edge in the expected status existed.
pub fn set_edge_status(
    conn: &Connection,
    owner: UserId,
    target: UserId,
    from: FriendStatus,
    to: FriendStatus,
) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE friends SET status = ?1
         WHERE user_id = ?2 AND friend_id = ?3 AND status = ?4",
        rusqlite::params![to.as_str(), owner, target, from.as_str()],
    )?;
    Ok(updated > 0)
}

/// Delete all edges between the pair, in both directions.
pub fn delete_edges_between(conn: &Connection, a: UserId, b: UserId) -> Result<()> {
    conn.execute(
        "DELETE FROM friends
         WHERE (user_id = ?1 AND friend_id = ?2) OR (user_id = ?2 AND friend_id = ?1)",
        [a, b],
    )?;
    Ok(())
}

/// Ids of the user's accepted friends.
pub fn accepted_friends(conn: &Connection, user_id: UserId) -> Result<Vec<UserId>> {
    let mut stmt = conn.prepare(
        "SELECT friend_id FROM friends WHERE user_id = ?1 AND status = 'accepted'
         ORDER BY friend_id",
    )?;
    let ids = stmt
        .query_map([user_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(ids)
}

/// Count of the user's accepted friends.
pub fn accepted_friend_count(conn: &Connection, user_id: UserId) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM friends WHERE user_id = ?1 AND status = 'accepted'",
        [user_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Insert a block row.
pub fn insert_block(conn: &Connection, blocker: UserId, blocked: UserId, now: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO blocks (blocker_id, blocked_id, created_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![blocker, blocked, now],
    )?;
    Ok(())
}

/// Whether blocker has blocked blocked (single direction).
pub fn is_blocked(conn: &Connection, blocker: UserId, blocked: UserId) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM blocks WHERE blocker_id = ?1 AND blocked_id = ?2",
        [blocker, blocked],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Whether a block exists between the pair in either direction.
pub fn blocked_either_way(conn: &Connection, a: UserId, b: UserId) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM blocks
         WHERE (blocker_id = ?1 AND blocked_id = ?2) OR (blocker_id = ?2 AND blocked_id = ?1)",
        [a, b],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Delete a block row. Returns `false` if none existed.
pub fn delete_block(conn: &Connection, blocker: UserId, blocked: UserId) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM blocks WHERE blocker_id = ?1 AND blocked_id = ?2",
        [blocker, blocked],
    )?;
    Ok(deleted > 0)
}

/// Ids blocked by the user.
pub fn blocked_by(conn: &Connection, blocker: UserId) -> Result<Vec<UserId>> {
    let mut stmt =
        conn.prepare("SELECT blocked_id FROM blocks WHERE blocker_id = ?1 ORDER BY blocked_id")?;
    let ids = stmt
        .query_map([blocker], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(ids)
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
    fn test_edge_round_trip() {
        let conn = test_db();
        insert_edge(&conn, 1, 2, FriendStatus::Pending, 100).expect("insert");

        let edge = get_edge(&conn, 1, 2).expect("get").expect("present");
        assert_eq!(edge.status, FriendStatus::Pending);
        assert!(get_edge(&conn, 2, 1).expect("get").is_none());
        assert!(edge_exists_between(&conn, 2, 1).expect("exists"));
    }

    #[test]
    fn test_status_transition() {
        let conn = test_db();
        insert_edge(&conn, 1, 2, FriendStatus::Pending, 100).expect("insert");

        let moved = set_edge_status(&conn, 1, 2, FriendStatus::Pending, FriendStatus::Accepted)
            .expect("transition");
        assert!(moved);

        // Second transition from pending finds nothing.
        let moved = set_edge_status(&conn, 1, 2, FriendStatus::Pending, FriendStatus::Accepted)
            .expect("transition");
        assert!(!moved);
    }

    #[test]
    fn test_duplicate_edge_rejected() {
        let conn = test_db();
        insert_edge(&conn, 1, 2, FriendStatus::Pending, 100).expect("insert");
        let result = insert_edge(&conn, 1, 2, FriendStatus::Accepted, 101);
        assert!(result.expect_err("duplicate").is_constraint());
    }

    #[test]
    fn test_block_directions() {
        let conn = test_db();
        insert_block(&conn, 1, 2, 100).expect("block");

        assert!(is_blocked(&conn, 1, 2).expect("query"));
        assert!(!is_blocked(&conn, 2, 1).expect("query"));
        assert!(blocked_either_way(&conn, 2, 1).expect("query"));
    }

    #[test]
    fn test_delete_edges_between() {
        let conn = test_db();
        insert_edge(&conn, 1, 2, FriendStatus::Accepted, 100).expect("insert");
        insert_edge(&conn, 2, 1, FriendStatus::Accepted, 100).expect("insert");

        delete_edges_between(&conn, 2, 1).expect("delete");
        assert!(!edge_exists_between(&conn, 1, 2).expect("exists"));
    }

    #[test]
    fn test_accepted_friend_count() {
        let conn = test_db();
        insert_edge(&conn, 1, 2, FriendStatus::Accepted, 100).expect("insert");
        assert_eq!(accepted_friend_count(&conn, 1).expect("count"), 1);
        assert_eq!(accepted_friend_count(&conn, 2).expect("count"), 0);
    }
}

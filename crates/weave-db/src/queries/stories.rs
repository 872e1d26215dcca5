//! Story query functions. Expiry is a read-time filter; no sweeper.

use rusqlite::Connection;

use weave_types::{StoryId, UserId};

use crate::Result;

/// A story joined with its author handle.
#[derive(Debug, Clone)]
pub struct StoryRow {
    pub story_id: StoryId,
    pub user_id: UserId,
    pub author_handle: String,
    pub content: Option<String>,
    pub media_kind: Option<String>,
    pub media_ref: Option<String>,
    pub created_at: i64,
    pub expires_at: i64,
}

/// Insert a story and return its id.
pub fn insert(
    conn: &Connection,
    user_id: UserId,
    content: Option<&str>,
    media_kind: Option<&str>,
    media_ref: Option<&str>,
    now: i64,
    expires_at: i64,
) -> Result<StoryId> {
    conn.execute(
        "INSERT INTO stories (user_id, content, media_kind, media_ref, created_at, expires_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![user_id, content, media_kind, media_ref, now, expires_at],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Unexpired stories visible to the viewer: their own plus accepted
/// friends', block-excluded, newest first.
pub fn visible(conn: &Connection, viewer: UserId, now: i64, limit: u32) -> Result<Vec<StoryRow>> {
    let mut stmt = conn.prepare(
        "SELECT s.story_id, s.user_id, u.handle, s.content, s.media_kind, s.media_ref,
                s.created_at, s.expires_at
         FROM stories s
         JOIN users u ON s.user_id = u.user_id
         WHERE (s.user_id = ?1
                OR s.user_id IN (SELECT friend_id FROM friends
                                 WHERE user_id = ?1 AND status = 'accepted'))
           AND s.expires_at > ?2
           AND NOT EXISTS (SELECT 1 FROM blocks b
                           WHERE (b.blocker_id = ?1 AND b.blocked_id = s.user_id)
                              OR (b.blocker_id = s.user_id AND b.blocked_id = ?1))
         ORDER BY s.created_at DESC, s.story_id DESC
         LIMIT ?3",
    )?;
    let rows = stmt
        .query_map(rusqlite::params![viewer, now, limit], |row| {
            Ok(StoryRow {
                story_id: row.get(0)?,
                user_id: row.get(1)?,
                author_handle: row.get(2)?,
                content: row.get(3)?,
                media_kind: row.get(4)?,
                media_ref: row.get(5)?,
                created_at: row.get(6)?,
                expires_at: row.get(7)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{friends, users};
    use weave_types::social::FriendStatus;

    fn test_db() -> Connection {
        let conn = crate::open_memory().expect("open test db");
        users::insert(&conn, 1, "alice", false, "", 100).expect("user");
        users::insert(&conn, 2, "bob", false, "", 100).expect("user");
        friends::insert_edge(&conn, 1, 2, FriendStatus::Accepted, 100).expect("edge");
        conn
    }

    #[test]
    fn test_expiry_filtered_at_read() {
        let conn = test_db();
        let now = 100_000;
        insert(&conn, 2, Some("fresh"), None, None, now, now + 1000).expect("story");
        insert(&conn, 2, Some("expired"), None, None, now - 90_000, now - 100).expect("story");

        let rows = visible(&conn, 1, now, 10).expect("visible");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].content.as_deref(), Some("fresh"));
    }

    #[test]
    fn test_own_stories_visible() {
        let conn = test_db();
        insert(&conn, 1, Some("mine"), None, None, 1000, 2000).expect("story");
        let rows = visible(&conn, 1, 1500, 10).expect("visible");
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_blocked_author_hidden() {
        let conn = test_db();
        insert(&conn, 2, Some("hi"), None, None, 1000, 2000).expect("story");
        friends::insert_block(&conn, 2, 1, 100).expect("block");

        let rows = visible(&conn, 1, 1500, 10).expect("visible");
        assert!(rows.is_empty());
    }
}

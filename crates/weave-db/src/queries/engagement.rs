//! Reaction, comment, and bookmark query functions.

use rusqlite::{Connection, OptionalExtension};

use weave_types::{CommentId, PostId, UserId};

use crate::queries::posts::CandidateRow;
use crate::Result;

/// Insert or overwrite the user's reaction to a post.
///
/// Unique per (post, user); re-reacting updates the kind in place.
pub fn upsert_reaction(
    conn: &Connection,
    post_id: PostId,
    user_id: UserId,
    kind: &str,
    now: i64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO reactions (post_id, user_id, kind, reacted_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(post_id, user_id) DO UPDATE SET kind = ?3, reacted_at = ?4",
        rusqlite::params![post_id, user_id, kind, now],
    )?;
    Ok(())
}

/// The user's reaction kind on a post, if any.
pub fn reaction_kind(conn: &Connection, post_id: PostId, user_id: UserId) -> Result<Option<String>> {
    let kind = conn
        .query_row(
            "SELECT kind FROM reactions WHERE post_id = ?1 AND user_id = ?2",
            [post_id, user_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(kind)
}

/// Number of reactions on a post.
pub fn reaction_count(conn: &Connection, post_id: PostId) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM reactions WHERE post_id = ?1",
        [post_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Insert a comment and return its id.
pub fn insert_comment(
    conn: &Connection,
    post_id: PostId,
    user_id: UserId,
    content: &str,
    now: i64,
) -> Result<CommentId> {
    conn.execute(
        "INSERT INTO comments (post_id, user_id, content, comment_date)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![post_id, user_id, content, now],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Number of comments on a post.
pub fn comment_count(conn: &Connection, post_id: PostId) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM comments WHERE post_id = ?1",
        [post_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// A raw comment row.
#[derive(Debug, Clone)]
pub struct CommentRow {
    pub comment_id: CommentId,
    pub post_id: PostId,
    pub user_id: UserId,
    pub content: String,
    pub comment_date: i64,
}

/// Comments on a post, oldest first.
pub fn comments_for(conn: &Connection, post_id: PostId) -> Result<Vec<CommentRow>> {
    let mut stmt = conn.prepare(
        "SELECT comment_id, post_id, user_id, content, comment_date
         FROM comments WHERE post_id = ?1 ORDER BY comment_date, comment_id",
    )?;
    let rows = stmt
        .query_map([post_id], |row| {
            Ok(CommentRow {
                comment_id: row.get(0)?,
                post_id: row.get(1)?,
                user_id: row.get(2)?,
                content: row.get(3)?,
                comment_date: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Insert a bookmark. Fails with a constraint error on duplicates.
pub fn insert_bookmark(conn: &Connection, user_id: UserId, post_id: PostId, now: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO bookmarks (user_id, post_id, created_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![user_id, post_id, now],
    )?;
    Ok(())
}

/// Delete a bookmark. Returns `false` if none existed.
pub fn delete_bookmark(conn: &Connection, user_id: UserId, post_id: PostId) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM bookmarks WHERE user_id = ?1 AND post_id = ?2",
        [user_id, post_id],
    )?;
    Ok(deleted > 0)
}

/// The user's bookmarked posts, most recently saved first.
pub fn bookmarked_posts(
    conn: &Connection,
    user_id: UserId,
    limit: u32,
    offset: u32,
) -> Result<Vec<CandidateRow>> {
    let mut stmt = conn.prepare(
        "SELECT p.post_id, p.user_id, u.handle, p.content, p.post_date,
                p.group_id, p.media_kind, p.media_ref,
                (SELECT COUNT(*) FROM reactions r WHERE r.post_id = p.post_id),
                (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.post_id)
         FROM bookmarks b
         JOIN posts p ON b.post_id = p.post_id
         JOIN users u ON p.user_id = u.user_id
         WHERE b.user_id = ?1
         ORDER BY b.created_at DESC, b.post_id DESC
         LIMIT ?2 OFFSET ?3",
    )?;
    let rows = stmt
        .query_map(rusqlite::params![user_id, limit, offset], |row| {
            Ok(CandidateRow {
                post_id: row.get(0)?,
                author_id: row.get(1)?,
                author_handle: row.get(2)?,
                content: row.get(3)?,
                post_date: row.get(4)?,
                group_id: row.get(5)?,
                media_kind: row.get(6)?,
                media_ref: row.get(7)?,
                like_count: row.get(8)?,
                comment_count: row.get(9)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

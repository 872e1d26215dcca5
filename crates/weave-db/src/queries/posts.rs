//! Post, hashtag, and feed-candidate query functions.
//!
//! Candidate queries perform *selection only* (friend / group / shared-
//! hashtag universes with symmetric block exclusion); all ordering and
//! scoring happens in the core.

use rusqlite::{Connection, OptionalExtension};

use weave_types::{GroupId, PostId, UserId};

use crate::Result;

/// A raw post row.
#[derive(Debug, Clone)]
pub struct PostRow {
    pub post_id: PostId,
    pub user_id: UserId,
    pub content: String,
    pub post_date: i64,
    pub group_id: Option<GroupId>,
    pub media_kind: Option<String>,
    pub media_ref: Option<String>,
}

/// A feed candidate: a post joined with its author handle and engagement
/// counts.
#[derive(Debug, Clone)]
pub struct CandidateRow {
    pub post_id: PostId,
    pub author_id: UserId,
    pub author_handle: String,
    pub content: String,
    pub post_date: i64,
    pub group_id: Option<GroupId>,
    pub media_kind: Option<String>,
    pub media_ref: Option<String>,
    pub like_count: i64,
    pub comment_count: i64,
}

const CANDIDATE_SELECT: &str = "SELECT p.post_id, p.user_id, u.handle, p.content, p.post_date,
        p.group_id, p.media_kind, p.media_ref,
        (SELECT COUNT(*) FROM reactions r WHERE r.post_id = p.post_id),
        (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.post_id)
 FROM posts p JOIN users u ON p.user_id = u.user_id";

/// Symmetric block exclusion between the viewer (?1) and the post author.
const BLOCK_EXCLUSION: &str = "NOT EXISTS (SELECT 1 FROM blocks b
    WHERE (b.blocker_id = ?1 AND b.blocked_id = p.user_id)
       OR (b.blocker_id = p.user_id AND b.blocked_id = ?1))";

fn row_to_candidate(row: &rusqlite::Row<'_>) -> rusqlite::Result<CandidateRow> {
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
}

/// Insert a post and return its id.
pub fn insert(
    conn: &Connection,
    user_id: UserId,
    content: &str,
    group_id: Option<GroupId>,
    media_kind: Option<&str>,
    media_ref: Option<&str>,
    now: i64,
) -> Result<PostId> {
    conn.execute(
        "INSERT INTO posts (user_id, content, post_date, group_id, media_kind, media_ref)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![user_id, content, now, group_id, media_kind, media_ref],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Get a post by id.
pub fn get(conn: &Connection, post_id: PostId) -> Result<Option<PostRow>> {
    let row = conn
        .query_row(
            "SELECT post_id, user_id, content, post_date, group_id, media_kind, media_ref
             FROM posts WHERE post_id = ?1",
            [post_id],
            |row| {
                Ok(PostRow {
                    post_id: row.get(0)?,
                    user_id: row.get(1)?,
                    content: row.get(2)?,
                    post_date: row.get(3)?,
                    group_id: row.get(4)?,
                    media_kind: row.get(5)?,
                    media_ref: row.get(6)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}

/// Delete a post. Returns `false` if it did not exist.
pub fn delete(conn: &Connection, post_id: PostId) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM posts WHERE post_id = ?1", [post_id])?;
    Ok(deleted > 0)
}

/// Number of posts authored by the user.
pub fn count_by_author(conn: &Connection, user_id: UserId) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM posts WHERE user_id = ?1",
        [user_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Insert the hashtag if new and return its id.
pub fn ensure_hashtag(conn: &Connection, name: &str) -> Result<i64> {
    conn.execute("INSERT OR IGNORE INTO hashtags (name) VALUES (?1)", [name])?;
    let id: i64 = conn.query_row(
        "SELECT hashtag_id FROM hashtags WHERE name = ?1",
        [name],
        |row| row.get(0),
    )?;
    Ok(id)
}

/// Link a post to a hashtag.
pub fn link_hashtag(conn: &Connection, post_id: PostId, hashtag_id: i64) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO post_hashtags (post_id, hashtag_id) VALUES (?1, ?2)",
        [post_id, hashtag_id],
    )?;
    Ok(())
}

/// Candidates authored by the viewer's accepted friends.
pub fn friend_candidates(conn: &Connection, viewer: UserId) -> Result<Vec<CandidateRow>> {
    let sql = format!(
        "{CANDIDATE_SELECT}
         WHERE p.user_id IN (SELECT friend_id FROM friends
                             WHERE user_id = ?1 AND status = 'accepted')
           AND {BLOCK_EXCLUSION}"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([viewer], row_to_candidate)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Candidates posted in groups the viewer belongs to.
pub fn group_candidates(conn: &Connection, viewer: UserId) -> Result<Vec<CandidateRow>> {
    let sql = format!(
        "{CANDIDATE_SELECT}
         WHERE p.group_id IN (SELECT group_id FROM group_members WHERE user_id = ?1)
           AND {BLOCK_EXCLUSION}"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([viewer], row_to_candidate)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Discovery candidates: posts sharing at least one hashtag with any post
/// the viewer has authored.
pub fn discovery_candidates(conn: &Connection, viewer: UserId) -> Result<Vec<CandidateRow>> {
    let sql = format!(
        "{CANDIDATE_SELECT}
         WHERE p.post_id IN (
             SELECT ph.post_id FROM post_hashtags ph
             WHERE ph.hashtag_id IN (
                 SELECT ph2.hashtag_id FROM post_hashtags ph2
                 JOIN posts p2 ON ph2.post_id = p2.post_id
                 WHERE p2.user_id = ?1))
           AND {BLOCK_EXCLUSION}"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([viewer], row_to_candidate)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Posts carrying the given hashtag, newest first.
pub fn by_hashtag(conn: &Connection, tag: &str, limit: u32) -> Result<Vec<CandidateRow>> {
    let sql = format!(
        "{CANDIDATE_SELECT}
         JOIN post_hashtags ph ON p.post_id = ph.post_id
         JOIN hashtags h ON ph.hashtag_id = h.hashtag_id
         WHERE h.name = ?1
         ORDER BY p.post_date DESC LIMIT ?2"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params![tag, limit], row_to_candidate)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Keyword search over posts visible to the viewer (own, friends', and
/// group posts), block-excluded, newest first.
pub fn search_visible(
    conn: &Connection,
    viewer: UserId,
    keyword: &str,
    limit: u32,
) -> Result<Vec<CandidateRow>> {
    let sql = format!(
        "{CANDIDATE_SELECT}
         WHERE p.content LIKE ?2
           AND (p.user_id = ?1
                OR p.user_id IN (SELECT friend_id FROM friends
                                 WHERE user_id = ?1 AND status = 'accepted')
                OR p.group_id IN (SELECT group_id FROM group_members WHERE user_id = ?1))
           AND {BLOCK_EXCLUSION}
         ORDER BY p.post_date DESC LIMIT ?3"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(
            rusqlite::params![viewer, format!("%{keyword}%"), limit],
            row_to_candidate,
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Hashtag usage counts over posts newer than `since`, descending.
pub fn trending_tags(conn: &Connection, since: i64, limit: u32) -> Result<Vec<(String, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT h.name, COUNT(ph.post_id) AS post_count
         FROM hashtags h
         JOIN post_hashtags ph ON h.hashtag_id = ph.hashtag_id
         JOIN posts p ON ph.post_id = p.post_id
         WHERE p.post_date > ?1
         GROUP BY h.hashtag_id
         ORDER BY post_count DESC, h.name
         LIMIT ?2",
    )?;
    let rows = stmt
        .query_map(rusqlite::params![since, limit], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

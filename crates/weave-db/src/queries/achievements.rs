//! Achievement query functions.

use rusqlite::Connection;

use weave_types::UserId;

use crate::Result;

/// A raw achievement row.
#[derive(Debug, Clone)]
pub struct AchievementRow {
    pub user_id: UserId,
    pub kind: String,
    pub description: String,
    pub earned_at: i64,
}

/// Whether the user already holds an achievement of this kind.
pub fn has(conn: &Connection, user_id: UserId, kind: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM achievements WHERE user_id = ?1 AND kind = ?2",
        rusqlite::params![user_id, kind],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Insert an achievement row. The (user, kind) pair is unique.
pub fn insert(
    conn: &Connection,
    user_id: UserId,
    kind: &str,
    description: &str,
    now: i64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO achievements (user_id, kind, description, earned_at)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![user_id, kind, description, now],
    )?;
    Ok(())
}

/// All achievements earned by the user, oldest first.
pub fn list(conn: &Connection, user_id: UserId) -> Result<Vec<AchievementRow>> {
    let mut stmt = conn.prepare(
        "SELECT user_id, kind, description, earned_at
         FROM achievements WHERE user_id = ?1 ORDER BY earned_at, achievement_id",
    )?;
    let rows = stmt
        .query_map([user_id], |row| {
            Ok(AchievementRow {
                user_id: row.get(0)?,
                kind: row.get(1)?,
                description: row.get(2)?,
                earned_at: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::users;

    fn test_db() -> Connection {
        let conn = crate::open_memory().expect("open test db");
        users::insert(&conn, 1, "alice", false, "", 100).expect("user");
        conn
    }

    #[test]
    fn test_insert_and_has() {
        let conn = test_db();
        assert!(!has(&conn, 1, "active_poster").expect("has"));

        insert(&conn, 1, "active_poster", "Published 10 posts", 1000).expect("insert");
        assert!(has(&conn, 1, "active_poster").expect("has"));
    }

    #[test]
    fn test_duplicate_kind_rejected() {
        let conn = test_db();
        insert(&conn, 1, "group_leader", "Created 3 groups", 1000).expect("insert");
        let result = insert(&conn, 1, "group_leader", "again", 1001);
        assert!(result.expect_err("duplicate").is_constraint());
    }

    #[test]
    fn test_list() {
        let conn = test_db();
        insert(&conn, 1, "active_poster", "a", 1000).expect("insert");
        insert(&conn, 1, "social_butterfly", "b", 1001).expect("insert");

        let rows = list(&conn, 1).expect("list");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].kind, "active_poster");
    }
}

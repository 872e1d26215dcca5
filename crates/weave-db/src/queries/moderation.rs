//! Report and admin query functions.

use rusqlite::{Connection, OptionalExtension};

use weave_types::UserId;

use crate::Result;

/// Insert a report.
pub fn insert_report(
    conn: &Connection,
    reporter_id: UserId,
    target_id: i64,
    target_type: &str,
    reason: &str,
    now: i64,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO reports (reporter_id, target_id, target_type, reason, report_date)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![reporter_id, target_id, target_type, reason, now],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Number of reports filed against a target.
pub fn report_count(conn: &Connection, target_id: i64, target_type: &str) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM reports WHERE target_id = ?1 AND target_type = ?2",
        rusqlite::params![target_id, target_type],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Appoint an admin.
pub fn insert_admin(conn: &Connection, user_id: UserId, role: &str, now: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO admins (user_id, role, appointed_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![user_id, role, now],
    )?;
    Ok(())
}

/// Remove an admin. Returns `false` if they were not one.
pub fn delete_admin(conn: &Connection, user_id: UserId) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM admins WHERE user_id = ?1", [user_id])?;
    Ok(deleted > 0)
}

/// The user's admin role, if any.
pub fn admin_role(conn: &Connection, user_id: UserId) -> Result<Option<String>> {
    let role = conn
        .query_row(
            "SELECT role FROM admins WHERE user_id = ?1",
            [user_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(role)
}

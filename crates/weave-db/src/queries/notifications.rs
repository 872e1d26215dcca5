//! Notification and notification-settings query functions.

use rusqlite::{Connection, OptionalExtension};

use weave_types::notify::NotificationSettings;
use weave_types::{NotificationId, UserId};

use crate::Result;

/// A raw notification row.
#[derive(Debug, Clone)]
pub struct NotificationRow {
    pub notification_id: NotificationId,
    pub user_id: UserId,
    pub kind: String,
    pub content: String,
    pub related_id: Option<i64>,
    pub created_at: i64,
    pub is_read: bool,
}

/// Insert a notification.
pub fn insert(
    conn: &Connection,
    user_id: UserId,
    kind: &str,
    content: &str,
    related_id: Option<i64>,
    now: i64,
) -> Result<NotificationId> {
    conn.execute(
        "INSERT INTO notifications (user_id, kind, content, related_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![user_id, kind, content, related_id, now],
    )?;
    Ok(conn.last_insert_rowid())
}

/// The user's notifications, newest first.
pub fn list(conn: &Connection, user_id: UserId, limit: u32) -> Result<Vec<NotificationRow>> {
    let mut stmt = conn.prepare(
        "SELECT notification_id, user_id, kind, content, related_id, created_at, is_read
         FROM notifications WHERE user_id = ?1
         ORDER BY created_at DESC, notification_id DESC LIMIT ?2",
    )?;
    let rows = stmt
        .query_map(rusqlite::params![user_id, limit], |row| {
            Ok(NotificationRow {
                notification_id: row.get(0)?,
                user_id: row.get(1)?,
                kind: row.get(2)?,
                content: row.get(3)?,
                related_id: row.get(4)?,
                created_at: row.get(5)?,
                is_read: row.get(6)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Mark a notification read. Returns `false` if it did not exist.
pub fn mark_read(conn: &Connection, notification_id: NotificationId) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE notifications SET is_read = 1 WHERE notification_id = ?1",
        [notification_id],
    )?;
    Ok(updated > 0)
}

/// Get the user's settings row, if present.
pub fn get_settings(conn: &Connection, user_id: UserId) -> Result<Option<NotificationSettings>> {
    let row = conn
        .query_row(
            "SELECT notify_likes, notify_comments, notify_mentions, notify_friend_requests
             FROM notification_settings WHERE user_id = ?1",
            [user_id],
            |row| {
                Ok(NotificationSettings {
                    likes: row.get(0)?,
                    comments: row.get(1)?,
                    mentions: row.get(2)?,
                    friend_requests: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}

/// Insert a default (all-true) settings row if none exists.
pub fn insert_default_settings(conn: &Connection, user_id: UserId) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO notification_settings (user_id) VALUES (?1)",
        [user_id],
    )?;
    Ok(())
}

/// Overwrite the user's settings row.
pub fn update_settings(
    conn: &Connection,
    user_id: UserId,
    settings: NotificationSettings,
) -> Result<()> {
    conn.execute(
        "INSERT INTO notification_settings
             (user_id, notify_likes, notify_comments, notify_mentions, notify_friend_requests)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(user_id) DO UPDATE SET
             notify_likes = ?2, notify_comments = ?3,
             notify_mentions = ?4, notify_friend_requests = ?5",
        rusqlite::params![
            user_id,
            settings.likes,
            settings.comments,
            settings.mentions,
            settings.friend_requests,
        ],
    )?;
    Ok(())
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
    fn test_insert_and_list() {
        let conn = test_db();
        insert(&conn, 1, "like", "someone liked your post", Some(7), 1000).expect("insert");
        insert(&conn, 1, "comment", "new comment", Some(7), 1001).expect("insert");

        let rows = list(&conn, 1, 10).expect("list");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].kind, "comment"); // newest first
        assert!(!rows[0].is_read);
    }

    #[test]
    fn test_mark_read() {
        let conn = test_db();
        let id = insert(&conn, 1, "like", "x", None, 1000).expect("insert");
        assert!(mark_read(&conn, id).expect("mark"));
        assert!(!mark_read(&conn, id + 1).expect("missing"));

        let rows = list(&conn, 1, 10).expect("list");
        assert!(rows[0].is_read);
    }

    #[test]
    fn test_settings_lazy_default() {
        let conn = test_db();
        assert!(get_settings(&conn, 1).expect("get").is_none());

        insert_default_settings(&conn, 1).expect("default");
        let settings = get_settings(&conn, 1).expect("get").expect("present");
        assert_eq!(settings, NotificationSettings::default());
    }

    #[test]
    fn test_settings_update() {
        let conn = test_db();
        let settings = NotificationSettings {
            comments: false,
            ..NotificationSettings::default()
        };
        update_settings(&conn, 1, settings).expect("update");

        let stored = get_settings(&conn, 1).expect("get").expect("present");
        assert!(!stored.comments);
        assert!(stored.likes);
    }
}

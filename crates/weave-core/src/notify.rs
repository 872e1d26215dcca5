//! The notification router: preference-gated fan-out with 200-char
//! truncation, plus the notification and settings surface of [`Social`].

use rusqlite::Connection;

use weave_db::queries::notifications;
use weave_types::notify::{Notification, NotificationEvent, NotificationSettings};
use weave_types::{NotificationId, UserId, MAX_NOTIFICATION_LEN};

use crate::{CoreError, Result, Social};

/// Persist a notification for the event's recipient, subject to their
/// preference toggles. Returns whether a row was created.
///
/// The settings row is created lazily (all-true) on first consultation.
pub(crate) fn route(conn: &Connection, event: &NotificationEvent) -> Result<bool> {
    if let Some(toggle) = event.kind.preference_gate() {
        let settings = ensure_settings(conn, event.recipient)?;
        if !settings.allows(toggle) {
            tracing::debug!(
                recipient = event.recipient,
                kind = event.kind.as_str(),
                "notification suppressed by preference"
            );
            return Ok(false);
        }
    }

    let content = truncate_content(&event.content);
    notifications::insert(
        conn,
        event.recipient,
        event.kind.as_str(),
        &content,
        event.related_id,
        weave_db::now(),
    )?;
    Ok(true)
}

/// Route an event after the primary action has committed. Failures are
/// logged and swallowed; they never surface to the caller.
pub(crate) fn route_swallow(conn: &Connection, event: &NotificationEvent) {
    if let Err(err) = route(conn, event) {
        tracing::warn!(
            recipient = event.recipient,
            kind = event.kind.as_str(),
            error = %err,
            "failed to persist notification"
        );
    }
}

/// Read the recipient's settings, creating the default row if absent.
pub(crate) fn ensure_settings(conn: &Connection, user_id: UserId) -> Result<NotificationSettings> {
    if let Some(settings) = notifications::get_settings(conn, user_id)? {
        return Ok(settings);
    }
    notifications::insert_default_settings(conn, user_id)?;
    Ok(NotificationSettings::default())
}

/// Truncate rendered content to the notification limit on a char boundary.
fn truncate_content(content: &str) -> String {
    if content.chars().count() <= MAX_NOTIFICATION_LEN {
        return content.to_string();
    }
    content.chars().take(MAX_NOTIFICATION_LEN).collect()
}

impl Social {
    /// The user's notifications, newest first.
    pub fn notifications(&self, user_id: UserId, limit: u32) -> Result<Vec<Notification>> {
        let rows = notifications::list(&self.conn, user_id, limit)?;
        rows.into_iter()
            .map(|row| {
                let kind = row
                    .kind
                    .parse()
                    .map_err(|e: String| CoreError::Persistence(weave_db::DbError::Constraint(e)))?;
                Ok(Notification {
                    notification_id: row.notification_id,
                    recipient: row.user_id,
                    kind,
                    content: row.content,
                    related_id: row.related_id,
                    created_at: row.created_at,
                    is_read: row.is_read,
                })
            })
            .collect()
    }

    /// Mark a notification read.
    pub fn mark_notification_read(&mut self, notification_id: NotificationId) -> Result<()> {
        if !notifications::mark_read(&self.conn, notification_id)? {
            return Err(CoreError::NotFound("notification".into()));
        }
        Ok(())
    }

    /// The user's notification preferences, created as all-true on first
    /// access.
    pub fn notification_settings(&mut self, user_id: UserId) -> Result<NotificationSettings> {
        ensure_settings(&self.conn, user_id)
    }

    /// Overwrite the user's notification preferences.
    pub fn set_notification_settings(
        &mut self,
        user_id: UserId,
        settings: NotificationSettings,
    ) -> Result<()> {
        notifications::update_settings(&self.conn, user_id, settings)?;
        Ok(())
    }
}

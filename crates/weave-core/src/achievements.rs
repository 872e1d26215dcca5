//! Achievement tracking.
//!
//! Each achievement kind is awarded at most once per user. The post-count
//! hook runs inside the post-creation transaction; the friend and group
//! hooks run after their transactions commit. Either way a failed award is
//! logged and never unwinds the action that triggered it.

use rusqlite::Connection;

use weave_db::queries::{achievements, friends, groups, posts};
use weave_types::notify::{AchievementKind, NotificationEvent, NotificationKind};
use weave_types::UserId;

use crate::{notify, Result, Social};

/// Achievement a user has earned.
#[derive(Debug, Clone)]
pub struct Achievement {
    pub kind: AchievementKind,
    pub description: String,
    pub earned_at: i64,
}

const ACTIVE_POSTER_POSTS: i64 = 10;
const SOCIAL_BUTTERFLY_FRIENDS: i64 = 5;
const GROUP_LEADER_GROUPS: i64 = 3;

fn description(kind: AchievementKind) -> &'static str {
    match kind {
        AchievementKind::ActivePoster => "Published 10 posts",
        AchievementKind::SocialButterfly => "Made 5 friends",
        AchievementKind::GroupLeader => "Created 3 groups",
    }
}

/// Award `kind` to the user if they do not hold it yet.
///
/// Returns `true` when a new row was inserted. The `achievement`
/// notification is ungated.
pub(crate) fn award(conn: &Connection, user_id: UserId, kind: AchievementKind) -> Result<bool> {
    if achievements::has(conn, user_id, kind.as_str())? {
        return Ok(false);
    }
    achievements::insert(conn, user_id, kind.as_str(), description(kind), weave_db::now())?;
    notify::route_swallow(
        conn,
        &NotificationEvent {
            recipient: user_id,
            kind: NotificationKind::Achievement,
            content: format!("Achievement unlocked: {}", description(kind)),
            related_id: None,
        },
    );
    tracing::info!(user_id, kind = kind.as_str(), "achievement awarded");
    Ok(true)
}

fn award_swallow(conn: &Connection, user_id: UserId, kind: AchievementKind) {
    if let Err(err) = award(conn, user_id, kind) {
        tracing::warn!(user_id, kind = kind.as_str(), %err, "achievement award failed");
    }
}

/// Creation-path hook: fires on every post whose count is a positive
/// multiple of the threshold.
pub(crate) fn on_post_created(conn: &Connection, user_id: UserId, post_count: i64) {
    if post_count > 0 && post_count % ACTIVE_POSTER_POSTS == 0 {
        award_swallow(conn, user_id, AchievementKind::ActivePoster);
    }
}

/// Hook for a newly accepted friendship; checks the butterfly threshold.
pub(crate) fn on_friend_accepted(conn: &Connection, user_id: UserId) {
    match friends::accepted_friend_count(conn, user_id) {
        Ok(count) if count >= SOCIAL_BUTTERFLY_FRIENDS => {
            award_swallow(conn, user_id, AchievementKind::SocialButterfly);
        }
        Ok(_) => {}
        Err(err) => tracing::warn!(user_id, %err, "friend count check failed"),
    }
}

/// Hook for a newly created group; checks the leader threshold.
pub(crate) fn on_group_created(conn: &Connection, user_id: UserId) {
    match groups::created_count(conn, user_id) {
        Ok(count) if count >= GROUP_LEADER_GROUPS => {
            award_swallow(conn, user_id, AchievementKind::GroupLeader);
        }
        Ok(_) => {}
        Err(err) => tracing::warn!(user_id, %err, "group count check failed"),
    }
}

impl Social {
    /// Re-evaluate every threshold for the user and award anything missing.
    ///
    /// Returns the kinds newly awarded by this call.
    pub fn evaluate_achievements(&mut self, user_id: UserId) -> Result<Vec<AchievementKind>> {
        let mut earned = Vec::new();

        if posts::count_by_author(&self.conn, user_id)? >= ACTIVE_POSTER_POSTS
            && award(&self.conn, user_id, AchievementKind::ActivePoster)?
        {
            earned.push(AchievementKind::ActivePoster);
        }
        if friends::accepted_friend_count(&self.conn, user_id)? >= SOCIAL_BUTTERFLY_FRIENDS
            && award(&self.conn, user_id, AchievementKind::SocialButterfly)?
        {
            earned.push(AchievementKind::SocialButterfly);
        }
        if groups::created_count(&self.conn, user_id)? >= GROUP_LEADER_GROUPS
            && award(&self.conn, user_id, AchievementKind::GroupLeader)?
        {
            earned.push(AchievementKind::GroupLeader);
        }
        Ok(earned)
    }

    /// Achievements the user holds, oldest first.
    pub fn achievements(&self, user_id: UserId) -> Result<Vec<Achievement>> {
        let rows = achievements::list(&self.conn, user_id)?;
        rows.into_iter()
            .map(|row| {
                let kind = row
                    .kind
                    .parse::<AchievementKind>()
                    .map_err(|_| weave_db::DbError::Constraint(format!(
                        "unknown achievement kind {:?}",
                        row.kind
                    )))?;
                Ok(Achievement {
                    kind,
                    description: row.description,
                    earned_at: row.earned_at,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn social_with_users(count: i64) -> Social {
        let mut social = Social::open_memory().expect("open");
        for id in 1..=count {
            social
                .register(id, &format!("user{id}"), false, "")
                .expect("register");
        }
        social
    }

    #[test]
    fn test_award_is_exactly_once() {
        let social = social_with_users(1);
        assert!(award(social.connection(), 1, AchievementKind::ActivePoster).expect("award"));
        assert!(!award(social.connection(), 1, AchievementKind::ActivePoster).expect("award"));

        let held = social.achievements(1).expect("list");
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].kind, AchievementKind::ActivePoster);
    }

    #[test]
    fn test_award_notifies() {
        let social = social_with_users(1);
        award(social.connection(), 1, AchievementKind::GroupLeader).expect("award");

        let rows = social.notifications(1, 10).expect("list");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kind, NotificationKind::Achievement);
    }

    #[test]
    fn test_social_butterfly_at_five_friends() {
        let mut social = social_with_users(6);
        for friend in 2..=5 {
            social.send_friend_request(1, friend).expect("request");
        }
        assert!(social.achievements(1).expect("list").is_empty());

        social.send_friend_request(1, 6).expect("request");
        let held = social.achievements(1).expect("list");
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].kind, AchievementKind::SocialButterfly);
    }

    #[test]
    fn test_evaluate_awards_missing_kinds() {
        let mut social = social_with_users(6);
        for friend in 2..=6 {
            // Manual edges skip the trigger hook; evaluate must catch up.
            weave_db::queries::friends::insert_edge(
                social.connection(),
                1,
                friend,
                weave_types::social::FriendStatus::Accepted,
                100,
            )
            .expect("edge");
        }

        let earned = social.evaluate_achievements(1).expect("evaluate");
        assert_eq!(earned, vec![AchievementKind::SocialButterfly]);

        // Second run is a no-op.
        assert!(social.evaluate_achievements(1).expect("evaluate").is_empty());
    }
}

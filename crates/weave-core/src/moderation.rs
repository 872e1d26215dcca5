//! Reports, platform admins, bans, ad review, and post removal.
//!
//! A ban is modelled as a block held by the system account (user id 0)
//! plus a forced-private profile; `is_banned` reads the marker back.

use weave_db::queries::{economy, friends, moderation, posts, users};
use weave_types::market::{AdStatus, AdminRole, ReportTarget};
use weave_types::notify::{NotificationEvent, NotificationKind};
use weave_types::{AdId, PostId, UserId, MAX_REPORT_REASON_LEN, SYSTEM_USER};

use crate::{constraint_to_conflict, notify, validate_len, visibility, CoreError, Result, Social};

impl Social {
    /// File a report against a post, user, item, or ad.
    pub fn report(
        &mut self,
        reporter_id: UserId,
        target_id: i64,
        target: ReportTarget,
        reason: &str,
    ) -> Result<i64> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(CoreError::Validation("report reason must not be empty".into()));
        }
        validate_len(reason, MAX_REPORT_REASON_LEN, "report reason")?;
        if !users::exists(&self.conn, reporter_id)? {
            return Err(CoreError::NotFound("reporter".into()));
        }
        match target {
            ReportTarget::Post => {
                if !visibility::can_interact(&self.conn, reporter_id, target_id)? {
                    return Err(CoreError::Permission("post is not visible to you".into()));
                }
            }
            ReportTarget::User => {
                if !users::exists(&self.conn, target_id)? {
                    return Err(CoreError::NotFound("reported user".into()));
                }
            }
            ReportTarget::Item | ReportTarget::Ad => {}
        }

        let report_id = moderation::insert_report(
            &self.conn,
            reporter_id,
            target_id,
            target.as_str(),
            reason,
            weave_db::now(),
        )?;
        tracing::info!(reporter_id, target_id, target = target.as_str(), "report filed");
        Ok(report_id)
    }

    /// Reports filed against a target so far.
    pub fn report_count(&self, target_id: i64, target: ReportTarget) -> Result<i64> {
        Ok(moderation::report_count(&self.conn, target_id, target.as_str())?)
    }

    /// The user's admin role, if they hold one.
    pub fn admin_role(&self, user_id: UserId) -> Result<Option<AdminRole>> {
        let role = moderation::admin_role(&self.conn, user_id)?;
        match role {
            Some(role) => {
                let parsed = role.parse().map_err(|_| {
                    weave_db::DbError::Constraint(format!("unknown admin role {role:?}"))
                })?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    fn require_admin(&self, user_id: UserId) -> Result<AdminRole> {
        self.admin_role(user_id)?
            .ok_or_else(|| CoreError::Permission("admin role required".into()))
    }

    /// Grant a user an admin role.
    pub fn appoint_admin(&mut self, user_id: UserId, role: AdminRole) -> Result<()> {
        if !users::exists(&self.conn, user_id)? {
            return Err(CoreError::NotFound("user".into()));
        }
        moderation::insert_admin(&self.conn, user_id, role.as_str(), weave_db::now())
            .map_err(|e| constraint_to_conflict(e, "already an admin"))?;
        tracing::info!(user_id, role = role.as_str(), "admin appointed");
        Ok(())
    }

    /// Revoke a user's admin role.
    pub fn remove_admin(&mut self, user_id: UserId) -> Result<()> {
        if !moderation::delete_admin(&self.conn, user_id)? {
            return Err(CoreError::NotFound("admin".into()));
        }
        tracing::info!(user_id, "admin removed");
        Ok(())
    }

    /// Ban a user by handle: a system block plus a forced-private profile.
    pub fn ban_user(&mut self, admin_id: UserId, handle: &str, reason: &str) -> Result<()> {
        self.require_admin(admin_id)?;
        let target = users::by_handle(&self.conn, handle)?
            .ok_or_else(|| CoreError::NotFound("handle".into()))?;
        if friends::is_blocked(&self.conn, SYSTEM_USER, target.user_id)? {
            return Err(CoreError::Conflict("user is already banned".into()));
        }

        let tx = self.conn.transaction()?;
        friends::insert_block(&tx, SYSTEM_USER, target.user_id, weave_db::now())?;
        users::set_privacy(&tx, target.user_id, true)?;
        tx.commit()?;

        notify::route_swallow(
            &self.conn,
            &NotificationEvent {
                recipient: target.user_id,
                kind: NotificationKind::Ban,
                content: format!("Your account was banned: {reason}"),
                related_id: None,
            },
        );
        tracing::warn!(admin_id, banned = target.user_id, reason, "user banned");
        Ok(())
    }

    /// Whether the user carries the system ban marker.
    pub fn is_banned(&self, user_id: UserId) -> Result<bool> {
        Ok(friends::is_blocked(&self.conn, SYSTEM_USER, user_id)?)
    }

    /// Approve or reject a pending ad.
    pub fn review_ad(&mut self, admin_id: UserId, ad_id: AdId, approve: bool) -> Result<()> {
        self.require_admin(admin_id)?;
        let ad = economy::get_ad(&self.conn, ad_id)?
            .ok_or_else(|| CoreError::NotFound("ad".into()))?;

        let status = if approve {
            AdStatus::Active
        } else {
            AdStatus::Rejected
        };
        economy::set_ad_status(&self.conn, ad_id, status.as_str())?;

        let verdict = if approve { "approved" } else { "rejected" };
        notify::route_swallow(
            &self.conn,
            &NotificationEvent {
                recipient: ad.creator_id,
                kind: NotificationKind::AdReview,
                content: format!("Your ad was {verdict}"),
                related_id: Some(ad_id),
            },
        );
        tracing::info!(admin_id, ad_id, verdict, "ad reviewed");
        Ok(())
    }

    /// Remove a post as a moderation action.
    pub fn delete_post(&mut self, admin_id: UserId, post_id: PostId) -> Result<()> {
        self.require_admin(admin_id)?;
        if !posts::delete(&self.conn, post_id)? {
            return Err(CoreError::NotFound("post".into()));
        }
        tracing::warn!(admin_id, post_id, "post deleted by moderation");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn social_with_admin() -> Social {
        let mut social = Social::open_memory().expect("open");
        social.register(1, "alice", false, "").expect("register");
        social.register(2, "bob", false, "").expect("register");
        social.appoint_admin(1, AdminRole::Moderator).expect("appoint");
        social
    }

    #[test]
    fn test_admin_lifecycle() {
        let mut social = social_with_admin();
        assert_eq!(social.admin_role(1).expect("role"), Some(AdminRole::Moderator));
        assert_eq!(social.admin_role(2).expect("role"), None);

        social.remove_admin(1).expect("remove");
        assert!(matches!(
            social.remove_admin(1),
            Err(CoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_non_admin_actions_denied() {
        let mut social = social_with_admin();
        assert!(matches!(
            social.ban_user(2, "alice", "nope"),
            Err(CoreError::Permission(_))
        ));
        assert!(matches!(
            social.delete_post(2, 1),
            Err(CoreError::Permission(_))
        ));
    }

    #[test]
    fn test_ban_marks_and_forces_private() {
        let mut social = social_with_admin();
        assert!(!social.is_banned(2).expect("check"));

        social.ban_user(1, "bob", "spam").expect("ban");

        assert!(social.is_banned(2).expect("check"));
        assert!(social.profile(2).expect("profile").is_private);

        let rows = social.notifications(2, 10).expect("list");
        assert_eq!(rows[0].kind, NotificationKind::Ban);
        assert!(matches!(
            social.ban_user(1, "bob", "again"),
            Err(CoreError::Conflict(_))
        ));
    }

    #[test]
    fn test_report_requires_visible_post() {
        let mut social = social_with_admin();
        let post = social.create_post(1, "mine", None, None).expect("post");
        social.block_user(1, 2).expect("block");

        assert!(matches!(
            social.report(2, post, ReportTarget::Post, "spam"),
            Err(CoreError::Permission(_))
        ));

        social.unblock_user(1, 2).expect("unblock");
        social.report(2, post, ReportTarget::Post, "spam").expect("report");
        assert_eq!(social.report_count(post, ReportTarget::Post).expect("count"), 1);
    }

    #[test]
    fn test_ad_review_notifies_creator() {
        let mut social = social_with_admin();
        let ad = social.create_ad(2, "lamps for sale", 5, None).expect("ad");

        social.review_ad(1, ad, true).expect("review");
        assert_eq!(social.active_ads(10, 0).expect("list").len(), 1);

        let rows = social.notifications(2, 10).expect("list");
        assert_eq!(rows[0].kind, NotificationKind::AdReview);
    }

    #[test]
    fn test_delete_post() {
        let mut social = social_with_admin();
        let post = social.create_post(2, "spam", None, None).expect("post");

        social.delete_post(1, post).expect("delete");
        assert!(posts::get(social.connection(), post).expect("get").is_none());
        assert!(matches!(
            social.delete_post(1, post),
            Err(CoreError::NotFound(_))
        ));
    }
}

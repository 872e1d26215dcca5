//! The friendship & block state machine.
//!
//! States per ordered pair (A, B): none -> pending(A->B) -> accepted(A<->B)
//! or rejected. An accepted friendship is two directed accepted edges;
//! blocking removes all edges between the pair before inserting the block.

use serde::{Deserialize, Serialize};

use weave_db::queries::{friends, users};
use weave_types::notify::{NotificationEvent, NotificationKind};
use weave_types::social::FriendStatus;
use weave_types::UserId;

use crate::{achievements, constraint_to_conflict, notify, CoreError, Result, Social};

/// Outcome of a friend request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendRequestOutcome {
    /// Target profile is public: both accepted edges were created.
    Accepted,
    /// Target profile is private: a single pending edge awaits response.
    Pending,
}

impl Social {
    /// Send a friend request from `user_id` to `target_id`.
    ///
    /// A public target accepts immediately; a private target receives a
    /// pending request.
    pub fn send_friend_request(
        &mut self,
        user_id: UserId,
        target_id: UserId,
    ) -> Result<FriendRequestOutcome> {
        if user_id == target_id {
            return Err(CoreError::Validation("cannot befriend yourself".into()));
        }
        let sender = users::get(&self.conn, user_id)?
            .ok_or_else(|| CoreError::NotFound("sender".into()))?;
        let target = users::get(&self.conn, target_id)?
            .ok_or_else(|| CoreError::NotFound("target user".into()))?;

        if friends::blocked_either_way(&self.conn, user_id, target_id)? {
            return Err(CoreError::Permission("a block exists between this pair".into()));
        }
        if friends::edge_exists_between(&self.conn, user_id, target_id)? {
            return Err(CoreError::Conflict(
                "a friend edge already exists between this pair".into(),
            ));
        }

        let now = weave_db::now();
        if target.is_private {
            friends::insert_edge(&self.conn, user_id, target_id, FriendStatus::Pending, now)
                .map_err(|e| constraint_to_conflict(e, "friend request already exists"))?;

            notify::route_swallow(
                &self.conn,
                &NotificationEvent {
                    recipient: target_id,
                    kind: NotificationKind::FriendRequest,
                    content: format!("Friend request from {}", sender.handle),
                    related_id: Some(user_id),
                },
            );
            tracing::info!(user_id, target_id, "friend request pending");
            return Ok(FriendRequestOutcome::Pending);
        }

        let tx = self.conn.transaction()?;
        friends::insert_edge(&tx, user_id, target_id, FriendStatus::Accepted, now)?;
        friends::insert_edge(&tx, target_id, user_id, FriendStatus::Accepted, now)?;
        tx.commit()?;

        notify::route_swallow(
            &self.conn,
            &NotificationEvent {
                recipient: target_id,
                kind: NotificationKind::FriendAccepted,
                content: format!("You are now friends with {}", sender.handle),
                related_id: Some(user_id),
            },
        );
        achievements::on_friend_accepted(&self.conn, user_id);
        achievements::on_friend_accepted(&self.conn, target_id);

        tracing::info!(user_id, target_id, "friendship accepted immediately");
        Ok(FriendRequestOutcome::Accepted)
    }

    /// Respond to the pending request `requester_id` -> `user_id`.
    pub fn respond_friend_request(
        &mut self,
        user_id: UserId,
        requester_id: UserId,
        accept: bool,
    ) -> Result<()> {
        let responder = users::get(&self.conn, user_id)?
            .ok_or_else(|| CoreError::NotFound("responder".into()))?;

        let new_status = if accept {
            FriendStatus::Accepted
        } else {
            FriendStatus::Rejected
        };

        let tx = self.conn.transaction()?;
        let moved = friends::set_edge_status(
            &tx,
            requester_id,
            user_id,
            FriendStatus::Pending,
            new_status,
        )?;
        if !moved {
            return Err(CoreError::NotFound("pending friend request".into()));
        }
        if accept {
            friends::insert_edge(&tx, user_id, requester_id, FriendStatus::Accepted, weave_db::now())?;
        }
        tx.commit()?;

        let verdict = if accept { "accepted" } else { "rejected" };
        notify::route_swallow(
            &self.conn,
            &NotificationEvent {
                recipient: requester_id,
                kind: NotificationKind::FriendResponse,
                content: format!("{} {verdict} your friend request", responder.handle),
                related_id: Some(user_id),
            },
        );
        if accept {
            achievements::on_friend_accepted(&self.conn, user_id);
            achievements::on_friend_accepted(&self.conn, requester_id);
        }

        tracing::info!(user_id, requester_id, verdict, "friend request answered");
        Ok(())
    }

    /// Block a user, severing any friendship in both directions first.
    pub fn block_user(&mut self, blocker_id: UserId, target_id: UserId) -> Result<()> {
        if blocker_id == target_id {
            return Err(CoreError::Validation("cannot block yourself".into()));
        }
        if !users::exists(&self.conn, target_id)? {
            return Err(CoreError::NotFound("target user".into()));
        }
        if friends::is_blocked(&self.conn, blocker_id, target_id)? {
            return Err(CoreError::Conflict("already blocked".into()));
        }

        let tx = self.conn.transaction()?;
        friends::delete_edges_between(&tx, blocker_id, target_id)?;
        friends::insert_block(&tx, blocker_id, target_id, weave_db::now())?;
        tx.commit()?;

        tracing::info!(blocker_id, target_id, "user blocked");
        Ok(())
    }

    /// Remove a block. Does not restore any previous friendship.
    pub fn unblock_user(&mut self, blocker_id: UserId, target_id: UserId) -> Result<()> {
        if !friends::delete_block(&self.conn, blocker_id, target_id)? {
            return Err(CoreError::NotFound("block".into()));
        }
        tracing::info!(blocker_id, target_id, "user unblocked");
        Ok(())
    }

    /// Ids of the user's accepted friends.
    pub fn friends(&self, user_id: UserId) -> Result<Vec<UserId>> {
        Ok(friends::accepted_friends(&self.conn, user_id)?)
    }

    /// Ids the user has blocked.
    pub fn blocked_users(&self, user_id: UserId) -> Result<Vec<UserId>> {
        Ok(friends::blocked_by(&self.conn, user_id)?)
    }
}

//! Fail-closed post access checks.
//!
//! A viewer may access a post unless the post is missing, a block exists
//! between viewer and author in either direction, or the post belongs to a
//! group the viewer is not a member of. The author's privacy flag is not
//! consulted here; it only gates friend-request acceptance.

use rusqlite::Connection;

use weave_db::queries::{friends, groups, posts};
use weave_types::{PostId, UserId};

use crate::{Result, Social};

/// Whether the viewer may see the post.
pub(crate) fn can_access(conn: &Connection, viewer: UserId, post_id: PostId) -> Result<bool> {
    let Some(post) = posts::get(conn, post_id)? else {
        return Ok(false);
    };

    if friends::blocked_either_way(conn, viewer, post.user_id)? {
        return Ok(false);
    }

    match post.group_id {
        Some(group_id) => Ok(groups::is_member(conn, group_id, viewer)?),
        None => Ok(true),
    }
}

/// Whether the viewer may interact (react, comment, bookmark, report).
/// Interaction has no separate permission; it delegates to access.
pub(crate) fn can_interact(conn: &Connection, viewer: UserId, post_id: PostId) -> Result<bool> {
    can_access(conn, viewer, post_id)
}

impl Social {
    /// Whether the viewer may see the post.
    pub fn can_access(&self, viewer: UserId, post_id: PostId) -> Result<bool> {
        can_access(&self.conn, viewer, post_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_db::queries::users;
    use weave_types::social::GroupRole;

    fn test_social() -> Social {
        let social = Social::open_memory().expect("open");
        let conn = social.connection();
        users::insert(conn, 1, "alice", false, "", 100).expect("user");
        users::insert(conn, 2, "bob", false, "", 100).expect("user");
        social
    }

    #[test]
    fn test_missing_post_fails_closed() {
        let social = test_social();
        assert!(!social.can_access(1, 999).expect("check"));
    }

    #[test]
    fn test_plain_post_is_open() {
        let social = test_social();
        let post =
            posts::insert(social.connection(), 2, "hi", None, None, None, 1000).expect("post");
        assert!(social.can_access(1, post).expect("check"));
    }

    #[test]
    fn test_block_is_symmetric() {
        let social = test_social();
        let conn = social.connection();
        let by_alice = posts::insert(conn, 1, "a", None, None, None, 1000).expect("post");
        let by_bob = posts::insert(conn, 2, "b", None, None, None, 1000).expect("post");
        friends::insert_block(conn, 1, 2, 100).expect("block");

        assert!(!social.can_access(2, by_alice).expect("check"));
        assert!(!social.can_access(1, by_bob).expect("check"));
    }

    #[test]
    fn test_group_post_requires_membership() {
        let social = test_social();
        let conn = social.connection();
        let group = groups::insert(conn, "g", 2, "", true).expect("group");
        groups::insert_member(conn, group, 2, GroupRole::Admin, 100).expect("member");
        let post = posts::insert(conn, 2, "inside", Some(group), None, None, 1000).expect("post");

        assert!(!social.can_access(1, post).expect("check"));
        groups::insert_member(conn, group, 1, GroupRole::Member, 100).expect("member");
        assert!(social.can_access(1, post).expect("check"));
    }

    #[test]
    fn test_own_access() {
        let social = test_social();
        let post =
            posts::insert(social.connection(), 1, "mine", None, None, None, 1000).expect("post");
        assert!(social.can_access(1, post).expect("check"));
    }
}

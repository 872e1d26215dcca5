//! Groups and group live streams.

use weave_db::queries::{groups, users};
use weave_types::notify::{NotificationEvent, NotificationKind};
use weave_types::social::GroupRole;
use weave_types::{
    GroupId, StreamId, UserId, MAX_GROUP_DESC_LEN, MAX_GROUP_NAME_LEN, MAX_STREAM_TITLE_LEN,
};

use crate::{achievements, constraint_to_conflict, notify, validate_len, CoreError, Result, Social};

/// A group as presented to callers.
#[derive(Debug, Clone)]
pub struct GroupView {
    pub group_id: GroupId,
    pub name: String,
    pub creator_id: UserId,
    pub description: String,
    pub is_public: bool,
}

fn to_view(row: groups::GroupRow) -> GroupView {
    GroupView {
        group_id: row.group_id,
        name: row.name,
        creator_id: row.creator_id,
        description: row.description,
        is_public: row.is_public,
    }
}

impl Social {
    /// Create a group with the creator as its first admin member.
    pub fn create_group(
        &mut self,
        creator_id: UserId,
        name: &str,
        description: &str,
        is_public: bool,
    ) -> Result<GroupId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("group name must not be empty".into()));
        }
        validate_len(name, MAX_GROUP_NAME_LEN, "group name")?;
        validate_len(description, MAX_GROUP_DESC_LEN, "group description")?;
        if !users::exists(&self.conn, creator_id)? {
            return Err(CoreError::NotFound("creator".into()));
        }

        let now = weave_db::now();
        let tx = self.conn.transaction()?;
        let group_id = groups::insert(&tx, name, creator_id, description, is_public)?;
        groups::insert_member(&tx, group_id, creator_id, GroupRole::Admin, now)?;
        tx.commit()?;

        achievements::on_group_created(&self.conn, creator_id);
        tracing::info!(creator_id, group_id, name, "group created");
        Ok(group_id)
    }

    /// Join a public group.
    pub fn join_group(&mut self, user_id: UserId, group_id: GroupId) -> Result<()> {
        let group = groups::get(&self.conn, group_id)?
            .ok_or_else(|| CoreError::NotFound("group".into()))?;
        if !group.is_public {
            return Err(CoreError::Permission("group is private".into()));
        }
        if !users::exists(&self.conn, user_id)? {
            return Err(CoreError::NotFound("user".into()));
        }

        groups::insert_member(&self.conn, group_id, user_id, GroupRole::Member, weave_db::now())
            .map_err(|e| constraint_to_conflict(e, "already a member"))?;
        tracing::info!(user_id, group_id, "joined group");
        Ok(())
    }

    /// Search public groups by name substring.
    pub fn search_groups(&self, keyword: &str, limit: u32) -> Result<Vec<GroupView>> {
        let rows = groups::search_public(&self.conn, keyword, limit)?;
        Ok(rows.into_iter().map(to_view).collect())
    }

    pub fn group(&self, group_id: GroupId) -> Result<GroupView> {
        let row = groups::get(&self.conn, group_id)?
            .ok_or_else(|| CoreError::NotFound("group".into()))?;
        Ok(to_view(row))
    }

    /// Start a live stream in a group, notifying every current member.
    pub fn start_live_stream(
        &mut self,
        user_id: UserId,
        group_id: GroupId,
        title: &str,
    ) -> Result<StreamId> {
        let title = title.trim();
        if title.is_empty() {
            return Err(CoreError::Validation("stream title must not be empty".into()));
        }
        validate_len(title, MAX_STREAM_TITLE_LEN, "stream title")?;
        if groups::get(&self.conn, group_id)?.is_none() {
            return Err(CoreError::NotFound("group".into()));
        }
        if !groups::is_member(&self.conn, group_id, user_id)? {
            return Err(CoreError::Permission(
                "only members may stream in a group".into(),
            ));
        }
        let streamer = users::get(&self.conn, user_id)?
            .ok_or_else(|| CoreError::NotFound("streamer".into()))?;

        let stream_id = groups::insert_stream(&self.conn, user_id, group_id, title, weave_db::now())?;

        for member in groups::member_ids(&self.conn, group_id)? {
            notify::route_swallow(
                &self.conn,
                &NotificationEvent {
                    recipient: member,
                    kind: NotificationKind::LiveStream,
                    content: format!("{} is live: {title}", streamer.handle),
                    related_id: Some(stream_id),
                },
            );
        }

        tracing::info!(user_id, group_id, stream_id, "live stream started");
        Ok(stream_id)
    }

    /// End an active live stream.
    pub fn end_live_stream(&mut self, stream_id: StreamId) -> Result<()> {
        if !groups::end_stream(&self.conn, stream_id)? {
            return Err(CoreError::NotFound("active stream".into()));
        }
        tracing::info!(stream_id, "live stream ended");
        Ok(())
    }
}

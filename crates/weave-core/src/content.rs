//! Posts, reactions, comments, bookmarks, and content search.

use weave_db::queries::{engagement, posts, users};
use weave_types::feed::PostView;
use weave_types::notify::{NotificationEvent, NotificationKind};
use weave_types::social::{Media, ReactionKind};
use weave_types::{CommentId, GroupId, PostId, UserId, MAX_COMMENT_LEN, MAX_POST_LEN};

use crate::{
    achievements, constraint_to_conflict, feed, mentions, notify, validate_len, visibility,
    CoreError, Result, Social,
};

/// A comment with its author's handle.
#[derive(Debug, Clone)]
pub struct CommentView {
    pub comment_id: CommentId,
    pub author_id: UserId,
    pub author_handle: String,
    pub content: String,
    pub created_at: i64,
}

const COMMENT_SNIPPET_CHARS: usize = 50;

fn snippet(text: &str) -> String {
    text.chars().take(COMMENT_SNIPPET_CHARS).collect()
}

impl Social {
    /// Publish a post, optionally into a group the author belongs to.
    ///
    /// Hashtag indexing and the posting-streak achievement check share the
    /// insert's transaction.
    pub fn create_post(
        &mut self,
        author_id: UserId,
        body: &str,
        group_id: Option<GroupId>,
        media: Option<&Media>,
    ) -> Result<PostId> {
        validate_len(body, MAX_POST_LEN, "post body")?;
        if body.trim().is_empty() && media.is_none() {
            return Err(CoreError::Validation("post needs text or media".into()));
        }
        if !users::exists(&self.conn, author_id)? {
            return Err(CoreError::NotFound("author".into()));
        }
        if let Some(group_id) = group_id {
            if weave_db::queries::groups::get(&self.conn, group_id)?.is_none() {
                return Err(CoreError::NotFound("group".into()));
            }
            if !weave_db::queries::groups::is_member(&self.conn, group_id, author_id)? {
                return Err(CoreError::Permission(
                    "only members may post in a group".into(),
                ));
            }
        }

        let tags = mentions::extract_hashtags(body);
        let now = weave_db::now();
        let tx = self.conn.transaction()?;
        let post_id = posts::insert(
            &tx,
            author_id,
            body,
            group_id,
            media.map(|m| m.kind.as_str()),
            media.map(|m| m.reference.as_str()),
            now,
        )?;
        for tag in &tags {
            let tag_id = posts::ensure_hashtag(&tx, tag)?;
            posts::link_hashtag(&tx, post_id, tag_id)?;
        }
        let post_count = posts::count_by_author(&tx, author_id)?;
        achievements::on_post_created(&tx, author_id, post_count);
        tx.commit()?;

        tracing::info!(author_id, post_id, ?group_id, "post created");
        Ok(post_id)
    }

    /// Share someone else's post as a new post of your own.
    pub fn repost(&mut self, user_id: UserId, post_id: PostId) -> Result<PostId> {
        if !visibility::can_access(&self.conn, user_id, post_id)? {
            return Err(CoreError::Permission("post is not visible to you".into()));
        }
        let original = posts::get(&self.conn, post_id)?
            .ok_or_else(|| CoreError::NotFound("post".into()))?;

        let body: String = format!("Repost: {}", original.content)
            .chars()
            .take(MAX_POST_LEN)
            .collect();
        let media = match (original.media_kind, original.media_ref) {
            (Some(kind), Some(reference)) => Some(Media {
                kind: kind
                    .parse()
                    .map_err(|_| CoreError::Validation("unknown media kind".into()))?,
                reference,
            }),
            _ => None,
        };
        self.create_post(user_id, &body, original.group_id, media.as_ref())
    }

    /// React to a post. Re-reacting replaces the previous reaction.
    pub fn react(&mut self, user_id: UserId, post_id: PostId, kind: ReactionKind) -> Result<()> {
        let post = posts::get(&self.conn, post_id)?
            .ok_or_else(|| CoreError::NotFound("post".into()))?;
        if !visibility::can_interact(&self.conn, user_id, post_id)? {
            return Err(CoreError::Permission("post is not visible to you".into()));
        }

        engagement::upsert_reaction(&self.conn, post_id, user_id, kind.as_str(), weave_db::now())?;

        if post.user_id != user_id {
            let reactor = users::get(&self.conn, user_id)?;
            let handle = reactor.map(|u| u.handle).unwrap_or_default();
            notify::route_swallow(
                &self.conn,
                &NotificationEvent {
                    recipient: post.user_id,
                    kind: NotificationKind::Like,
                    content: format!("{handle} reacted to your post"),
                    related_id: Some(post_id),
                },
            );
        }
        Ok(())
    }

    /// Comment on a post, notifying the author and any @mentioned users.
    pub fn comment(&mut self, user_id: UserId, post_id: PostId, text: &str) -> Result<CommentId> {
        validate_len(text, MAX_COMMENT_LEN, "comment")?;
        if text.trim().is_empty() {
            return Err(CoreError::Validation("comment must not be empty".into()));
        }
        let post = posts::get(&self.conn, post_id)?
            .ok_or_else(|| CoreError::NotFound("post".into()))?;
        if !visibility::can_interact(&self.conn, user_id, post_id)? {
            return Err(CoreError::Permission("post is not visible to you".into()));
        }

        let commenter = users::get(&self.conn, user_id)?
            .ok_or_else(|| CoreError::NotFound("commenter".into()))?;
        let comment_id =
            engagement::insert_comment(&self.conn, post_id, user_id, text, weave_db::now())?;

        if post.user_id != user_id {
            notify::route_swallow(
                &self.conn,
                &NotificationEvent {
                    recipient: post.user_id,
                    kind: NotificationKind::Comment,
                    content: format!("{} commented: {}", commenter.handle, snippet(text)),
                    related_id: Some(post_id),
                },
            );
        }
        for handle in mentions::extract_mentions(text) {
            let Some(mentioned) = users::by_handle(&self.conn, &handle)? else {
                continue;
            };
            if mentioned.user_id == user_id {
                continue;
            }
            notify::route_swallow(
                &self.conn,
                &NotificationEvent {
                    recipient: mentioned.user_id,
                    kind: NotificationKind::Mention,
                    content: format!("{} mentioned you in a comment", commenter.handle),
                    related_id: Some(post_id),
                },
            );
        }

        tracing::debug!(user_id, post_id, comment_id, "comment added");
        Ok(comment_id)
    }

    /// Comments on a post the viewer can see, oldest first.
    pub fn comments(&self, viewer_id: UserId, post_id: PostId) -> Result<Vec<CommentView>> {
        if !visibility::can_access(&self.conn, viewer_id, post_id)? {
            return Err(CoreError::Permission("post is not visible to you".into()));
        }
        let rows = engagement::comments_for(&self.conn, post_id)?;
        let mut views = Vec::with_capacity(rows.len());
        for row in rows {
            let handle = users::get(&self.conn, row.user_id)?
                .map(|u| u.handle)
                .unwrap_or_default();
            views.push(CommentView {
                comment_id: row.comment_id,
                author_id: row.user_id,
                author_handle: handle,
                content: row.content,
                created_at: row.comment_date,
            });
        }
        Ok(views)
    }

    /// Save a post for later. Conflict on a duplicate bookmark.
    pub fn bookmark(&mut self, user_id: UserId, post_id: PostId) -> Result<()> {
        if !visibility::can_interact(&self.conn, user_id, post_id)? {
            return Err(CoreError::Permission("post is not visible to you".into()));
        }
        engagement::insert_bookmark(&self.conn, user_id, post_id, weave_db::now())
            .map_err(|e| constraint_to_conflict(e, "already bookmarked"))?;
        Ok(())
    }

    /// Remove a bookmark.
    pub fn unbookmark(&mut self, user_id: UserId, post_id: PostId) -> Result<()> {
        if !engagement::delete_bookmark(&self.conn, user_id, post_id)? {
            return Err(CoreError::NotFound("bookmark".into()));
        }
        Ok(())
    }

    /// The user's saved posts, most recently saved first.
    pub fn bookmarks(&self, user_id: UserId, limit: u32, offset: u32) -> Result<Vec<PostView>> {
        let rows = engagement::bookmarked_posts(&self.conn, user_id, limit, offset)?;
        Ok(rows.into_iter().map(feed::candidate_to_view).collect())
    }

    /// Keyword search over posts visible to the viewer, newest first.
    pub fn search_content(
        &self,
        viewer_id: UserId,
        keyword: &str,
        limit: u32,
    ) -> Result<Vec<PostView>> {
        let rows = posts::search_visible(&self.conn, viewer_id, keyword, limit)?;
        Ok(rows.into_iter().map(feed::candidate_to_view).collect())
    }

    /// Posts carrying a hashtag, newest first. A leading `#` is accepted.
    pub fn search_by_hashtag(&self, tag: &str, limit: u32) -> Result<Vec<PostView>> {
        let tag = tag.trim_start_matches('#').to_lowercase();
        if tag.is_empty() {
            return Err(CoreError::Validation("hashtag must not be empty".into()));
        }
        let rows = posts::by_hashtag(&self.conn, &tag, limit)?;
        Ok(rows.into_iter().map(feed::candidate_to_view).collect())
    }
}

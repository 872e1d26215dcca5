//! Ephemeral stories. A story lives for 24 hours; expiry is checked at
//! read time against the stored timestamp.

use weave_db::queries::{stories, users};
use weave_types::social::{Media, MediaKind};
use weave_types::{StoryId, UserId, MAX_STORY_LEN, STORY_TTL_SECS};

use crate::{validate_len, CoreError, Result, Social};

/// A visible story with its author's handle.
#[derive(Debug, Clone)]
pub struct StoryView {
    pub story_id: StoryId,
    pub author_id: UserId,
    pub author_handle: String,
    pub content: Option<String>,
    pub media: Option<Media>,
    pub created_at: i64,
    pub expires_at: i64,
}

impl Social {
    /// Post a story. At least one of text and media is required.
    pub fn create_story(
        &mut self,
        user_id: UserId,
        content: Option<&str>,
        media: Option<&Media>,
    ) -> Result<StoryId> {
        let content = content.map(str::trim).filter(|c| !c.is_empty());
        if content.is_none() && media.is_none() {
            return Err(CoreError::Validation("story needs text or media".into()));
        }
        if let Some(text) = content {
            validate_len(text, MAX_STORY_LEN, "story")?;
        }
        if !users::exists(&self.conn, user_id)? {
            return Err(CoreError::NotFound("author".into()));
        }

        let now = weave_db::now();
        let story_id = stories::insert(
            &self.conn,
            user_id,
            content,
            media.map(|m| m.kind.as_str()),
            media.map(|m| m.reference.as_str()),
            now,
            now + STORY_TTL_SECS,
        )?;
        tracing::info!(user_id, story_id, "story posted");
        Ok(story_id)
    }

    /// Unexpired stories from the viewer and their accepted friends,
    /// newest first.
    pub fn stories(&self, viewer_id: UserId, limit: u32) -> Result<Vec<StoryView>> {
        let rows = stories::visible(&self.conn, viewer_id, weave_db::now(), limit)?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let media = match (row.media_kind, row.media_ref) {
                    (Some(kind), Some(reference)) => kind
                        .parse::<MediaKind>()
                        .ok()
                        .map(|kind| Media { kind, reference }),
                    _ => None,
                };
                StoryView {
                    story_id: row.story_id,
                    author_id: row.user_id,
                    author_handle: row.author_handle,
                    content: row.content,
                    media,
                    created_at: row.created_at,
                    expires_at: row.expires_at,
                }
            })
            .collect())
    }
}

//! Feed composition types: strategies, filters, and post views.

use serde::{Deserialize, Serialize};

use crate::social::Media;
use crate::{GroupId, PostId, UserId};

/// Ranking strategy for a composed feed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedStrategy {
    /// Accepted friends' posts, newest first.
    ChronologicalFriends,
    /// Posts in the viewer's groups, newest first.
    ChronologicalGroups,
    /// Friends + groups, ordered by likes + comments, ties newest first.
    Popular,
    /// Friends + groups + hashtag discovery, engagement-scored.
    Smart,
}

/// Media filter applied to an already-paginated page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaFilter {
    PhotoOnly,
    VideoOnly,
}

/// A post as rendered into a feed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PostView {
    pub post_id: PostId,
    pub author_id: UserId,
    pub author_handle: String,
    pub content: String,
    pub created_at: i64,
    pub group_id: Option<GroupId>,
    pub media: Option<Media>,
    pub like_count: i64,
    pub comment_count: i64,
}

/// A trending hashtag with its 24-hour post count.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendingTag {
    pub name: String,
    pub post_count: i64,
}

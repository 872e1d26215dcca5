//! Feed composition.
//!
//! The store hands back candidate universes (friends, groups, shared-tag
//! discovery) with block exclusion already applied; everything else is
//! pure in-memory work here: scoring, ordering, pagination, and the
//! optional media filter applied to the paginated page.

use std::collections::BTreeMap;

use weave_db::queries::posts::{self, CandidateRow};
use weave_types::feed::{FeedStrategy, MediaFilter, PostView, TrendingTag};
use weave_types::social::{Media, MediaKind};
use weave_types::{UserId, DAY_SECS, SMART_COMMENT_WEIGHT, SMART_FRESH_BOOST, SMART_LIKE_WEIGHT};

use crate::{Result, Social};

pub(crate) fn candidate_to_view(row: CandidateRow) -> PostView {
    let media = match (row.media_kind, row.media_ref) {
        (Some(kind), Some(reference)) => kind
            .parse::<MediaKind>()
            .ok()
            .map(|kind| Media { kind, reference }),
        _ => None,
    };
    PostView {
        post_id: row.post_id,
        author_id: row.author_id,
        author_handle: row.author_handle,
        content: row.content,
        created_at: row.post_date,
        group_id: row.group_id,
        media,
        like_count: row.like_count,
        comment_count: row.comment_count,
    }
}

/// Engagement score for the smart strategy. Pure so the weighting is
/// testable without a store.
pub fn smart_score(like_count: i64, comment_count: i64, age_secs: i64) -> i64 {
    let mut score = like_count * SMART_LIKE_WEIGHT + comment_count * SMART_COMMENT_WEIGHT;
    if age_secs < DAY_SECS {
        score += SMART_FRESH_BOOST;
    }
    score
}

fn sort_chronological(posts: &mut [PostView]) {
    posts.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then(b.post_id.cmp(&a.post_id))
    });
}

fn sort_popular(posts: &mut [PostView]) {
    posts.sort_by(|a, b| {
        let engagement_a = a.like_count + a.comment_count;
        let engagement_b = b.like_count + b.comment_count;
        engagement_b
            .cmp(&engagement_a)
            .then(b.created_at.cmp(&a.created_at))
            .then(b.post_id.cmp(&a.post_id))
    });
}

fn sort_smart(posts: &mut [PostView], now: i64) {
    posts.sort_by(|a, b| {
        let score_a = smart_score(a.like_count, a.comment_count, now - a.created_at);
        let score_b = smart_score(b.like_count, b.comment_count, now - b.created_at);
        score_b
            .cmp(&score_a)
            .then(b.created_at.cmp(&a.created_at))
            .then(b.post_id.cmp(&a.post_id))
    });
}

fn matches_filter(view: &PostView, filter: MediaFilter) -> bool {
    match (&view.media, filter) {
        (Some(media), MediaFilter::PhotoOnly) => media.kind == MediaKind::Photo,
        (Some(media), MediaFilter::VideoOnly) => media.kind == MediaKind::Video,
        (None, _) => false,
    }
}

fn paginate(posts: Vec<PostView>, limit: u32, offset: u32) -> Vec<PostView> {
    posts
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect()
}

impl Social {
    /// Compose the viewer's feed under the given strategy.
    ///
    /// Limit/offset are applied after ordering; the media filter is applied
    /// to the already-paginated page, so a filtered page may come back
    /// short.
    pub fn compose_feed(
        &self,
        viewer: UserId,
        strategy: FeedStrategy,
        limit: u32,
        offset: u32,
        media_filter: Option<MediaFilter>,
    ) -> Result<Vec<PostView>> {
        // Deduplicate by post id when strategies union several universes.
        let mut candidates: BTreeMap<i64, CandidateRow> = BTreeMap::new();
        let mut absorb = |rows: Vec<CandidateRow>| {
            for row in rows {
                candidates.entry(row.post_id).or_insert(row);
            }
        };

        match strategy {
            FeedStrategy::ChronologicalFriends => {
                absorb(posts::friend_candidates(&self.conn, viewer)?);
            }
            FeedStrategy::ChronologicalGroups => {
                absorb(posts::group_candidates(&self.conn, viewer)?);
            }
            FeedStrategy::Popular => {
                absorb(posts::friend_candidates(&self.conn, viewer)?);
                absorb(posts::group_candidates(&self.conn, viewer)?);
            }
            FeedStrategy::Smart => {
                absorb(posts::friend_candidates(&self.conn, viewer)?);
                absorb(posts::group_candidates(&self.conn, viewer)?);
                absorb(posts::discovery_candidates(&self.conn, viewer)?);
            }
        }

        let mut views: Vec<PostView> = candidates
            .into_values()
            .map(candidate_to_view)
            .collect();

        match strategy {
            FeedStrategy::ChronologicalFriends | FeedStrategy::ChronologicalGroups => {
                sort_chronological(&mut views);
            }
            FeedStrategy::Popular => sort_popular(&mut views),
            FeedStrategy::Smart => sort_smart(&mut views, weave_db::now()),
        }

        let mut page = paginate(views, limit, offset);
        if let Some(filter) = media_filter {
            page.retain(|view| matches_filter(view, filter));
        }

        tracing::debug!(viewer, ?strategy, returned = page.len(), "feed composed");
        Ok(page)
    }

    /// Hashtags used in the last 24 hours, most used first.
    pub fn trending_hashtags(&self, limit: u32) -> Result<Vec<TrendingTag>> {
        let since = weave_db::now() - DAY_SECS;
        let rows = posts::trending_tags(&self.conn, since, limit)?;
        Ok(rows
            .into_iter()
            .map(|(name, post_count)| TrendingTag { name, post_count })
            .collect())
    }
}

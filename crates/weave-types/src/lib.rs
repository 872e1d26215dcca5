//! # weave-types
//!
//! Shared domain types used across the Weave workspace: identifiers,
//! validation limits, and the enums and view structs exchanged between the
//! store, the core, and the presentation layer.

pub mod feed;
pub mod market;
pub mod notify;
pub mod social;

/// Common identifier aliases.
pub type UserId = i64;
pub type PostId = i64;
pub type GroupId = i64;
pub type CommentId = i64;
pub type StoryId = i64;
pub type StreamId = i64;
pub type ItemId = i64;
pub type AdId = i64;
pub type NotificationId = i64;

/// Reserved identity for system-originated records (bans).
pub const SYSTEM_USER: UserId = 0;

/// Seconds in a day; also the story lifetime and the "fresh post" window.
pub const DAY_SECS: i64 = 24 * 60 * 60;

/// Story lifetime in seconds (24 hours, filtered at read time).
pub const STORY_TTL_SECS: i64 = DAY_SECS;

/// Daily bonus amount in coins.
pub const DAILY_BONUS: i64 = 10;

// Text-length limits enforced by the core before any write.
pub const MAX_HANDLE_LEN: usize = 30;
pub const MAX_BIO_LEN: usize = 200;
pub const MAX_POST_LEN: usize = 1000;
pub const MAX_COMMENT_LEN: usize = 500;
pub const MAX_NOTIFICATION_LEN: usize = 200;
pub const MAX_GROUP_NAME_LEN: usize = 50;
pub const MAX_GROUP_DESC_LEN: usize = 200;
pub const MAX_ITEM_TITLE_LEN: usize = 100;
pub const MAX_ITEM_DESC_LEN: usize = 500;
pub const MAX_AD_LEN: usize = 500;
pub const MAX_REPORT_REASON_LEN: usize = 200;
pub const MAX_STORY_LEN: usize = 200;
pub const MAX_STREAM_TITLE_LEN: usize = 100;

// Smart-feed scoring weights.
pub const SMART_LIKE_WEIGHT: i64 = 2;
pub const SMART_COMMENT_WEIGHT: i64 = 3;
pub const SMART_FRESH_BOOST: i64 = 10;

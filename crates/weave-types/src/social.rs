//! Social graph structures: friend edges, roles, reactions, media.

use serde::{Deserialize, Serialize};

use crate::UserId;

/// Status of a directed friend edge.
///
/// An accepted friendship is two accepted edges, one per direction; a
/// pending request is a single edge owner -> target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendStatus {
    Pending,
    Accepted,
    Rejected,
}

impl FriendStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FriendStatus::Pending => "pending",
            FriendStatus::Accepted => "accepted",
            FriendStatus::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for FriendStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(FriendStatus::Pending),
            "accepted" => Ok(FriendStatus::Accepted),
            "rejected" => Ok(FriendStatus::Rejected),
            other => Err(format!("unknown friend status: {other}")),
        }
    }
}

/// Role within a group. The creator is auto-admin at creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupRole {
    Admin,
    Moderator,
    Member,
}

impl GroupRole {
    pub fn as_str(self) -> &'static str {
        match self {
            GroupRole::Admin => "admin",
            GroupRole::Moderator => "moderator",
            GroupRole::Member => "member",
        }
    }
}

impl std::str::FromStr for GroupRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(GroupRole::Admin),
            "moderator" => Ok(GroupRole::Moderator),
            "member" => Ok(GroupRole::Member),
            other => Err(format!("unknown group role: {other}")),
        }
    }
}

/// Reaction kind. Unique per (post, user); re-reacting overwrites.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionKind {
    Like,
    Love,
    Laugh,
    Wow,
    Sad,
    Angry,
}

impl ReactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReactionKind::Like => "like",
            ReactionKind::Love => "love",
            ReactionKind::Laugh => "laugh",
            ReactionKind::Wow => "wow",
            ReactionKind::Sad => "sad",
            ReactionKind::Angry => "angry",
        }
    }
}

impl std::str::FromStr for ReactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(ReactionKind::Like),
            "love" => Ok(ReactionKind::Love),
            "laugh" => Ok(ReactionKind::Laugh),
            "wow" => Ok(ReactionKind::Wow),
            "sad" => Ok(ReactionKind::Sad),
            "angry" => Ok(ReactionKind::Angry),
            other => Err(format!("unknown reaction kind: {other}")),
        }
    }
}

/// Kind of an attached media reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Photo,
    Video,
    Document,
    Sticker,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
            MediaKind::Document => "document",
            MediaKind::Sticker => "sticker",
        }
    }
}

impl std::str::FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "photo" => Ok(MediaKind::Photo),
            "video" => Ok(MediaKind::Video),
            "document" => Ok(MediaKind::Document),
            "sticker" => Ok(MediaKind::Sticker),
            other => Err(format!("unknown media kind: {other}")),
        }
    }
}

/// Opaque media reference. Storage and transcoding live elsewhere.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    pub kind: MediaKind,
    /// External storage handle.
    pub reference: String,
}

/// A user profile as seen by the core.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    pub handle: String,
    pub is_private: bool,
    pub bio: String,
    pub registered_at: i64,
    pub last_seen: i64,
}

/// Fields of a profile update; `None` leaves the field untouched.
#[derive(Clone, Debug, Default)]
pub struct ProfileUpdate {
    pub handle: Option<String>,
    pub bio: Option<String>,
    pub is_private: Option<bool>,
}

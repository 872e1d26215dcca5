//! Notification kinds, events, and per-user preference toggles.

use serde::{Deserialize, Serialize};

use crate::UserId;

/// All notification kinds the router can emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Like,
    Comment,
    Mention,
    FriendRequest,
    FriendAccepted,
    FriendResponse,
    Transfer,
    ItemSold,
    AdReview,
    Achievement,
    Ban,
    LiveStream,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Like => "like",
            NotificationKind::Comment => "comment",
            NotificationKind::Mention => "mention",
            NotificationKind::FriendRequest => "friend_request",
            NotificationKind::FriendAccepted => "friend_accepted",
            NotificationKind::FriendResponse => "friend_response",
            NotificationKind::Transfer => "transfer",
            NotificationKind::ItemSold => "item_sold",
            NotificationKind::AdReview => "ad_review",
            NotificationKind::Achievement => "achievement",
            NotificationKind::Ban => "ban",
            NotificationKind::LiveStream => "live_stream",
        }
    }

    /// The preference toggle gating this kind, if any. Ungated kinds are
    /// always delivered.
    pub fn preference_gate(self) -> Option<PreferenceToggle> {
        match self {
            NotificationKind::Like => Some(PreferenceToggle::Likes),
            NotificationKind::Comment => Some(PreferenceToggle::Comments),
            NotificationKind::Mention => Some(PreferenceToggle::Mentions),
            NotificationKind::FriendRequest => Some(PreferenceToggle::FriendRequests),
            _ => None,
        }
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(NotificationKind::Like),
            "comment" => Ok(NotificationKind::Comment),
            "mention" => Ok(NotificationKind::Mention),
            "friend_request" => Ok(NotificationKind::FriendRequest),
            "friend_accepted" => Ok(NotificationKind::FriendAccepted),
            "friend_response" => Ok(NotificationKind::FriendResponse),
            "transfer" => Ok(NotificationKind::Transfer),
            "item_sold" => Ok(NotificationKind::ItemSold),
            "ad_review" => Ok(NotificationKind::AdReview),
            "achievement" => Ok(NotificationKind::Achievement),
            "ban" => Ok(NotificationKind::Ban),
            "live_stream" => Ok(NotificationKind::LiveStream),
            other => Err(format!("unknown notification kind: {other}")),
        }
    }
}

/// One of the four per-user notification toggles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceToggle {
    Likes,
    Comments,
    Mentions,
    FriendRequests,
}

/// Per-user notification preferences. Defaults all-true; the settings row
/// is created lazily on first access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub likes: bool,
    pub comments: bool,
    pub mentions: bool,
    pub friend_requests: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        NotificationSettings {
            likes: true,
            comments: true,
            mentions: true,
            friend_requests: true,
        }
    }
}

impl NotificationSettings {
    /// Whether the given toggle allows delivery.
    pub fn allows(&self, toggle: PreferenceToggle) -> bool {
        match toggle {
            PreferenceToggle::Likes => self.likes,
            PreferenceToggle::Comments => self.comments,
            PreferenceToggle::Mentions => self.mentions,
            PreferenceToggle::FriendRequests => self.friend_requests,
        }
    }
}

/// An event handed to the notification router for fan-out.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub recipient: UserId,
    pub kind: NotificationKind,
    /// Rendered content; truncated to 200 chars before persisting.
    pub content: String,
    pub related_id: Option<i64>,
}

/// A persisted notification row as returned to the presentation layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Notification {
    pub notification_id: i64,
    pub recipient: UserId,
    pub kind: NotificationKind,
    pub content: String,
    pub related_id: Option<i64>,
    pub created_at: i64,
    pub is_read: bool,
}

/// Achievement kinds awarded by the tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementKind {
    /// Post count reached a positive multiple of 10.
    ActivePoster,
    /// Accepted-friend count reached 5.
    SocialButterfly,
    /// Created-group count reached 3.
    GroupLeader,
}

impl AchievementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AchievementKind::ActivePoster => "active_poster",
            AchievementKind::SocialButterfly => "social_butterfly",
            AchievementKind::GroupLeader => "group_leader",
        }
    }
}

impl std::str::FromStr for AchievementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active_poster" => Ok(AchievementKind::ActivePoster),
            "social_butterfly" => Ok(AchievementKind::SocialButterfly),
            "group_leader" => Ok(AchievementKind::GroupLeader),
            other => Err(format!("unknown achievement kind: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gated_kinds() {
        assert_eq!(
            NotificationKind::Like.preference_gate(),
            Some(PreferenceToggle::Likes)
        );
        assert_eq!(
            NotificationKind::Mention.preference_gate(),
            Some(PreferenceToggle::Mentions)
        );
        assert_eq!(NotificationKind::Achievement.preference_gate(), None);
        assert_eq!(NotificationKind::LiveStream.preference_gate(), None);
        assert_eq!(NotificationKind::FriendAccepted.preference_gate(), None);
    }

    #[test]
    fn test_defaults_all_true() {
        let settings = NotificationSettings::default();
        for toggle in [
            PreferenceToggle::Likes,
            PreferenceToggle::Comments,
            PreferenceToggle::Mentions,
            PreferenceToggle::FriendRequests,
        ] {
            assert!(settings.allows(toggle));
        }
    }

    #[test]
    fn test_kind_round_trip() {
        let kind: NotificationKind = "friend_request".parse().expect("parse");
        assert_eq!(kind, NotificationKind::FriendRequest);
        assert_eq!(kind.as_str(), "friend_request");
    }
}

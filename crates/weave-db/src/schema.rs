//! SQL schema definitions.

/// Complete schema for Weave v1 database.
pub const SCHEMA_V1: &str = r#"
-- ============================================================
-- Users & Social Graph
-- ============================================================

CREATE TABLE IF NOT EXISTS users (
    user_id INTEGER PRIMARY KEY,
    handle TEXT NOT NULL UNIQUE,
    reg_date INTEGER NOT NULL,
    last_seen INTEGER NOT NULL,
    is_private INTEGER NOT NULL DEFAULT 0,
    bio TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS friends (
    user_id INTEGER NOT NULL REFERENCES users(user_id),
    friend_id INTEGER NOT NULL REFERENCES users(user_id),
    status TEXT NOT NULL CHECK (status IN ('pending', 'accepted', 'rejected')) DEFAULT 'pending',
    created_at INTEGER NOT NULL,
    PRIMARY KEY (user_id, friend_id)
);

CREATE INDEX IF NOT EXISTS idx_friends_friend ON friends(friend_id);

CREATE TABLE IF NOT EXISTS blocks (
    blocker_id INTEGER NOT NULL REFERENCES users(user_id),
    blocked_id INTEGER NOT NULL REFERENCES users(user_id),
    created_at INTEGER NOT NULL,
    PRIMARY KEY (blocker_id, blocked_id)
);

CREATE INDEX IF NOT EXISTS idx_blocks_blocked ON blocks(blocked_id);

-- ============================================================
-- Groups & Live Streams
-- ============================================================

CREATE TABLE IF NOT EXISTS groups (
    group_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    creator_id INTEGER NOT NULL REFERENCES users(user_id),
    description TEXT NOT NULL DEFAULT '',
    is_public INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS group_members (
    group_id INTEGER NOT NULL REFERENCES groups(group_id),
    user_id INTEGER NOT NULL REFERENCES users(user_id),
    role TEXT NOT NULL CHECK (role IN ('admin', 'moderator', 'member')) DEFAULT 'member',
    joined_at INTEGER NOT NULL,
    PRIMARY KEY (group_id, user_id)
);

CREATE INDEX IF NOT EXISTS idx_group_members_user ON group_members(user_id);

CREATE TABLE IF NOT EXISTS live_streams (
    stream_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(user_id),
    group_id INTEGER NOT NULL REFERENCES groups(group_id),
    title TEXT NOT NULL,
    started_at INTEGER NOT NULL,
    status TEXT NOT NULL CHECK (status IN ('active', 'ended')) DEFAULT 'active'
);

-- ============================================================
-- Posts, Hashtags & Engagement
-- ============================================================

CREATE TABLE IF NOT EXISTS posts (
    post_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(user_id),
    content TEXT NOT NULL,
    post_date INTEGER NOT NULL,
    group_id INTEGER REFERENCES groups(group_id),
    media_kind TEXT,
    media_ref TEXT
);

CREATE INDEX IF NOT EXISTS idx_posts_user ON posts(user_id);
CREATE INDEX IF NOT EXISTS idx_posts_date ON posts(post_date);

CREATE TABLE IF NOT EXISTS hashtags (
    hashtag_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS post_hashtags (
    post_id INTEGER NOT NULL REFERENCES posts(post_id) ON DELETE CASCADE,
    hashtag_id INTEGER NOT NULL REFERENCES hashtags(hashtag_id),
    PRIMARY KEY (post_id, hashtag_id)
);

CREATE TABLE IF NOT EXISTS reactions (
    post_id INTEGER NOT NULL REFERENCES posts(post_id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(user_id),
    kind TEXT NOT NULL DEFAULT 'like',
    reacted_at INTEGER NOT NULL,
    PRIMARY KEY (post_id, user_id)
);

CREATE TABLE IF NOT EXISTS comments (
    comment_id INTEGER PRIMARY KEY AUTOINCREMENT,
    post_id INTEGER NOT NULL REFERENCES posts(post_id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(user_id),
    content TEXT NOT NULL,
    comment_date INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_comments_post ON comments(post_id);

CREATE TABLE IF NOT EXISTS bookmarks (
    user_id INTEGER NOT NULL REFERENCES users(user_id),
    post_id INTEGER NOT NULL REFERENCES posts(post_id) ON DELETE CASCADE,
    created_at INTEGER NOT NULL,
    PRIMARY KEY (user_id, post_id)
);

-- ============================================================
-- Stories (24-hour ephemeral, filtered at read time)
-- ============================================================

CREATE TABLE IF NOT EXISTS stories (
    story_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(user_id),
    content TEXT,
    media_kind TEXT,
    media_ref TEXT,
    created_at INTEGER NOT NULL,
    expires_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_stories_user ON stories(user_id);

-- ============================================================
-- Notifications & Preferences
-- ============================================================

CREATE TABLE IF NOT EXISTS notifications (
    notification_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(user_id),
    kind TEXT NOT NULL,
    content TEXT NOT NULL,
    related_id INTEGER,
    created_at INTEGER NOT NULL,
    is_read INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id);

CREATE TABLE IF NOT EXISTS notification_settings (
    user_id INTEGER PRIMARY KEY REFERENCES users(user_id),
    notify_likes INTEGER NOT NULL DEFAULT 1,
    notify_comments INTEGER NOT NULL DEFAULT 1,
    notify_mentions INTEGER NOT NULL DEFAULT 1,
    notify_friend_requests INTEGER NOT NULL DEFAULT 1
);

-- ============================================================
-- Achievements
-- ============================================================

CREATE TABLE IF NOT EXISTS achievements (
    achievement_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(user_id),
    kind TEXT NOT NULL,
    description TEXT NOT NULL,
    earned_at INTEGER NOT NULL,
    UNIQUE (user_id, kind)
);

-- ============================================================
-- Economy: Currency, Marketplace, Ads
-- ============================================================

CREATE TABLE IF NOT EXISTS currencies (
    user_id INTEGER PRIMARY KEY REFERENCES users(user_id),
    balance INTEGER NOT NULL DEFAULT 0,
    last_claim_day INTEGER
);

CREATE TABLE IF NOT EXISTS marketplace (
    item_id INTEGER PRIMARY KEY AUTOINCREMENT,
    seller_id INTEGER NOT NULL REFERENCES users(user_id),
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    price INTEGER NOT NULL,
    created_at INTEGER NOT NULL,
    status TEXT NOT NULL CHECK (status IN ('active', 'sold', 'cancelled')) DEFAULT 'active',
    media_kind TEXT,
    media_ref TEXT
);

CREATE INDEX IF NOT EXISTS idx_marketplace_seller ON marketplace(seller_id);

CREATE TABLE IF NOT EXISTS ads (
    ad_id INTEGER PRIMARY KEY AUTOINCREMENT,
    creator_id INTEGER NOT NULL REFERENCES users(user_id),
    content TEXT NOT NULL,
    price INTEGER NOT NULL,
    created_at INTEGER NOT NULL,
    status TEXT NOT NULL CHECK (status IN ('pending', 'approved', 'rejected', 'active', 'expired')) DEFAULT 'pending',
    media_kind TEXT,
    media_ref TEXT
);

CREATE INDEX IF NOT EXISTS idx_ads_creator ON ads(creator_id);

-- ============================================================
-- Moderation
-- ============================================================

CREATE TABLE IF NOT EXISTS reports (
    report_id INTEGER PRIMARY KEY AUTOINCREMENT,
    reporter_id INTEGER NOT NULL REFERENCES users(user_id),
    target_id INTEGER NOT NULL,
    target_type TEXT NOT NULL CHECK (target_type IN ('post', 'user', 'item', 'ad')),
    reason TEXT NOT NULL,
    report_date INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS admins (
    user_id INTEGER PRIMARY KEY REFERENCES users(user_id),
    role TEXT NOT NULL CHECK (role IN ('admin', 'moderator', 'superadmin')) DEFAULT 'admin',
    appointed_at INTEGER NOT NULL
);
"#;

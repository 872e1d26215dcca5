//! Integration test: one full community lifecycle.
//!
//! Walks a small community through every surface in order:
//! 1. Registration, friending, a group, posts with tags and media
//! 2. Engagement: reactions, comments with mentions, bookmarks
//! 3. Economy: daily bonuses, a transfer, a marketplace sale
//! 4. Ads: submission, review, going live
//! 5. Moderation: a report and a ban, and what the ban hides

use weave_core::{CoreError, Social};
use weave_types::feed::FeedStrategy;
use weave_types::market::{AdminRole, ReportTarget};
use weave_types::notify::NotificationKind;
use weave_types::social::ReactionKind;
use weave_types::DAILY_BONUS;

#[test]
fn community_lifecycle() {
    let mut social = Social::open_memory().expect("store");

    // -- registration and the social graph --
    social.register(1, "alice", false, "gardener").expect("register");
    social.register(2, "bob", false, "").expect("register");
    social.register(3, "carla", true, "").expect("register");
    social.register(9, "mod", false, "").expect("register");
    social.appoint_admin(9, AdminRole::Moderator).expect("appoint");

    social.send_friend_request(1, 2).expect("friends");
    social.send_friend_request(2, 3).expect("request");
    social.respond_friend_request(3, 2, true).expect("accept");

    // -- a group with content --
    let group = social.create_group(1, "allotment", "veg talk", true).expect("group");
    social.join_group(2, group).expect("join");
    let group_post = social
        .create_post(1, "the #tomatoes are in", Some(group), None)
        .expect("post");
    let open_post = social.create_post(2, "weekend #tomatoes sauce", None, None).expect("post");

    // -- engagement --
    social.react(2, group_post, ReactionKind::Love).expect("react");
    social.comment(2, group_post, "beautiful @alice").expect("comment");
    social.bookmark(2, group_post).expect("bookmark");

    let feed = social
        .compose_feed(2, FeedStrategy::Smart, 10, 0, None)
        .expect("feed");
    assert_eq!(feed.len(), 2);
    let trending = social.trending_hashtags(5).expect("trending");
    assert_eq!(trending[0].name, "tomatoes");
    assert_eq!(trending[0].post_count, 2);

    // Carla is outside the group and sees only her friend's open post.
    let carla_feed = social
        .compose_feed(3, FeedStrategy::Smart, 10, 0, None)
        .expect("feed");
    assert_eq!(carla_feed.len(), 1);
    assert_eq!(carla_feed[0].post_id, open_post);

    // -- economy --
    social.claim_daily_bonus(2).expect("bonus");
    social.claim_daily_bonus(3).expect("bonus");
    social.transfer(3, "bob", 4).expect("transfer");
    assert_eq!(social.balance(2).expect("balance"), DAILY_BONUS + 4);

    let item = social
        .create_market_item(1, "seedlings", "six pots", 8, None)
        .expect("list");
    social.buy_item(2, item).expect("buy");
    assert_eq!(social.balance(1).expect("balance"), 8);
    assert_eq!(social.balance(2).expect("balance"), DAILY_BONUS + 4 - 8);
    assert!(social.market_items(10, 0).expect("items").is_empty());

    // -- ads --
    let ad = social.create_ad(1, "seedlings every spring", 2, None).expect("ad");
    assert!(social.active_ads(10, 0).expect("ads").is_empty());
    social.review_ad(9, ad, true).expect("review");
    assert_eq!(social.active_ads(10, 0).expect("ads").len(), 1);

    // -- moderation --
    social
        .report(1, open_post, ReportTarget::Post, "too much sauce")
        .expect("report");
    assert_eq!(
        social.report_count(open_post, ReportTarget::Post).expect("count"),
        1
    );

    social.ban_user(9, "bob", "repeated spam").expect("ban");
    assert!(social.is_banned(2).expect("check"));
    assert!(social.profile(2).expect("profile").is_private);
    assert!(social
        .notifications(2, 50)
        .expect("list")
        .iter()
        .any(|n| n.kind == NotificationKind::Ban));

    // The spam post itself goes through moderation removal.
    social.delete_post(9, open_post).expect("delete");
    assert!(matches!(
        social.react(3, open_post, ReactionKind::Like),
        Err(CoreError::NotFound(_))
    ));

    // Alice's group post survives for the remaining members.
    assert!(social.can_access(1, group_post).expect("check"));
}

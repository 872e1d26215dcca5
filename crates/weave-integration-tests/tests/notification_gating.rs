//! Integration test: the preference-gated notification router.
//!
//! 1. A disabled toggle drops the notification but the action commits
//! 2. Ungated kinds ignore the toggles entirely
//! 3. Mention fan-out from comments, gated per recipient
//! 4. Read state and settings round-trips

use weave_core::Social;
use weave_db::queries::engagement;
use weave_types::notify::{NotificationKind, NotificationSettings};
use weave_types::social::ReactionKind;

fn harness() -> Social {
    let mut social = Social::open_memory().expect("store");
    social.register(1, "alice", false, "").expect("register");
    social.register(2, "bob", false, "").expect("register");
    social
}

#[test]
fn disabled_comment_toggle_drops_notification_only() {
    let mut social = harness();
    let post = social.create_post(1, "hello", None, None).expect("post");
    social
        .set_notification_settings(
            1,
            NotificationSettings {
                comments: false,
                ..NotificationSettings::default()
            },
        )
        .expect("settings");

    social.comment(2, post, "first!").expect("comment");

    // The comment row exists; the notification does not.
    assert_eq!(
        engagement::comment_count(social.connection(), post).expect("count"),
        1
    );
    assert!(social.notifications(1, 10).expect("list").is_empty());

    // Re-enabling brings the next one through.
    social
        .set_notification_settings(1, NotificationSettings::default())
        .expect("settings");
    social.comment(2, post, "second!").expect("comment");
    let rows = social.notifications(1, 10).expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].kind, NotificationKind::Comment);
}

#[test]
fn disabled_like_toggle_drops_reaction_notice() {
    let mut social = harness();
    let post = social.create_post(1, "hello", None, None).expect("post");
    social
        .set_notification_settings(
            1,
            NotificationSettings {
                likes: false,
                ..NotificationSettings::default()
            },
        )
        .expect("settings");

    social.react(2, post, ReactionKind::Like).expect("react");
    assert_eq!(
        engagement::reaction_count(social.connection(), post).expect("count"),
        1
    );
    assert!(social.notifications(1, 10).expect("list").is_empty());
}

#[test]
fn ungated_kinds_ignore_toggles() {
    let mut social = harness();
    // All toggles off.
    social
        .set_notification_settings(
            2,
            NotificationSettings {
                likes: false,
                comments: false,
                mentions: false,
                friend_requests: false,
            },
        )
        .expect("settings");

    // A transfer notification is ungated and still lands.
    social.claim_daily_bonus(1).expect("bonus");
    social.transfer(1, "bob", 3).expect("transfer");

    let rows = social.notifications(2, 10).expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].kind, NotificationKind::Transfer);
}

#[test]
fn mention_fanout_respects_each_recipients_gate() {
    let mut social = harness();
    social.register(3, "carla", false, "").expect("register");
    social.register(4, "dan", false, "").expect("register");
    social
        .set_notification_settings(
            4,
            NotificationSettings {
                mentions: false,
                ..NotificationSettings::default()
            },
        )
        .expect("settings");
    let post = social.create_post(1, "meetup", None, None).expect("post");

    social
        .comment(2, post, "ping @carla and @dan and @ghost")
        .expect("comment");

    let to_carla = social.notifications(3, 10).expect("list");
    assert_eq!(to_carla.len(), 1);
    assert_eq!(to_carla[0].kind, NotificationKind::Mention);
    // Dan muted mentions; the unknown handle resolves to no one.
    assert!(social.notifications(4, 10).expect("list").is_empty());
}

#[test]
fn mark_read_and_lazy_settings() {
    let mut social = harness();
    let post = social.create_post(1, "hello", None, None).expect("post");
    social.comment(2, post, "hi").expect("comment");

    let rows = social.notifications(1, 10).expect("list");
    assert!(!rows[0].is_read);
    social
        .mark_notification_read(rows[0].notification_id)
        .expect("mark");
    assert!(social.notifications(1, 10).expect("list")[0].is_read);

    // Settings materialize with defaults on first read.
    let settings = social.notification_settings(2).expect("settings");
    assert_eq!(settings, NotificationSettings::default());
}

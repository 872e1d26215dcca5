//! Typed query functions, grouped by domain.

pub mod achievements;
pub mod economy;
pub mod engagement;
pub mod friends;
pub mod groups;
pub mod moderation;
pub mod notifications;
pub mod posts;
pub mod stories;
pub mod users;

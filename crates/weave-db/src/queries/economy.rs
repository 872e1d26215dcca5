//! Currency, marketplace, and ad query functions.

use rusqlite::{Connection, OptionalExtension};

use weave_types::{AdId, ItemId, UserId};

use crate::{DbError, Result};

/// Insert a zero-balance currency row if none exists.
pub fn insert_default_currency(conn: &Connection, user_id: UserId) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO currencies (user_id) VALUES (?1)",
        [user_id],
    )?;
    Ok(())
}

/// The user's balance; zero if no row exists.
pub fn balance(conn: &Connection, user_id: UserId) -> Result<i64> {
    let balance: Option<i64> = conn
        .query_row(
            "SELECT balance FROM currencies WHERE user_id = ?1",
            [user_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(balance.unwrap_or(0))
}

/// Adjust the user's balance by a signed delta.
pub fn adjust_balance(conn: &Connection, user_id: UserId, delta: i64) -> Result<()> {
    let updated = conn.execute(
        "UPDATE currencies SET balance = balance + ?1 WHERE user_id = ?2",
        rusqlite::params![delta, user_id],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound("currency account".into()));
    }
    Ok(())
}

/// The unix day of the last bonus claim, if any.
pub fn last_claim_day(conn: &Connection, user_id: UserId) -> Result<Option<i64>> {
    let day: Option<Option<i64>> = conn
        .query_row(
            "SELECT last_claim_day FROM currencies WHERE user_id = ?1",
            [user_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(day.flatten())
}

/// Record a bonus claim for the given unix day.
pub fn set_claim_day(conn: &Connection, user_id: UserId, day: i64) -> Result<()> {
    conn.execute(
        "UPDATE currencies SET last_claim_day = ?1 WHERE user_id = ?2",
        rusqlite::params![day, user_id],
    )?;
    Ok(())
}

/// A raw marketplace item row.
#[derive(Debug, Clone)]
pub struct ItemRow {
    pub item_id: ItemId,
    pub seller_id: UserId,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub created_at: i64,
    pub status: String,
}

/// Insert a marketplace item and return its id.
pub fn insert_item(
    conn: &Connection,
    seller_id: UserId,
    title: &str,
    description: &str,
    price: i64,
    media_kind: Option<&str>,
    media_ref: Option<&str>,
    now: i64,
) -> Result<ItemId> {
    conn.execute(
        "INSERT INTO marketplace (seller_id, title, description, price, created_at,
                                  media_kind, media_ref)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![seller_id, title, description, price, now, media_kind, media_ref],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Get an item if it is still active.
pub fn get_active_item(conn: &Connection, item_id: ItemId) -> Result<Option<ItemRow>> {
    let row = conn
        .query_row(
            "SELECT item_id, seller_id, title, description, price, created_at, status
             FROM marketplace WHERE item_id = ?1 AND status = 'active'",
            [item_id],
            |row| {
                Ok(ItemRow {
                    item_id: row.get(0)?,
                    seller_id: row.get(1)?,
                    title: row.get(2)?,
                    description: row.get(3)?,
                    price: row.get(4)?,
                    created_at: row.get(5)?,
                    status: row.get(6)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}

/// Active items, newest first.
pub fn active_items(conn: &Connection, limit: u32, offset: u32) -> Result<Vec<ItemRow>> {
    let mut stmt = conn.prepare(
        "SELECT item_id, seller_id, title, description, price, created_at, status
         FROM marketplace WHERE status = 'active'
         ORDER BY created_at DESC, item_id DESC LIMIT ?1 OFFSET ?2",
    )?;
    let rows = stmt
        .query_map([limit, offset], |row| {
            Ok(ItemRow {
                item_id: row.get(0)?,
                seller_id: row.get(1)?,
                title: row.get(2)?,
                description: row.get(3)?,
                price: row.get(4)?,
                created_at: row.get(5)?,
                status: row.get(6)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Set an item's status.
pub fn set_item_status(conn: &Connection, item_id: ItemId, status: &str) -> Result<()> {
    conn.execute(
        "UPDATE marketplace SET status = ?1 WHERE item_id = ?2",
        rusqlite::params![status, item_id],
    )?;
    Ok(())
}

/// A raw ad row.
#[derive(Debug, Clone)]
pub struct AdRow {
    pub ad_id: AdId,
    pub creator_id: UserId,
    pub content: String,
    pub price: i64,
    pub created_at: i64,
    pub status: String,
}

/// Insert an ad (starts pending) and return its id.
pub fn insert_ad(
    conn: &Connection,
    creator_id: UserId,
    content: &str,
    price: i64,
    media_kind: Option<&str>,
    media_ref: Option<&str>,
    now: i64,
) -> Result<AdId> {
    conn.execute(
        "INSERT INTO ads (creator_id, content, price, created_at, media_kind, media_ref)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![creator_id, content, price, now, media_kind, media_ref],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Get an ad by id.
pub fn get_ad(conn: &Connection, ad_id: AdId) -> Result<Option<AdRow>> {
    let row = conn
        .query_row(
            "SELECT ad_id, creator_id, content, price, created_at, status
             FROM ads WHERE ad_id = ?1",
            [ad_id],
            |row| {
                Ok(AdRow {
                    ad_id: row.get(0)?,
                    creator_id: row.get(1)?,
                    content: row.get(2)?,
                    price: row.get(3)?,
                    created_at: row.get(4)?,
                    status: row.get(5)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}

/// Active ads, newest first.
pub fn active_ads(conn: &Connection, limit: u32, offset: u32) -> Result<Vec<AdRow>> {
    let mut stmt = conn.prepare(
        "SELECT ad_id, creator_id, content, price, created_at, status
         FROM ads WHERE status = 'active'
         ORDER BY created_at DESC, ad_id DESC LIMIT ?1 OFFSET ?2",
    )?;
    let rows = stmt
        .query_map([limit, offset], |row| {
            Ok(AdRow {
                ad_id: row.get(0)?,
                creator_id: row.get(1)?,
                content: row.get(2)?,
                price: row.get(3)?,
                created_at: row.get(4)?,
                status: row.get(5)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Set an ad's status. Returns `false` if the ad did not exist.
pub fn set_ad_status(conn: &Connection, ad_id: AdId, status: &str) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE ads SET status = ?1 WHERE ad_id = ?2",
        rusqlite::params![status, ad_id],
    )?;
    Ok(updated > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::users;

    fn test_db() -> Connection {
        let conn = crate::open_memory().expect("open test db");
        users::insert(&conn, 1, "alice", false, "", 100).expect("user");
        users::insert(&conn, 2, "bob", false, "", 100).expect("user");
        insert_default_currency(&conn, 1).expect("currency");
        insert_default_currency(&conn, 2).expect("currency");
        conn
    }

    #[test]
    fn test_balance_adjustments() {
        let conn = test_db();
        assert_eq!(balance(&conn, 1).expect("balance"), 0);

        adjust_balance(&conn, 1, 50).expect("credit");
        adjust_balance(&conn, 1, -20).expect("debit");
        assert_eq!(balance(&conn, 1).expect("balance"), 30);
    }

    #[test]
    fn test_missing_account_is_zero() {
        let conn = test_db();
        assert_eq!(balance(&conn, 99).expect("balance"), 0);
        assert!(adjust_balance(&conn, 99, 5).is_err());
    }

    #[test]
    fn test_claim_day() {
        let conn = test_db();
        assert_eq!(last_claim_day(&conn, 1).expect("day"), None);
        set_claim_day(&conn, 1, 19_000).expect("set");
        assert_eq!(last_claim_day(&conn, 1).expect("day"), Some(19_000));
    }

    #[test]
    fn test_item_lifecycle() {
        let conn = test_db();
        let item =
            insert_item(&conn, 1, "lamp", "bright", 25, None, None, 1000).expect("insert");

        assert!(get_active_item(&conn, item).expect("get").is_some());
        set_item_status(&conn, item, "sold").expect("sold");
        assert!(get_active_item(&conn, item).expect("get").is_none());
    }

    #[test]
    fn test_ads_start_pending() {
        let conn = test_db();
        let ad = insert_ad(&conn, 1, "buy stuff", 5, None, None, 1000).expect("insert");

        assert!(active_ads(&conn, 10, 0).expect("list").is_empty());
        assert!(set_ad_status(&conn, ad, "active").expect("approve"));
        assert_eq!(active_ads(&conn, 10, 0).expect("list").len(), 1);
    }
}

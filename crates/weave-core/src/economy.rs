//! Virtual currency, marketplace, and ads.

use weave_db::queries::{economy, friends, users};
use weave_types::market::ItemStatus;
use weave_types::notify::{NotificationEvent, NotificationKind};
use weave_types::social::Media;
use weave_types::{
    AdId, ItemId, UserId, DAILY_BONUS, DAY_SECS, MAX_AD_LEN, MAX_ITEM_DESC_LEN, MAX_ITEM_TITLE_LEN,
};

use crate::{notify, validate_len, CoreError, Result, Social};

/// An active marketplace listing.
#[derive(Debug, Clone)]
pub struct ItemView {
    pub item_id: ItemId,
    pub seller_id: UserId,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub created_at: i64,
}

fn item_view(row: economy::ItemRow) -> ItemView {
    ItemView {
        item_id: row.item_id,
        seller_id: row.seller_id,
        title: row.title,
        description: row.description,
        price: row.price,
        created_at: row.created_at,
    }
}

/// A running ad.
#[derive(Debug, Clone)]
pub struct AdView {
    pub ad_id: AdId,
    pub creator_id: UserId,
    pub content: String,
    pub price: i64,
    pub created_at: i64,
}

impl Social {
    /// The user's coin balance. Zero for unknown users.
    pub fn balance(&self, user_id: UserId) -> Result<i64> {
        Ok(economy::balance(&self.conn, user_id)?)
    }

    /// Claim the daily bonus. Returns `false` if today's was already
    /// claimed; the day boundary is the unix day.
    pub fn claim_daily_bonus(&mut self, user_id: UserId) -> Result<bool> {
        if !users::exists(&self.conn, user_id)? {
            return Err(CoreError::NotFound("user".into()));
        }
        let today = weave_db::now() / DAY_SECS;
        if economy::last_claim_day(&self.conn, user_id)? == Some(today) {
            return Ok(false);
        }

        let tx = self.conn.transaction()?;
        economy::adjust_balance(&tx, user_id, DAILY_BONUS)?;
        economy::set_claim_day(&tx, user_id, today)?;
        tx.commit()?;

        tracing::info!(user_id, "daily bonus claimed");
        Ok(true)
    }

    /// Send coins to another user by handle.
    pub fn transfer(
        &mut self,
        sender_id: UserId,
        receiver_handle: &str,
        amount: i64,
    ) -> Result<()> {
        if amount <= 0 {
            return Err(CoreError::Validation("amount must be positive".into()));
        }
        let sender = users::get(&self.conn, sender_id)?
            .ok_or_else(|| CoreError::NotFound("sender".into()))?;
        let receiver = users::by_handle(&self.conn, receiver_handle)?
            .ok_or_else(|| CoreError::NotFound("receiver handle".into()))?;
        if receiver.user_id == sender_id {
            return Err(CoreError::Validation("cannot transfer to yourself".into()));
        }
        if friends::blocked_either_way(&self.conn, sender_id, receiver.user_id)? {
            return Err(CoreError::Permission("a block exists between this pair".into()));
        }
        if economy::balance(&self.conn, sender_id)? < amount {
            return Err(CoreError::Validation("insufficient funds".into()));
        }

        let tx = self.conn.transaction()?;
        economy::adjust_balance(&tx, sender_id, -amount)?;
        economy::adjust_balance(&tx, receiver.user_id, amount)?;
        tx.commit()?;

        notify::route_swallow(
            &self.conn,
            &NotificationEvent {
                recipient: receiver.user_id,
                kind: NotificationKind::Transfer,
                content: format!("{} sent you {amount} coins", sender.handle),
                related_id: Some(sender_id),
            },
        );
        tracing::info!(sender_id, receiver = receiver.user_id, amount, "transfer done");
        Ok(())
    }

    /// List an item for sale.
    pub fn create_market_item(
        &mut self,
        seller_id: UserId,
        title: &str,
        description: &str,
        price: i64,
        media: Option<&Media>,
    ) -> Result<ItemId> {
        let title = title.trim();
        if title.is_empty() {
            return Err(CoreError::Validation("item title must not be empty".into()));
        }
        validate_len(title, MAX_ITEM_TITLE_LEN, "item title")?;
        validate_len(description, MAX_ITEM_DESC_LEN, "item description")?;
        if price <= 0 {
            return Err(CoreError::Validation("price must be positive".into()));
        }
        if !users::exists(&self.conn, seller_id)? {
            return Err(CoreError::NotFound("seller".into()));
        }

        let item_id = economy::insert_item(
            &self.conn,
            seller_id,
            title,
            description,
            price,
            media.map(|m| m.kind.as_str()),
            media.map(|m| m.reference.as_str()),
            weave_db::now(),
        )?;
        tracing::info!(seller_id, item_id, price, "item listed");
        Ok(item_id)
    }

    /// Active listings, newest first.
    pub fn market_items(&self, limit: u32, offset: u32) -> Result<Vec<ItemView>> {
        let rows = economy::active_items(&self.conn, limit, offset)?;
        Ok(rows.into_iter().map(item_view).collect())
    }

    /// Buy an active item: debit, credit, and mark sold in one transaction.
    pub fn buy_item(&mut self, buyer_id: UserId, item_id: ItemId) -> Result<()> {
        let buyer = users::get(&self.conn, buyer_id)?
            .ok_or_else(|| CoreError::NotFound("buyer".into()))?;
        let item = economy::get_active_item(&self.conn, item_id)?
            .ok_or_else(|| CoreError::NotFound("active item".into()))?;
        if item.seller_id == buyer_id {
            return Err(CoreError::Validation("cannot buy your own item".into()));
        }
        if economy::balance(&self.conn, buyer_id)? < item.price {
            return Err(CoreError::Validation("insufficient funds".into()));
        }

        let tx = self.conn.transaction()?;
        economy::adjust_balance(&tx, buyer_id, -item.price)?;
        economy::adjust_balance(&tx, item.seller_id, item.price)?;
        economy::set_item_status(&tx, item_id, ItemStatus::Sold.as_str())?;
        tx.commit()?;

        notify::route_swallow(
            &self.conn,
            &NotificationEvent {
                recipient: item.seller_id,
                kind: NotificationKind::ItemSold,
                content: format!("{} bought {} for {} coins", buyer.handle, item.title, item.price),
                related_id: Some(item_id),
            },
        );
        tracing::info!(buyer_id, item_id, price = item.price, "item sold");
        Ok(())
    }

    /// Submit an ad for review. New ads start pending.
    pub fn create_ad(
        &mut self,
        creator_id: UserId,
        content: &str,
        price: i64,
        media: Option<&Media>,
    ) -> Result<AdId> {
        validate_len(content, MAX_AD_LEN, "ad content")?;
        if content.trim().is_empty() {
            return Err(CoreError::Validation("ad content must not be empty".into()));
        }
        if price < 0 {
            return Err(CoreError::Validation("price must not be negative".into()));
        }
        if !users::exists(&self.conn, creator_id)? {
            return Err(CoreError::NotFound("creator".into()));
        }

        let ad_id = economy::insert_ad(
            &self.conn,
            creator_id,
            content,
            price,
            media.map(|m| m.kind.as_str()),
            media.map(|m| m.reference.as_str()),
            weave_db::now(),
        )?;
        tracing::info!(creator_id, ad_id, "ad submitted");
        Ok(ad_id)
    }

    /// Ads currently running, newest first.
    pub fn active_ads(&self, limit: u32, offset: u32) -> Result<Vec<AdView>> {
        let rows = economy::active_ads(&self.conn, limit, offset)?;
        Ok(rows
            .into_iter()
            .map(|row| AdView {
                ad_id: row.ad_id,
                creator_id: row.creator_id,
                content: row.content,
                price: row.price,
                created_at: row.created_at,
            })
            .collect())
    }
}

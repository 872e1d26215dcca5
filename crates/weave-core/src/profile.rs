//! Registration, profile updates, and user search.

use weave_db::queries::{economy, notifications, users};
use weave_types::social::{Profile, ProfileUpdate};
use weave_types::{UserId, MAX_BIO_LEN, MAX_HANDLE_LEN};

use crate::{constraint_to_conflict, validate_len, CoreError, Result, Social};

fn validate_handle(handle: &str) -> Result<&str> {
    let handle = handle.trim();
    if handle.is_empty() {
        return Err(CoreError::Validation("handle must not be empty".into()));
    }
    validate_len(handle, MAX_HANDLE_LEN, "handle")?;
    Ok(handle)
}

fn row_to_profile(row: users::UserRow) -> Profile {
    Profile {
        user_id: row.user_id,
        handle: row.handle,
        is_private: row.is_private,
        bio: row.bio,
        registered_at: row.reg_date,
        last_seen: row.last_seen,
    }
}

impl Social {
    /// Register a user, creating their currency account and notification
    /// settings in the same transaction.
    pub fn register(
        &mut self,
        user_id: UserId,
        handle: &str,
        is_private: bool,
        bio: &str,
    ) -> Result<()> {
        let handle = validate_handle(handle)?.to_string();
        validate_len(bio, MAX_BIO_LEN, "bio")?;

        let now = weave_db::now();
        let tx = self.conn.transaction()?;
        users::insert(&tx, user_id, &handle, is_private, bio, now)
            .map_err(|e| constraint_to_conflict(e, "user id or handle already registered"))?;
        economy::insert_default_currency(&tx, user_id)?;
        notifications::insert_default_settings(&tx, user_id)?;
        tx.commit()?;

        tracing::info!(user_id, handle, "user registered");
        Ok(())
    }

    /// Apply a partial profile update and bump last-seen.
    pub fn update_profile(&mut self, user_id: UserId, update: ProfileUpdate) -> Result<()> {
        if !users::exists(&self.conn, user_id)? {
            return Err(CoreError::NotFound("user".into()));
        }

        let handle = match &update.handle {
            Some(handle) => Some(validate_handle(handle)?.to_string()),
            None => None,
        };
        if let Some(bio) = &update.bio {
            validate_len(bio, MAX_BIO_LEN, "bio")?;
        }

        let now = weave_db::now();
        let tx = self.conn.transaction()?;
        if let Some(handle) = handle {
            users::set_handle(&tx, user_id, &handle)
                .map_err(|e| constraint_to_conflict(e, "handle already taken"))?;
        }
        if let Some(bio) = &update.bio {
            users::set_bio(&tx, user_id, bio)?;
        }
        if let Some(is_private) = update.is_private {
            users::set_privacy(&tx, user_id, is_private)?;
        }
        users::touch_last_seen(&tx, user_id, now)?;
        tx.commit()?;
        Ok(())
    }

    /// Look up a profile by id.
    pub fn profile(&self, user_id: UserId) -> Result<Profile> {
        let row = users::get(&self.conn, user_id)?
            .ok_or_else(|| CoreError::NotFound("user".into()))?;
        Ok(row_to_profile(row))
    }

    /// Look up a profile by handle.
    pub fn profile_by_handle(&self, handle: &str) -> Result<Profile> {
        let row = users::by_handle(&self.conn, handle)?
            .ok_or_else(|| CoreError::NotFound(format!("no user with handle {handle}")))?;
        Ok(row_to_profile(row))
    }

    /// Whether the user id is registered.
    pub fn is_registered(&self, user_id: UserId) -> Result<bool> {
        Ok(users::exists(&self.conn, user_id)?)
    }

    /// Search users by handle substring.
    pub fn search_users(&self, keyword: &str) -> Result<Vec<Profile>> {
        let rows = users::search(&self.conn, keyword, 20)?;
        Ok(rows.into_iter().map(row_to_profile).collect())
    }
}

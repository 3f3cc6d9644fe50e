// SPDX-License-Identifier: MIT

//! In-process store with typed operations.
//!
//! Provides high-level operations for:
//! - Users (account rows, refresh-token rotation)
//! - Social accounts (provider linkages)
//! - Revocation registry (blacklisted refresh-token ids)
//!
//! Uniqueness of `email`, `username`, and `(provider, uid)` is enforced
//! here, inside a single critical section per operation, so concurrent
//! logins can never race a check-then-insert into duplicate rows.

use crate::error::AppError;
use crate::models::{Provider, SocialAccount, User};
use anyhow::anyhow;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Default)]
struct Inner {
    users: HashMap<u64, User>,
    users_by_email: HashMap<String, u64>,
    users_by_username: HashMap<String, u64>,
    accounts: HashMap<u64, SocialAccount>,
    accounts_by_key: HashMap<(Provider, String), u64>,
    revoked_jtis: HashSet<String>,
    next_user_id: u64,
    next_account_id: u64,
}

/// Store handle; cheap to clone and share across requests.
#[derive(Clone, Default)]
pub struct Store {
    inner: Arc<Mutex<Inner>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by id.
    pub async fn get_user(&self, user_id: u64) -> Result<Option<User>, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.get(&user_id).cloned())
    }

    /// Get a user by exact email match.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .users_by_email
            .get(email)
            .and_then(|id| inner.users.get(id))
            .cloned())
    }

    /// Atomic conditional insert: create an active user for `email` unless
    /// one already exists, in which case the existing row is returned with
    /// `created = false`.
    ///
    /// Username allocation happens in the same critical section: the first
    /// free entry in `base`, `base1`, `base2`, … is taken, so two
    /// concurrent first logins can never claim the same handle.
    pub async fn create_user_if_absent(
        &self,
        email: &str,
        base_username: &str,
        name: &str,
    ) -> Result<(User, bool), AppError> {
        let mut inner = self.inner.lock().await;

        if let Some(id) = inner.users_by_email.get(email).copied() {
            let user = inner
                .users
                .get(&id)
                .cloned()
                .ok_or_else(|| AppError::Internal(anyhow!("user {id} missing from store")))?;
            return Ok((user, false));
        }

        let mut username = base_username.to_string();
        let mut counter = 1u64;
        while inner.users_by_username.contains_key(&username) {
            username = format!("{base_username}{counter}");
            counter += 1;
        }

        inner.next_user_id += 1;
        let user = User {
            id: inner.next_user_id,
            username: username.clone(),
            email: email.to_string(),
            name: name.to_string(),
            phone: None,
            profile_image: None,
            gender: None,
            description: None,
            is_active: true,
            date_joined: Utc::now(),
            current_refresh_token: None,
            force_logout_required: false,
        };

        inner.users_by_email.insert(email.to_string(), user.id);
        inner.users_by_username.insert(username, user.id);
        inner.users.insert(user.id, user.clone());

        Ok((user, true))
    }

    /// Swap the user's current refresh token for a new one.
    pub async fn rotate_refresh_token(&self, user_id: u64, token: &str) -> Result<(), AppError> {
        let mut inner = self.inner.lock().await;
        let user = inner
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::Internal(anyhow!("user {user_id} missing from store")))?;
        user.current_refresh_token = Some(token.to_string());
        Ok(())
    }

    /// Flag the user so any party holding a revoked session re-authenticates.
    pub async fn set_force_logout(&self, user_id: u64, flag: bool) -> Result<(), AppError> {
        let mut inner = self.inner.lock().await;
        let user = inner
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::Internal(anyhow!("user {user_id} missing from store")))?;
        user.force_logout_required = flag;
        Ok(())
    }

    /// Number of user rows (test assertions for concurrent creation).
    pub async fn user_count(&self) -> Result<usize, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.len())
    }

    // ─── Social Account Operations ───────────────────────────────

    /// Find a linkage by its unique `(provider, uid)` key.
    pub async fn find_social_account(
        &self,
        provider: Provider,
        uid: &str,
    ) -> Result<Option<SocialAccount>, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .accounts_by_key
            .get(&(provider, uid.to_string()))
            .and_then(|id| inner.accounts.get(id))
            .cloned())
    }

    /// Atomic get-or-create on `(provider, uid)`.
    ///
    /// When the linkage already exists, `extra_data` is refreshed in place
    /// and the existing owner is kept regardless of `user_id` (linkage
    /// ownership wins); returns `created = false`.
    pub async fn upsert_social_account(
        &self,
        user_id: u64,
        provider: Provider,
        uid: &str,
        extra_data: serde_json::Map<String, serde_json::Value>,
    ) -> Result<(SocialAccount, bool), AppError> {
        let mut inner = self.inner.lock().await;

        if let Some(id) = inner.accounts_by_key.get(&(provider, uid.to_string())).copied() {
            let account = inner
                .accounts
                .get_mut(&id)
                .ok_or_else(|| AppError::Internal(anyhow!("social account {id} missing")))?;
            account.uid = uid.to_string();
            account.extra_data = extra_data;
            return Ok((account.clone(), false));
        }

        inner.next_account_id += 1;
        let account = SocialAccount {
            id: inner.next_account_id,
            user_id,
            provider,
            uid: uid.to_string(),
            extra_data,
        };

        inner
            .accounts_by_key
            .insert((provider, uid.to_string()), account.id);
        inner.accounts.insert(account.id, account.clone());

        Ok((account, true))
    }

    /// All linkages owned by a user, oldest first.
    pub async fn social_accounts_for_user(
        &self,
        user_id: u64,
    ) -> Result<Vec<SocialAccount>, AppError> {
        let inner = self.inner.lock().await;
        let mut accounts: Vec<SocialAccount> = inner
            .accounts
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        accounts.sort_by_key(|a| a.id);
        Ok(accounts)
    }

    // ─── Revocation Registry ─────────────────────────────────────

    /// Record a refresh-token id as invalidated.
    pub async fn revoke_jti(&self, jti: &str) -> Result<(), AppError> {
        let mut inner = self.inner.lock().await;
        inner.revoked_jtis.insert(jti.to_string());
        Ok(())
    }

    /// Whether a refresh-token id has been invalidated.
    pub async fn is_jti_revoked(&self, jti: &str) -> Result<bool, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner.revoked_jtis.contains(jti))
    }
}

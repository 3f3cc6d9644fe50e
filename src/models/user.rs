//! User and social-account models for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity provider tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    Apple,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Apple => "apple",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Local user account.
///
/// `email` and `username` are globally unique; the store enforces both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    /// Local login handle, derived from the email local part on creation
    pub username: String,
    pub email: String,
    /// Display name (server-attested for Google, caller-supplied for Apple)
    pub name: String,
    pub phone: Option<String>,
    pub profile_image: Option<String>,
    pub gender: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    /// The most recently issued refresh credential; overwritten on rotation
    pub current_refresh_token: Option<String>,
    /// Set when a still-live session was forcibly revoked
    pub force_logout_required: bool,
}

/// One provider linkage for a user. `(provider, uid)` is globally unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialAccount {
    pub id: u64,
    pub user_id: u64,
    pub provider: Provider,
    /// Provider-issued stable subject identifier
    pub uid: String,
    /// Raw verified claim set, kept for audit/debugging
    pub extra_data: serde_json::Map<String, serde_json::Value>,
}

/// Serialized projection of a social account.
#[derive(Debug, Clone, Serialize)]
pub struct SocialAccountProfile {
    pub id: u64,
    pub provider: Provider,
    pub uid: String,
    pub extra_data: serde_json::Map<String, serde_json::Value>,
}

impl From<SocialAccount> for SocialAccountProfile {
    fn from(account: SocialAccount) -> Self {
        Self {
            id: account.id,
            provider: account.provider,
            uid: account.uid,
            extra_data: account.extra_data,
        }
    }
}

/// Serialized projection of a user; never exposes session state.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub profile_image: Option<String>,
    pub gender: Option<String>,
    pub description: Option<String>,
    pub date_joined: DateTime<Utc>,
    pub social_accounts: Vec<SocialAccountProfile>,
}

impl UserProfile {
    pub fn new(user: User, social_accounts: Vec<SocialAccount>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            name: user.name,
            phone: user.phone,
            profile_image: user.profile_image,
            gender: user.gender,
            description: user.description,
            date_joined: user.date_joined,
            social_accounts: social_accounts.into_iter().map(Into::into).collect(),
        }
    }
}

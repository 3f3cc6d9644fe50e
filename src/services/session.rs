// SPDX-License-Identifier: MIT

//! Session credential minting and rotation.
//!
//! Single-session policy: each login invalidates the user's previous
//! refresh credential (best-effort) and mints a fresh access/refresh pair,
//! so logging in anywhere logs out everywhere else.

use crate::db::Store;
use crate::error::AppError;
use crate::models::User;
use anyhow::Context;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

const REFRESH_TTL_SECS: usize = 30 * 24 * 60 * 60;
const ACCESS_TTL_SECS: usize = 60 * 60;

/// Refresh credential claims. `jti` keys the revocation registry.
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    pub jti: String,
    pub iat: usize,
    pub exp: usize,
    pub typ: String,
}

/// Access credential claims, derived from the refresh credential.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
    pub typ: String,
}

/// Freshly minted credential pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Mints, rotates, and validates session credentials.
#[derive(Clone)]
pub struct SessionService {
    signing_key: Vec<u8>,
    db: Store,
}

impl SessionService {
    pub fn new(signing_key: Vec<u8>, db: Store) -> Self {
        Self { signing_key, db }
    }

    /// Rotate the user's session: invalidate the previous refresh
    /// credential, then mint and persist a fresh pair bound to the user.
    pub async fn issue(&self, user: &User) -> Result<TokenPair, AppError> {
        if let Some(old) = &user.current_refresh_token {
            self.invalidate_previous(user.id, old).await;
        }

        let now = now_unix_secs();
        let jti = format!("{:032x}", rand::random::<u128>());

        let refresh_claims = RefreshClaims {
            sub: user.id.to_string(),
            jti,
            iat: now,
            exp: now + REFRESH_TTL_SECS,
            typ: "refresh".to_string(),
        };
        let refresh = self.sign(&refresh_claims)?;

        let access_claims = AccessClaims {
            sub: refresh_claims.sub.clone(),
            iat: refresh_claims.iat,
            exp: now + ACCESS_TTL_SECS,
            typ: "access".to_string(),
        };
        let access = self.sign(&access_claims)?;

        self.db.rotate_refresh_token(user.id, &refresh).await?;

        Ok(TokenPair { access, refresh })
    }

    /// Best-effort invalidation of an outgoing refresh credential.
    ///
    /// Failures are swallowed and never abort the login, but the
    /// force-logout flag is raised on every attempt so any party still
    /// holding the old session is pushed to re-authenticate.
    async fn invalidate_previous(&self, user_id: u64, old_token: &str) {
        match self.decode_refresh_for_revocation(old_token) {
            Ok(claims) => {
                if let Err(e) = self.db.revoke_jti(&claims.jti).await {
                    tracing::warn!(error = %e, user_id, "Failed to record revoked refresh token");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, user_id, "Stored refresh token did not decode during rotation");
            }
        }

        if let Err(e) = self.db.set_force_logout(user_id, true).await {
            tracing::warn!(error = %e, user_id, "Failed to raise force-logout flag");
        }
    }

    /// Validate a refresh credential: signature, expiry, type, and the
    /// revocation registry. Returns the bound user id.
    pub async fn validate_refresh(&self, token: &str) -> Result<u64, AppError> {
        let validation = Validation::new(Algorithm::HS256);
        let token_data = decode::<RefreshClaims>(
            token,
            &DecodingKey::from_secret(&self.signing_key),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        let claims = token_data.claims;
        if claims.typ != "refresh" {
            return Err(AppError::InvalidToken);
        }
        if self.db.is_jti_revoked(&claims.jti).await? {
            return Err(AppError::InvalidToken);
        }

        claims.sub.parse().map_err(|_| AppError::InvalidToken)
    }

    /// Validate an access credential, returning the bound user id.
    pub fn validate_access(&self, token: &str) -> Result<u64, AppError> {
        let validation = Validation::new(Algorithm::HS256);
        let token_data = decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(&self.signing_key),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        let claims = token_data.claims;
        if claims.typ != "access" {
            return Err(AppError::InvalidToken);
        }

        claims.sub.parse().map_err(|_| AppError::InvalidToken)
    }

    /// Decode a refresh credential for revocation only: the signature must
    /// check out, but an already-expired token is still revocable.
    fn decode_refresh_for_revocation(&self, token: &str) -> anyhow::Result<RefreshClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let token_data = decode::<RefreshClaims>(
            token,
            &DecodingKey::from_secret(&self.signing_key),
            &validation,
        )
        .context("stored refresh token failed to decode")?;

        Ok(token_data.claims)
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, AppError> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(&self.signing_key),
        )
        .map_err(|e| AppError::Internal(anyhow::anyhow!("credential signing failed: {e}")))
    }
}

fn now_unix_secs() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as usize
}

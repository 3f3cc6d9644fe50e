// SPDX-License-Identifier: MIT

//! Apple identity-token verification against Apple's published key set.
//!
//! An Apple login presents a signed identity token. Verification order:
//! fetch the current key set, match the token's `kid`, check the RS256
//! signature and audience, then the expiry claim. Any miss is a uniform
//! `InvalidToken`; unverified claim data never leaves this module.

use crate::config::Config;
use crate::error::AppError;
use crate::services::VerifiedClaim;
use anyhow::Context;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::Value;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Verifier for Apple signed identity tokens.
#[derive(Clone)]
pub struct AppleVerifier {
    http: reqwest::Client,
    keys_url: String,
    client_id: String,
}

#[derive(Debug, Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    n: String,
    e: String,
}

impl AppleVerifier {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("failed building Apple verifier HTTP client")?;

        Ok(Self {
            http,
            keys_url: config.apple_keys_url.clone(),
            client_id: config.apple_client_id.clone(),
        })
    }

    /// Verify a signed identity token.
    ///
    /// The returned claim's `display_name` is empty: Apple does not
    /// reliably include a name in the token, so the orchestrator fills it
    /// from caller-supplied input instead.
    pub async fn verify(&self, id_token: &str) -> Result<VerifiedClaim, AppError> {
        let header = decode_header(id_token).map_err(|e| {
            tracing::warn!(error = %e, "Apple identity token has malformed header");
            AppError::InvalidToken
        })?;

        let kid = header.kid.ok_or_else(|| {
            tracing::warn!("Apple identity token header missing kid");
            AppError::InvalidToken
        })?;

        let jwks = self.fetch_keys().await?;

        // No matching key means no signature check is even attempted.
        let jwk = jwks.keys.iter().find(|k| k.kid == kid).ok_or_else(|| {
            tracing::warn!(kid = %kid, "Apple key set has no key for token kid");
            AppError::InvalidToken
        })?;

        let decoding_key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e).map_err(|e| {
            tracing::warn!(error = %e, kid = %kid, "Apple JWKS key is not a usable RSA key");
            AppError::InvalidToken
        })?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.client_id.as_str()]);
        validation.set_required_spec_claims(&["exp", "aud", "sub"]);

        let token_data =
            decode::<serde_json::Map<String, Value>>(id_token, &decoding_key, &validation)
                .map_err(|e| {
                    tracing::warn!(error = %e, "Apple identity token failed validation");
                    AppError::InvalidToken
                })?;

        let claims = token_data.claims;

        // Expiry is checked again without leeway; a stale token is rejected
        // even when the signature is valid.
        let exp = claims.get("exp").and_then(Value::as_u64).ok_or_else(|| {
            tracing::warn!("Apple identity token missing exp claim");
            AppError::InvalidToken
        })?;
        if exp < now_unix_secs() {
            tracing::warn!(exp, "Apple identity token is expired");
            return Err(AppError::InvalidToken);
        }

        let subject_id = claims
            .get("sub")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                tracing::warn!("Apple identity token missing sub claim");
                AppError::InvalidToken
            })?
            .to_string();

        let email = claims
            .get("email")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(VerifiedClaim {
            email,
            subject_id,
            display_name: String::new(),
            raw_claims: claims,
        })
    }

    /// Fetch Apple's current public-key set.
    async fn fetch_keys(&self) -> Result<Jwks, AppError> {
        let response = self.http.get(&self.keys_url).send().await.map_err(|e| {
            tracing::warn!(error = %e, "Apple key-set request failed");
            AppError::InvalidToken
        })?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "Apple key-set request returned error");
            return Err(AppError::InvalidToken);
        }

        response.json().await.map_err(|e| {
            tracing::warn!(error = %e, "Apple key set is malformed JSON");
            AppError::InvalidToken
        })
    }
}

fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

// SPDX-License-Identifier: MIT

//! Google token verification via the userinfo endpoint.
//!
//! A Google login presents a bearer access token; it is considered
//! verified when the userinfo endpoint accepts it and returns a profile.

use crate::config::Config;
use crate::error::AppError;
use crate::services::VerifiedClaim;
use anyhow::Context;
use serde_json::Value;
use std::time::Duration;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Verifier for Google bearer access tokens.
#[derive(Clone)]
pub struct GoogleVerifier {
    http: reqwest::Client,
    userinfo_url: String,
}

impl GoogleVerifier {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("failed building Google verifier HTTP client")?;

        Ok(Self {
            http,
            userinfo_url: config.google_userinfo_url.clone(),
        })
    }

    /// Verify an access token against the userinfo endpoint.
    ///
    /// Any transport fault, non-200 status, or malformed body collapses to
    /// `InvalidToken`; detail stays in the server log.
    pub async fn verify(&self, access_token: &str) -> Result<VerifiedClaim, AppError> {
        let response = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Google userinfo request failed");
                AppError::InvalidToken
            })?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "Google userinfo rejected token");
            return Err(AppError::InvalidToken);
        }

        let info: serde_json::Map<String, Value> = response.json().await.map_err(|e| {
            tracing::warn!(error = %e, "Google userinfo returned malformed JSON");
            AppError::InvalidToken
        })?;

        let subject_id = match info.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                tracing::warn!("Google userinfo response missing subject id");
                return Err(AppError::InvalidToken);
            }
        };

        let email = info
            .get("email")
            .and_then(Value::as_str)
            .map(str::to_string);

        // Display name is server-attested here; the client never supplies it.
        let display_name = info
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(VerifiedClaim {
            email,
            subject_id,
            display_name,
            raw_claims: info,
        })
    }
}

// SPDX-License-Identifier: MIT

//! Login orchestration: verify, reconcile, issue.

use crate::error::AppError;
use crate::models::{Provider, UserProfile};
use crate::services::reconcile::reconcile;
use crate::AppState;
use serde::Serialize;

/// Successful login payload.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserProfile,
    pub refresh: String,
    pub access: String,
    pub created: bool,
    pub message: String,
}

/// Run one login attempt end to end.
///
/// No retries across stages; the first failure aborts the attempt with a
/// single normalized error. A user row created before a later stage fails
/// is left in place and reused on the next attempt.
pub async fn login(
    state: &AppState,
    provider: Provider,
    raw_token: Option<&str>,
    display_name: Option<&str>,
) -> Result<LoginResponse, AppError> {
    let raw_token = match raw_token {
        Some(token) if !token.is_empty() => token,
        _ => {
            let field = match provider {
                Provider::Google => "access_token",
                Provider::Apple => "id_token",
            };
            return Err(AppError::BadRequest(format!("{field} is required")));
        }
    };

    let mut claim = match provider {
        Provider::Google => state.google.verify(raw_token).await?,
        Provider::Apple => state.apple.verify(raw_token).await?,
    };

    // Apple tokens do not reliably carry a name, so the caller may supply
    // one; it only matters when a brand-new user is created. The Google
    // name stays server-attested and is never overridden.
    if provider == Provider::Apple {
        claim.display_name = display_name.unwrap_or_default().to_string();
    }

    if claim.email.is_none() {
        return Err(AppError::MissingEmail);
    }

    let (user, _account, created) = reconcile(&state.db, &claim, provider).await?;

    let pair = state.sessions.issue(&user).await?;

    let accounts = state.db.social_accounts_for_user(user.id).await?;

    tracing::info!(user_id = user.id, provider = %provider, created, "Login successful");

    let message = match provider {
        Provider::Google => "Google login successful",
        Provider::Apple => "Apple login successful",
    };

    Ok(LoginResponse {
        user: UserProfile::new(user, accounts),
        refresh: pair.refresh,
        access: pair.access,
        created,
        message: message.to_string(),
    })
}

// SPDX-License-Identifier: MIT

//! Authenticated API routes.

use axum::{extract::State, routing::get, Extension, Json, Router};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::UserProfile;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/me", get(me))
}

/// Profile of the authenticated caller.
async fn me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserProfile>> {
    let user = state.db.get_user(auth.user_id).await?.ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!(
            "authenticated user {} not found",
            auth.user_id
        ))
    })?;

    let accounts = state.db.social_accounts_for_user(user.id).await?;

    Ok(Json(UserProfile::new(user, accounts)))
}

// SPDX-License-Identifier: MIT

//! Social login routes.

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::Result;
use crate::models::Provider;
use crate::services::login::{login, LoginResponse};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/social/google", post(google_login))
        .route("/auth/social/apple", post(apple_login))
}

#[derive(Deserialize)]
pub struct GoogleLoginRequest {
    #[serde(default)]
    access_token: Option<String>,
}

#[derive(Deserialize)]
pub struct AppleLoginRequest {
    #[serde(default)]
    id_token: Option<String>,
    /// Used only when a brand-new user is created
    #[serde(default)]
    name: Option<String>,
}

/// Exchange a Google access token for a local session.
async fn google_login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GoogleLoginRequest>,
) -> Result<Json<LoginResponse>> {
    let result = login(&state, Provider::Google, body.access_token.as_deref(), None).await?;
    Ok(Json(result))
}

/// Exchange an Apple identity token for a local session.
async fn apple_login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AppleLoginRequest>,
) -> Result<Json<LoginResponse>> {
    let result = login(
        &state,
        Provider::Apple,
        body.id_token.as_deref(),
        body.name.as_deref(),
    )
    .await?;
    Ok(Json(result))
}

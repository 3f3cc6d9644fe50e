// SPDX-License-Identifier: MIT

//! Social Login API Server
//!
//! Verifies Google and Apple identity tokens, reconciles them to local
//! accounts, and issues rotating access/refresh session credentials.

use social_login::{
    config::Config,
    db::Store,
    services::{AppleVerifier, GoogleVerifier, SessionService},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting social-login API");

    let db = Store::new();

    let google = GoogleVerifier::new(&config).expect("Failed to build Google verifier");
    let apple = AppleVerifier::new(&config).expect("Failed to build Apple verifier");
    let sessions = SessionService::new(config.jwt_signing_key.clone(), db.clone());

    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        google,
        apple,
        sessions,
    });

    let app = social_login::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("social_login=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}

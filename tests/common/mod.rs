// SPDX-License-Identifier: MIT

use social_login::config::Config;
use social_login::db::Store;
use social_login::routes::create_router;
use social_login::services::{AppleVerifier, GoogleVerifier, SessionService};
use social_login::AppState;
use std::sync::Arc;

/// Build shared state with provider endpoints taken from `config`
/// (typically pointed at a wiremock server).
#[allow(dead_code)]
pub fn test_state(config: Config) -> Arc<AppState> {
    let db = Store::new();
    let google = GoogleVerifier::new(&config).expect("Failed to build Google verifier");
    let apple = AppleVerifier::new(&config).expect("Failed to build Apple verifier");
    let sessions = SessionService::new(config.jwt_signing_key.clone(), db.clone());

    Arc::new(AppState {
        config,
        db,
        google,
        apple,
        sessions,
    })
}

/// Create a test app and its shared state.
#[allow(dead_code)]
pub fn create_test_app(config: Config) -> (axum::Router, Arc<AppState>) {
    let state = test_state(config);
    (create_router(state.clone()), state)
}

/// Config with both provider endpoints on a mock server base URL.
#[allow(dead_code)]
pub fn mock_provider_config(base_url: &str) -> Config {
    Config {
        google_userinfo_url: format!("{base_url}/oauth2/v2/userinfo"),
        apple_keys_url: format!("{base_url}/auth/keys"),
        ..Config::default()
    }
}

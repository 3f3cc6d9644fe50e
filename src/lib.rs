// SPDX-License-Identifier: MIT

//! Social login backend: links Google and Apple identities to local
//! accounts and issues rotating session credential pairs.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::Store;
use services::{AppleVerifier, GoogleVerifier, SessionService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Store,
    pub google: GoogleVerifier,
    pub apple: AppleVerifier,
    pub sessions: SessionService,
}

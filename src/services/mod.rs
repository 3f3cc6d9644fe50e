// SPDX-License-Identifier: MIT

//! Core login pipeline: provider verification, identity reconciliation,
//! session issuance, and orchestration.

pub mod apple;
pub mod google;
pub mod login;
pub mod reconcile;
pub mod session;

pub use apple::AppleVerifier;
pub use google::GoogleVerifier;
pub use session::SessionService;

/// Identity attributes extracted from a provider token, available only
/// after every integrity/expiry check passed.
#[derive(Debug, Clone)]
pub struct VerifiedClaim {
    /// May be absent; the orchestrator rejects logins without one
    pub email: Option<String>,
    /// Provider-issued stable subject identifier
    pub subject_id: String,
    /// Server-attested for Google; caller-supplied for Apple
    pub display_name: String,
    /// Full verified payload, stored opaquely on the linkage
    pub raw_claims: serde_json::Map<String, serde_json::Value>,
}

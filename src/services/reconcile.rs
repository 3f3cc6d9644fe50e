// SPDX-License-Identifier: MIT

//! Identity reconciliation: map a verified claim to a local user and
//! provider linkage.

use crate::db::Store;
use crate::error::AppError;
use crate::models::{Provider, SocialAccount, User};
use crate::services::VerifiedClaim;
use anyhow::anyhow;

/// Find-or-create the local user and linkage for a verified claim.
///
/// Linkage ownership wins: an existing `(provider, uid)` row pins the
/// owning user and the claim's email is not consulted. Otherwise the user
/// is resolved by email — created on first login with a collision-free
/// username derived from the email local part — and the linkage is created
/// under them. Every insert is a store-level conditional insert, so two
/// concurrent first logins converge on a single user and linkage.
pub async fn reconcile(
    db: &Store,
    claim: &VerifiedClaim,
    provider: Provider,
) -> Result<(User, SocialAccount, bool), AppError> {
    if let Some(existing) = db.find_social_account(provider, &claim.subject_id).await? {
        let user = db
            .get_user(existing.user_id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow!("linkage {} has no owner", existing.id)))?;

        // Idempotent refresh of the stored claim set.
        let (account, _) = db
            .upsert_social_account(user.id, provider, &claim.subject_id, claim.raw_claims.clone())
            .await?;

        return Ok((user, account, false));
    }

    let email = claim.email.as_deref().ok_or(AppError::MissingEmail)?;
    let base_username = email.split('@').next().unwrap_or(email);

    let (user, created) = db
        .create_user_if_absent(email, base_username, &claim.display_name)
        .await?;

    if created {
        tracing::info!(
            user_id = user.id,
            username = %user.username,
            provider = %provider,
            "Created user on first social login"
        );
    }

    let (account, linked) = db
        .upsert_social_account(user.id, provider, &claim.subject_id, claim.raw_claims.clone())
        .await?;

    // A concurrent request may have inserted this linkage since the lookup
    // above; the store keeps the first owner, so follow it.
    if !linked && account.user_id != user.id {
        let owner = db
            .get_user(account.user_id)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow!("linkage {} has no owner", account.id)))?;
        return Ok((owner, account, created));
    }

    Ok((user, account, created))
}

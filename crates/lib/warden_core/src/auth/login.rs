//! Login flow: credential check, role resolution, token issuance, audit.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::AuthError;
use super::jwt::TokenSigner;
use super::password::PasswordHasher;
use crate::accounts::AccountStore;
use crate::models::auth::{Credentials, Role, SessionClaims, SessionToken};

/// Resolve the token role for a stored account type code.
pub fn resolve_role(account_type_code: i32) -> Result<Role, AuthError> {
    match account_type_code {
        0 => Ok(Role::Admin),
        1 => Ok(Role::User),
        _ => Err(AuthError::InvalidAccountType),
    }
}

/// Password hashed once per service to stand in for unknown accounts.
const SENTINEL_PASSWORD: &str = "warden-sentinel-account";

/// Authenticates credentials and issues session tokens.
pub struct LoginService {
    store: Arc<dyn AccountStore>,
    hasher: PasswordHasher,
    signer: Arc<TokenSigner>,
    /// Verified against when the email is unknown, so both paths pay the bcrypt cost.
    sentinel_hash: String,
}

impl LoginService {
    pub fn new(store: Arc<dyn AccountStore>, hasher: PasswordHasher, signer: Arc<TokenSigner>) -> Self {
        let sentinel_hash = hasher.hash(SENTINEL_PASSWORD).unwrap_or_else(|e| {
            warn!(error = %e, "failed to hash sentinel password; unknown emails skip key stretching");
            String::new()
        });
        Self {
            store,
            hasher,
            signer,
            sentinel_hash,
        }
    }

    /// Authenticate with email + password, returning a signed session token.
    ///
    /// Unknown emails and wrong passwords fail identically with
    /// [`AuthError::InvalidCredentials`].
    pub async fn login(
        &self,
        credentials: &Credentials,
        source_ip: &str,
    ) -> Result<SessionToken, AuthError> {
        let account = self.store.find_by_email(&credentials.email).await?;

        // Unknown emails are verified against the sentinel hash and always fail.
        let account_id = account.as_ref().map(|a| a.id);
        let stored_hash = account
            .as_ref()
            .map_or(self.sentinel_hash.as_str(), |a| a.password_hash.as_str());
        let matches = self.hasher.verify(&credentials.password, stored_hash);

        let account = match account {
            Some(a) if matches => a,
            _ => {
                info!(
                    target: "audit",
                    user_id = ?account_id,
                    timestamp = %Utc::now().to_rfc3339(),
                    ip = source_ip,
                    "unsuccessful login attempt"
                );
                return Err(AuthError::InvalidCredentials);
            }
        };

        let role = resolve_role(account.account_type.code())?;

        let now = Utc::now();
        let claims = SessionClaims::new(account.id, &account.email, role, now);

        // Best-effort: token issuance does not depend on this write.
        if let Err(e) = self.store.record_last_login(account.id, now).await {
            warn!(user_id = account.id, error = %e, "failed to record last login time");
        }

        let access_token = self.signer.sign(&claims)?;

        info!(
            target: "audit",
            user_id = account.id,
            timestamp = %Utc::now().to_rfc3339(),
            ip = source_ip,
            "successful login attempt"
        );

        Ok(SessionToken { access_token })
    }
}

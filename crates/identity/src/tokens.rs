//! One-time codes for email verification and password reset.
//!
//! Only a SHA-256 digest of a code is ever stored. Validation compares
//! digests in constant time and checks the stored expiry; consuming a code is
//! a guarded [`UserPatch`] so that the state change it authorises and the
//! clearing of the code happen in one update.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use rand::{Rng, RngCore};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::debug;

use carebridge_database::{TokenPurpose, User, UserPatch, UserRepository};

use crate::types::{IdentityError, IdentityResult};

/// A freshly issued code. The plaintext goes to the user and nowhere else.
#[derive(Debug, Clone)]
pub struct IssuedCode {
    pub plaintext: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("no code is outstanding")]
    Missing,
    #[error("code has expired")]
    Expired,
    #[error("code does not match")]
    Mismatch,
}

#[derive(Debug, Clone)]
pub struct TokenService {
    email_verification_ttl: Duration,
    password_reset_ttl: Duration,
}

impl Default for TokenService {
    fn default() -> Self {
        Self {
            email_verification_ttl: Duration::hours(24),
            password_reset_ttl: Duration::minutes(10),
        }
    }
}

impl TokenService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lifetime(&self, purpose: TokenPurpose) -> Duration {
        match purpose {
            TokenPurpose::EmailVerification => self.email_verification_ttl,
            TokenPurpose::PasswordReset => self.password_reset_ttl,
        }
    }

    /// Generate a code, persist its digest and expiry, and return the plaintext.
    pub async fn issue(
        &self,
        repository: &UserRepository,
        user_id: &str,
        purpose: TokenPurpose,
    ) -> IdentityResult<IssuedCode> {
        let plaintext = generate_code(purpose);
        let expires_at = Utc::now() + self.lifetime(purpose);

        let patch = UserPatch::new().issue_token(purpose, hash_code(&plaintext), expires_at);
        if !repository.update_fields(user_id, &patch).await? {
            return Err(IdentityError::NotFound);
        }

        debug!(
            user_id,
            purpose = purpose.as_str(),
            tenant_id = repository.tenant_id().unwrap_or("default"),
            "one-time code issued"
        );
        Ok(IssuedCode {
            plaintext,
            expires_at,
        })
    }

    /// Check `submitted` against the code stored on `user`. On success returns
    /// the stored digest, which the caller passes to [`Self::consume_patch`].
    pub fn validate(
        &self,
        user: &User,
        purpose: TokenPurpose,
        submitted: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let (stored_hash, expires_at) = user.token_state(purpose);
        let (Some(stored_hash), Some(expires_at)) = (stored_hash, expires_at) else {
            return Err(TokenError::Missing);
        };

        let submitted_hash = hash_code(submitted.trim());
        let matches: bool = stored_hash
            .as_bytes()
            .ct_eq(submitted_hash.as_bytes())
            .into();
        if !matches {
            return Err(TokenError::Mismatch);
        }
        if expires_at <= now {
            return Err(TokenError::Expired);
        }

        Ok(stored_hash.to_string())
    }

    /// The patch that clears a validated code, guarded so it only applies
    /// while the stored digest is still `stored_hash`.
    pub fn consume_patch(&self, purpose: TokenPurpose, stored_hash: &str) -> UserPatch {
        UserPatch::new()
            .clear_token(purpose)
            .expect_token(purpose, stored_hash)
    }
}

/// Hex-encoded SHA-256 of a code.
pub fn hash_code(code: &str) -> String {
    hex::encode(Sha256::digest(code.as_bytes()))
}

fn generate_code(purpose: TokenPurpose) -> String {
    let mut rng = rand::thread_rng();
    match purpose {
        TokenPurpose::EmailVerification => rng.gen_range(100_000..=999_999).to_string(),
        TokenPurpose::PasswordReset => {
            let mut bytes = [0u8; 32];
            rng.fill_bytes(&mut bytes);
            URL_SAFE_NO_PAD.encode(bytes)
        }
    }
}

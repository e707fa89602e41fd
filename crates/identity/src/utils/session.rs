//! Session credentials.
//!
//! A session is an HS256 JWT naming the user, their role and the tenant whose
//! store resolved them (`None` for the default store). Sessions carry no
//! expiry unless a lifetime is configured.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use carebridge_config::AuthConfig;
use carebridge_database::{User, UserRole};

use crate::types::{IdentityError, IdentityResult};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SessionClaims {
    pub sub: String,
    pub role: UserRole,
    /// Store that owns the user; `None` means the default store.
    #[serde(default)]
    pub tenant_id: Option<String>,
    pub iss: String,
    pub iat: u64,
    pub jti: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

pub struct SessionIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl: Option<Duration>,
}

impl SessionIssuer {
    pub fn new(secret: &str, issuer: impl Into<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
            ttl: None,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        let issuer = Self::new(&config.session_signing_secret, config.issuer.clone());
        match config.session_ttl_seconds {
            Some(seconds) => issuer.with_ttl(Duration::from_secs(seconds)),
            None => issuer,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Sign a session for `user`, resolved from the store of `store_tenant`.
    pub fn issue(&self, user: &User, store_tenant: Option<&str>) -> IdentityResult<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| IdentityError::Internal("system clock is before the epoch".to_string()))?;

        let claims = SessionClaims {
            sub: user.id.clone(),
            role: user.role,
            tenant_id: store_tenant.map(str::to_owned),
            iss: self.issuer.clone(),
            iat: now.as_secs(),
            jti: uuid::Uuid::new_v4().to_string(),
            exp: self.ttl.map(|ttl| (now + ttl).as_secs()),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| IdentityError::Internal(format!("failed to sign session: {err}")))
    }

    /// Verify the signature and issuer, and the expiry when one is present.
    pub fn validate(&self, token: &str) -> IdentityResult<SessionClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["sub", "iss"]);

        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| IdentityError::Unauthorized)
    }
}

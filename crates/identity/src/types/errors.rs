//! Error types for identity operations.

use serde::Serialize;
use thiserror::Error;

use carebridge_database::{DatabaseError, PoolError, RegistryError, UserError};

/// A single rejected input field, reported back so the caller can fix it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid input")]
    InvalidInput(Vec<FieldError>),

    #[error("Tenant unavailable: {0}")]
    TenantUnavailable(String),

    #[error("Store connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Store operation timed out: {0}")]
    Timeout(String),

    #[error("An account with this email already exists")]
    DuplicateIdentity,

    #[error("Invalid or expired code")]
    InvalidOrExpiredToken { new_code_sent: bool },

    #[error("Account is pending approval")]
    PendingApproval,

    #[error("Account is suspended")]
    AccountSuspended,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email is already verified")]
    EmailAlreadyVerified,

    #[error("Registration failed: {0}")]
    RegistrationFailed(String),

    #[error("User not found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IdentityError {
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        IdentityError::InvalidInput(vec![FieldError::new(field, message)])
    }

    /// Infrastructure failures are never reinterpreted as business outcomes.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            IdentityError::ConnectionFailed(_) | IdentityError::Timeout(_) | IdentityError::Internal(_)
        )
    }
}

pub type IdentityResult<T> = Result<T, IdentityError>;

impl From<DatabaseError> for IdentityError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Timeout(operation) => IdentityError::Timeout(operation),
            DatabaseError::ConnectionError(cause) => IdentityError::ConnectionFailed(cause),
            other => IdentityError::Internal(other.to_string()),
        }
    }
}

impl From<UserError> for IdentityError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::EmailAlreadyExists => IdentityError::DuplicateIdentity,
            UserError::UserNotFound => IdentityError::NotFound,
            UserError::Database(db) => IdentityError::from(db),
        }
    }
}

impl From<RegistryError> for IdentityError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::InvalidTenantId(_) => {
                IdentityError::invalid_field("tenantId", "Tenant id is malformed")
            }
            RegistryError::TenantUnavailable(id) => IdentityError::TenantUnavailable(id),
            RegistryError::Database(db) => IdentityError::from(db),
        }
    }
}

impl From<PoolError> for IdentityError {
    fn from(err: PoolError) -> Self {
        match err {
            PoolError::Registry(registry) => IdentityError::from(registry),
            PoolError::ConnectionFailed { .. } => IdentityError::ConnectionFailed(err.to_string()),
            PoolError::Timeout { .. } => IdentityError::Timeout(err.to_string()),
        }
    }
}

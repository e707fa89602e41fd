//! Error types for the database layer

use thiserror::Error;

/// General database error
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error("Database query error: {0}")]
    QueryError(String),

    #[error("Database migration error: {0}")]
    MigrationError(String),

    #[error("Database operation timed out: {0}")]
    Timeout(String),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        DatabaseError::QueryError(err.to_string())
    }
}

/// User-specific database errors
#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found")]
    UserNotFound,

    #[error("Email already exists")]
    EmailAlreadyExists,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for UserError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => UserError::EmailAlreadyExists,
            _ => UserError::Database(DatabaseError::from(err)),
        }
    }
}

/// Tenant registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Invalid tenant id: {0}")]
    InvalidTenantId(String),

    #[error("Tenant unavailable: {0}")]
    TenantUnavailable(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for RegistryError {
    fn from(err: sqlx::Error) -> Self {
        RegistryError::Database(DatabaseError::from(err))
    }
}

/// Errors raised while acquiring a store connection
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("Connection to {} failed: {}", store_label(.tenant_id), .cause)]
    ConnectionFailed {
        tenant_id: Option<String>,
        cause: String,
    },

    #[error("Timed out connecting to {}", store_label(.tenant_id))]
    Timeout { tenant_id: Option<String> },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

fn store_label(tenant_id: &Option<String>) -> String {
    match tenant_id {
        Some(id) => format!("tenant store '{id}'"),
        None => "default store".to_string(),
    }
}

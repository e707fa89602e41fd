//! Shared types and result types for the database layer

pub mod errors;

pub use errors::{DatabaseError, PoolError, RegistryError, UserError};

pub type DatabaseResult<T> = Result<T, DatabaseError>;
pub type UserResult<T> = Result<T, UserError>;
pub type RegistryResult<T> = Result<T, RegistryError>;
pub type PoolResult<T> = Result<T, PoolError>;

//! Carebridge Database Crate
//!
//! Storage layer for the clinic identity platform: the tenant registry, the
//! per-tenant connection pool, the model binder that scopes repositories to a
//! store, and the user repository itself.

pub mod binder;
pub mod connection;
pub mod entities;
pub mod migrations;
pub mod pool;
pub mod registry;
pub mod repos;
pub mod types;

pub use binder::ModelBinder;
pub use connection::prepare_database;
pub use migrations::{run_registry_migrations, run_store_migrations};
pub use pool::{ConnectionHandle, ConnectionPool, PoolKey};
pub use registry::{validate_tenant_id, RegistryStore};
pub use repos::{UserPatch, UserRepository};

pub use entities::{
    tenant::{NewTenant, Tenant, TenantBranding},
    user::{AccountStatus, NewUser, TokenPurpose, User, UserRole},
};

pub use types::{
    errors::{DatabaseError, PoolError, RegistryError, UserError},
    DatabaseResult, PoolResult, RegistryResult, UserResult,
};

use carebridge_config::DatabaseConfig;

/// Open the registry and build a connection pool over it.
pub async fn initialize_pool(config: &DatabaseConfig) -> RegistryResult<ConnectionPool> {
    let registry = RegistryStore::connect(config).await?;
    Ok(ConnectionPool::new(registry, config))
}

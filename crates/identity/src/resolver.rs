//! Decides which store owns an identity.
//!
//! Lookups go to the tenant store first when a usable tenant id is supplied,
//! then to the default store. The order is fixed and the two steps never run
//! in parallel. A tenant hit ends the search. Only a definitive miss, or a
//! tenant that is unknown or inactive, moves the lookup on to the default
//! store; connection failures and timeouts on the tenant step are returned
//! to the caller as-is.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use carebridge_database::{
    validate_tenant_id, ConnectionPool, PoolError, RegistryError, User, UserRepository,
};

use crate::types::{IdentityError, IdentityResult};

/// The store a lookup was satisfied from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreScope {
    Tenant(String),
    Default,
}

impl StoreScope {
    pub fn tenant_id(&self) -> Option<&str> {
        match self {
            StoreScope::Tenant(id) => Some(id),
            StoreScope::Default => None,
        }
    }
}

impl fmt::Display for StoreScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreScope::Tenant(id) => write!(f, "tenant:{id}"),
            StoreScope::Default => f.write_str("default"),
        }
    }
}

/// A located user together with the repository bound to its store, so that
/// follow-up writes go to the same store the user was read from.
pub struct Resolution {
    pub user: User,
    pub repository: UserRepository,
    pub found_in: StoreScope,
}

#[derive(Clone)]
pub struct IdentityResolver {
    pool: Arc<ConnectionPool>,
    multi_tenant_enabled: bool,
}

impl IdentityResolver {
    pub fn new(pool: Arc<ConnectionPool>, multi_tenant_enabled: bool) -> Self {
        Self {
            pool,
            multi_tenant_enabled,
        }
    }

    pub fn pool(&self) -> &Arc<ConnectionPool> {
        &self.pool
    }

    pub fn multi_tenant_enabled(&self) -> bool {
        self.multi_tenant_enabled
    }

    /// The tenant id routing should use: blank ids and all ids while tenancy
    /// is disabled count as "no tenant".
    pub fn effective_tenant<'a>(&self, tenant_id: Option<&'a str>) -> Option<&'a str> {
        if !self.multi_tenant_enabled {
            return None;
        }
        tenant_id.map(str::trim).filter(|id| !id.is_empty())
    }

    /// Repository for the store a new record should be written to. Unlike
    /// lookups this never falls back: an unavailable tenant is an error.
    pub async fn repository_for(&self, tenant_id: Option<&str>) -> IdentityResult<UserRepository> {
        let tenant_id = self.effective_tenant(tenant_id);
        let handle = self.pool.acquire(tenant_id).await?;
        Ok(self.pool.binder().users_of(&handle))
    }

    pub async fn resolve_by_email(
        &self,
        email: &str,
        tenant_id: Option<&str>,
    ) -> IdentityResult<Option<Resolution>> {
        if let Some(tenant_id) = self.effective_tenant(tenant_id) {
            validate_tenant_id(tenant_id)?;

            match self.pool.acquire(Some(tenant_id)).await {
                Ok(handle) => {
                    let repository = self.pool.binder().users_of(&handle);
                    if let Some(user) = repository.find_by_email(email).await? {
                        debug!(tenant_id, user_id = %user.id, "identity resolved in tenant store");
                        return Ok(Some(Resolution {
                            user,
                            repository,
                            found_in: StoreScope::Tenant(tenant_id.to_string()),
                        }));
                    }
                    debug!(tenant_id, "identity not in tenant store, trying default store");
                }
                Err(PoolError::Registry(RegistryError::TenantUnavailable(_))) => {
                    debug!(tenant_id, "tenant unavailable, trying default store");
                }
                Err(err) => return Err(IdentityError::from(err)),
            }
        }

        let handle = self.pool.acquire(None).await?;
        let repository = self.pool.binder().users_of(&handle);
        let resolution = repository.find_by_email(email).await?.map(|user| {
            debug!(user_id = %user.id, "identity resolved in default store");
            Resolution {
                user,
                repository,
                found_in: StoreScope::Default,
            }
        });

        Ok(resolution)
    }

    /// Look a user up by id in one known store. Used for session-bound
    /// requests where the credential already names the store, so there is
    /// no fallback.
    pub async fn resolve_by_id(
        &self,
        user_id: &str,
        tenant_id: Option<&str>,
    ) -> IdentityResult<Option<Resolution>> {
        let tenant_id = self.effective_tenant(tenant_id);
        let handle = self.pool.acquire(tenant_id).await?;
        let repository = self.pool.binder().users_of(&handle);

        let found_in = match tenant_id {
            Some(id) => StoreScope::Tenant(id.to_string()),
            None => StoreScope::Default,
        };

        Ok(repository
            .find_by_id(user_id)
            .await?
            .map(|user| Resolution {
                user,
                repository,
                found_in,
            }))
    }
}

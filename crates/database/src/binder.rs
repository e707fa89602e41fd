//! Binds typed repositories to a specific store connection.

use std::time::Duration;

use crate::pool::ConnectionHandle;
use crate::repos::UserRepository;

/// Builds repositories scoped to whichever store a handle points at.
///
/// Binding is cheap: a repository only clones the handle's pool reference,
/// so callers bind once per acquired handle instead of caching repositories.
#[derive(Debug, Clone, Copy)]
pub struct ModelBinder {
    operation_timeout: Duration,
}

impl ModelBinder {
    pub fn new(operation_timeout: Duration) -> Self {
        Self { operation_timeout }
    }

    pub fn users_of(&self, handle: &ConnectionHandle) -> UserRepository {
        UserRepository::new(
            handle.pool().clone(),
            handle.tenant_id().map(str::to_owned),
            self.operation_timeout,
        )
    }
}

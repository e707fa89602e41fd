//! Shared application state for the gateway

use std::sync::Arc;

use carebridge_identity::IdentityService;

/// State handed to every handler. Cloning is cheap.
#[derive(Clone)]
pub struct GatewayState {
    identity: Arc<IdentityService>,
}

impl GatewayState {
    pub fn new(identity: Arc<IdentityService>) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &Arc<IdentityService> {
        &self.identity
    }
}

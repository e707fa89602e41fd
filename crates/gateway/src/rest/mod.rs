//! REST API endpoints for the gateway

pub mod auth;
pub mod health;
pub mod tenants;
pub mod users;

use std::future::Future;

use axum::Router;

use carebridge_identity::IdentityResult;

use crate::error::GatewayResult;
use crate::state::GatewayState;

/// Create all REST API routes
pub fn create_rest_routes(state: GatewayState) -> Router<GatewayState> {
    Router::new()
        .merge(health::create_health_routes())
        .merge(tenants::create_tenant_routes())
        .nest("/auth", auth::create_auth_routes())
        .nest("/users", users::create_user_routes(state))
}

/// Run an identity operation on its own task. A client that disconnects
/// drops the await here, not the store work.
pub(crate) async fn run_detached<T, F>(operation: F) -> GatewayResult<T>
where
    F: Future<Output = IdentityResult<T>> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::spawn(operation).await??)
}

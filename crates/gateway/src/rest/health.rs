use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::GatewayState;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub multi_tenant: bool,
    /// Store connections currently held by the pool.
    pub open_stores: usize,
}

pub fn create_health_routes() -> Router<GatewayState> {
    Router::new().route("/health", get(health_check))
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service health status", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let resolver = state.identity().resolver();

    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        multi_tenant: resolver.multi_tenant_enabled(),
        open_stores: resolver.pool().cached_keys().await.len(),
    })
}

//! Public tenant listing for the clinic picker

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use carebridge_identity::TenantSummary;

use crate::error::{ErrorResponse, GatewayResult};
use crate::rest::run_detached;
use crate::state::GatewayState;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrandingResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TenantResponse {
    pub id: String,
    pub name: String,
    pub branding: BrandingResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TenantListResponse {
    pub tenants: Vec<TenantResponse>,
}

impl From<TenantSummary> for TenantResponse {
    fn from(tenant: TenantSummary) -> Self {
        Self {
            id: tenant.id,
            name: tenant.name,
            branding: BrandingResponse {
                display_name: tenant.branding.display_name,
                logo_url: tenant.branding.logo_url,
                primary_color: tenant.branding.primary_color,
                description: tenant.branding.description,
            },
        }
    }
}

/// Create tenant routes
pub fn create_tenant_routes() -> Router<GatewayState> {
    Router::new().route("/tenants", get(list_tenants).post(list_tenants))
}

#[utoipa::path(
    get,
    path = "/tenants",
    tag = "Tenants",
    responses(
        (status = 200, description = "Active tenants", body = TenantListResponse),
        (status = 503, description = "Registry unavailable", body = ErrorResponse)
    )
)]
pub async fn list_tenants(State(state): State<GatewayState>) -> GatewayResult<Json<TenantListResponse>> {
    let identity = state.identity().clone();
    let tenants = run_detached(async move { identity.list_tenants().await }).await?;

    Ok(Json(TenantListResponse {
        tenants: tenants.into_iter().map(TenantResponse::from).collect(),
    }))
}

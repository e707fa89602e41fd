//! Tenant entity definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A clinic registered in the tenant registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    pub name: String,
    /// Connection locator of the tenant's own store. Never exposed publicly.
    #[serde(skip_serializing)]
    pub backing_store_locator: String,
    pub active: bool,
    pub branding: TenantBranding,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public presentation metadata shown by tenant selection screens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantBranding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Request for registering or replacing a tenant entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTenant {
    pub id: String,
    pub name: String,
    pub backing_store_locator: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub branding: TenantBranding,
}

fn default_active() -> bool {
    true
}

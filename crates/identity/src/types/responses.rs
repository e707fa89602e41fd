//! Response types for identity operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use carebridge_database::{AccountStatus, Tenant, TenantBranding, User, UserRole};

/// The public view of a user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: UserRole,
    pub account_status: AccountStatus,
    pub is_email_verified: bool,
    pub onboarding_completed: bool,
    pub tenant_id: Option<String>,
    pub phone: Option<String>,
    pub specialization: Option<String>,
    pub years_of_experience: Option<i64>,
    pub license_number: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            role: user.role,
            account_status: user.account_status,
            is_email_verified: user.is_email_verified,
            onboarding_completed: user.onboarding_completed,
            tenant_id: user.tenant_id.clone(),
            phone: user.phone.clone(),
            specialization: user.specialization.clone(),
            years_of_experience: user.years_of_experience,
            license_number: user.license_number.clone(),
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

/// A signed session plus the profile it was issued for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionGrant {
    pub token: String,
    pub user: UserProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_target: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationOutcome {
    pub user: UserProfile,
    pub message: String,
    pub requires_verification: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Public listing entry for tenant selection. Store locators are never included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantSummary {
    pub id: String,
    pub name: String,
    pub branding: TenantBranding,
}

impl From<&Tenant> for TenantSummary {
    fn from(tenant: &Tenant) -> Self {
        Self {
            id: tenant.id.clone(),
            name: tenant.name.clone(),
            branding: tenant.branding.clone(),
        }
    }
}
